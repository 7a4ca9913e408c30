use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::grouping::{DuplicateGroup, GroupKey};
use crate::model::MediaItem;

/// Orders the members of a duplicate group; the first item after sorting is kept.
///
/// Any `Fn(&MediaItem, &MediaItem) -> Ordering` is a policy, so callers can
/// swap in their own comparator without touching grouping.
pub trait SelectionPolicy {
    fn compare(&self, a: &MediaItem, b: &MediaItem) -> Ordering;
}

impl<F> SelectionPolicy for F
where
    F: Fn(&MediaItem, &MediaItem) -> Ordering,
{
    fn compare(&self, a: &MediaItem, b: &MediaItem) -> Ordering {
        self(a, b)
    }
}

/// Built-in policies selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeepPolicy {
    /// Longest file name wins; ties go to the lexicographically smaller name.
    #[default]
    LongestName,
    /// Largest file wins, then falls back to `LongestName`.
    LargestSize,
}

impl SelectionPolicy for KeepPolicy {
    fn compare(&self, a: &MediaItem, b: &MediaItem) -> Ordering {
        match self {
            KeepPolicy::LongestName => longest_name_first(a, b),
            KeepPolicy::LargestSize => largest_size_first(a, b),
        }
    }
}

pub fn longest_name_first(a: &MediaItem, b: &MediaItem) -> Ordering {
    let (name_a, name_b) = (a.base_name(), b.base_name());
    name_b
        .chars()
        .count()
        .cmp(&name_a.chars().count())
        .then_with(|| name_a.cmp(name_b))
        .then_with(|| a.path.cmp(&b.path))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn largest_size_first(a: &MediaItem, b: &MediaItem) -> Ordering {
    b.size.cmp(&a.size).then_with(|| longest_name_first(a, b))
}

/// A group split into the item to keep and the items proposed for removal.
/// Not yet checked for identity collisions.
///
/// Records pointing at a path already represented (the same file listed
/// twice) are collected in `aliases`, never in `candidates`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub key: GroupKey,
    pub keep: MediaItem,
    pub candidates: Vec<MediaItem>,
    pub aliases: Vec<MediaItem>,
}

pub fn select<P>(group: DuplicateGroup, policy: &P) -> Option<Selection>
where
    P: SelectionPolicy + ?Sized,
{
    let DuplicateGroup { key, mut items } = group;
    items.sort_by(|a, b| policy.compare(a, b));

    let mut seen_paths = HashSet::new();
    let (distinct, aliases): (Vec<MediaItem>, Vec<MediaItem>) = items
        .into_iter()
        .partition(|item| seen_paths.insert(item.path.clone()));

    let mut ordered = distinct.into_iter();
    let keep = ordered.next()?;
    Some(Selection {
        key,
        keep,
        candidates: ordered.collect(),
        aliases,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MediaKind;

    fn item(id: &str, path: &str, size: u64) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            media_source_id: None,
            kind: MediaKind::Movie,
            name: id.to_string(),
            path: path.to_string(),
            size,
            episode: None,
            info: String::new(),
        }
    }

    fn group(items: Vec<MediaItem>) -> DuplicateGroup {
        DuplicateGroup {
            key: GroupKey::Movie { size: 1 },
            items,
        }
    }

    #[test]
    fn test_longest_name_kept() {
        let selection = select(
            group(vec![
                item("1", "/m/Show.2020.mkv", 1),
                item("2", "/m/Show.2020.1080p.BluRay.x265.mkv", 1),
            ]),
            &KeepPolicy::LongestName,
        )
        .unwrap();
        assert_eq!(selection.keep.id, "2");
        assert_eq!(selection.candidates.len(), 1);
        assert_eq!(selection.candidates[0].id, "1");
    }

    #[test]
    fn test_equal_length_tie_break_is_lexicographic() {
        let forward = select(
            group(vec![item("1", "/x/b.mkv", 1), item("2", "/y/a.mkv", 1)]),
            &KeepPolicy::LongestName,
        )
        .unwrap();
        let reverse = select(
            group(vec![item("2", "/y/a.mkv", 1), item("1", "/x/b.mkv", 1)]),
            &KeepPolicy::LongestName,
        )
        .unwrap();
        assert_eq!(forward.keep.path, "/y/a.mkv");
        assert_eq!(reverse.keep.path, "/y/a.mkv");
    }

    #[test]
    fn test_identical_base_names_ordered_by_path() {
        let selection = select(
            group(vec![item("1", "/z/a.mkv", 1), item("2", "/b/a.mkv", 1)]),
            &KeepPolicy::LongestName,
        )
        .unwrap();
        assert_eq!(selection.keep.path, "/b/a.mkv");
    }

    #[test]
    fn test_largest_size_policy() {
        let selection = select(
            group(vec![
                item("1", "/m/Long.Descriptive.Name.mkv", 10),
                item("2", "/m/short.mkv", 20),
            ]),
            &KeepPolicy::LargestSize,
        )
        .unwrap();
        assert_eq!(selection.keep.id, "2");
    }

    #[test]
    fn test_closure_policy() {
        let by_id_desc = |a: &MediaItem, b: &MediaItem| b.id.cmp(&a.id);
        let selection = select(
            group(vec![item("1", "/a.mkv", 1), item("3", "/c.mkv", 1), item("2", "/b.mkv", 1)]),
            &by_id_desc,
        )
        .unwrap();
        assert_eq!(selection.keep.id, "3");
        let rest: Vec<&str> = selection.candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(rest, vec!["2", "1"]);
    }

    #[test]
    fn test_same_path_records_become_aliases() {
        let selection = select(
            group(vec![
                item("1", "/m/a.mkv", 1),
                item("2", "/m/a.mkv", 1),
                item("3", "/m/b.mkv", 1),
            ]),
            &KeepPolicy::LongestName,
        )
        .unwrap();
        assert_eq!(selection.keep.id, "1");
        let candidates: Vec<&str> = selection.candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(candidates, vec!["3"]);
        assert_eq!(selection.aliases.len(), 1);
        assert_eq!(selection.aliases[0].id, "2");
    }

    #[test]
    fn test_empty_group_selects_nothing() {
        assert!(select(group(vec![]), &KeepPolicy::LongestName).is_none());
    }
}
