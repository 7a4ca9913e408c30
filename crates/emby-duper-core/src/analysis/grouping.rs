use std::collections::HashMap;
use std::fmt;

use crate::model::{MediaItem, MediaKind, UNKNOWN_INDEX};

/// What two items must share to be considered copies of the same title.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Movie {
        size: u64,
    },
    Episode {
        series: String,
        season: i32,
        episode: i32,
        size: u64,
    },
}

impl GroupKey {
    pub fn for_item(item: &MediaItem) -> Self {
        match (item.kind, &item.episode) {
            (MediaKind::Episode, Some(ep)) => GroupKey::Episode {
                series: ep.series_name.clone(),
                season: ep.season,
                episode: ep.episode,
                size: item.size,
            },
            (MediaKind::Episode, None) => GroupKey::Episode {
                series: String::new(),
                season: UNKNOWN_INDEX,
                episode: UNKNOWN_INDEX,
                size: item.size,
            },
            (MediaKind::Movie, _) => GroupKey::Movie { size: item.size },
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            GroupKey::Movie { size } | GroupKey::Episode { size, .. } => *size,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Movie { size } => write!(f, "movie size={}", size),
            GroupKey::Episode {
                series,
                season,
                episode,
                size,
            } => {
                write!(f, "{} ", series)?;
                if *season == UNKNOWN_INDEX {
                    write!(f, "S??")?;
                } else {
                    write!(f, "S{:02}", season)?;
                }
                if *episode == UNKNOWN_INDEX {
                    write!(f, "E??")?;
                } else {
                    write!(f, "E{:02}", episode)?;
                }
                write!(f, " size={}", size)
            }
        }
    }
}

/// Items sharing one grouping key, in the order they were seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub key: GroupKey,
    pub items: Vec<MediaItem>,
}

/// Bucket items by `GroupKey`. Buckets come out in first-seen order and
/// items keep their input order within a bucket.
pub fn group_items<I>(items: I) -> Vec<DuplicateGroup>
where
    I: IntoIterator<Item = MediaItem>,
{
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for item in items {
        let key = GroupKey::for_item(&item);
        match index.get(&key) {
            Some(&idx) => groups[idx].items.push(item),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(DuplicateGroup {
                    key,
                    items: vec![item],
                });
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EpisodeInfo;

    fn movie(path: &str, size: u64) -> MediaItem {
        MediaItem {
            id: path.to_string(),
            media_source_id: None,
            kind: MediaKind::Movie,
            name: path.to_string(),
            path: path.to_string(),
            size,
            episode: None,
            info: String::new(),
        }
    }

    fn episode(path: &str, season: i32, number: i32, size: u64) -> MediaItem {
        MediaItem {
            kind: MediaKind::Episode,
            episode: Some(EpisodeInfo {
                series_name: "Dark".to_string(),
                season,
                episode: number,
            }),
            ..movie(path, size)
        }
    }

    #[test]
    fn test_movies_group_by_size_only() {
        let groups = group_items(vec![
            movie("/a.mkv", 1000),
            movie("/b.mkv", 2000),
            movie("/c.mkv", 1000),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, GroupKey::Movie { size: 1000 });
        assert_eq!(groups[0].items.len(), 2);
        assert_eq!(groups[0].items[0].path, "/a.mkv");
        assert_eq!(groups[0].items[1].path, "/c.mkv");
        assert_eq!(groups[1].key, GroupKey::Movie { size: 2000 });
    }

    #[test]
    fn test_unknown_episode_number_never_joins_known() {
        let groups = group_items(vec![
            episode("/e1.mkv", 1, 1, 500),
            episode("/e_unknown.mkv", 1, UNKNOWN_INDEX, 500),
        ]);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_movie_and_episode_of_same_size_are_separate() {
        let groups = group_items(vec![movie("/m.mkv", 500), episode("/e.mkv", 1, 1, 500)]);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_group_key_display() {
        let key = GroupKey::for_item(&episode("/e.mkv", 2, UNKNOWN_INDEX, 7));
        assert_eq!(key.to_string(), "Dark S02E?? size=7");
        assert_eq!(GroupKey::Movie { size: 9 }.to_string(), "movie size=9");
        assert_eq!(key.size(), 7);
    }
}
