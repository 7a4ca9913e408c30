use std::collections::HashSet;

use super::grouping::DuplicateGroup;

/// Keep only groups that hold at least two distinct physical files.
///
/// The catalog can list one file several times (folder aliasing, overlapping
/// libraries); a bucket whose members all share a path is not a duplicate.
pub fn filter_duplicates(groups: Vec<DuplicateGroup>) -> Vec<DuplicateGroup> {
    groups.into_iter().filter(is_actionable).collect()
}

pub fn is_actionable(group: &DuplicateGroup) -> bool {
    if group.items.len() < 2 {
        return false;
    }
    let distinct_paths: HashSet<&str> = group.items.iter().map(|i| i.path.as_str()).collect();
    distinct_paths.len() > 1
}
