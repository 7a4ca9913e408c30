use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use super::grouping::GroupKey;
use super::selection::Selection;
use crate::model::MediaItem;

/// Why a group cannot be acted on automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collision {
    /// A candidate shares the kept item's catalog id: the server merged
    /// several files into one entry, and deleting the entry removes all of them.
    SharedId(String),
    /// A candidate is the kept file itself. `select` never produces this;
    /// it guards hand-built selections.
    SharedPath(String),
    /// A candidate's catalog entry also covers files outside this group's
    /// candidates, which deleting the entry would take with it.
    MergedEntry(String),
}

/// Every path known under each catalog id, across a whole library.
#[derive(Debug, Default, Clone)]
pub struct IdentityIndex {
    paths_by_id: HashMap<String, BTreeSet<String>>,
}

impl IdentityIndex {
    pub fn build<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a MediaItem>,
    {
        let mut paths_by_id: HashMap<String, BTreeSet<String>> = HashMap::new();
        for item in items {
            paths_by_id
                .entry(item.id.clone())
                .or_default()
                .insert(item.path.clone());
        }
        Self { paths_by_id }
    }

    pub fn paths(&self, id: &str) -> Option<&BTreeSet<String>> {
        self.paths_by_id.get(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStatus {
    Safe,
    Unsafe(Vec<Collision>),
}

/// Validated outcome for one duplicate group.
///
/// Plans are only built by the validators below, so a `Safe` plan never
/// holds a candidate whose id or path matches the kept item. An `Unsafe` plan exposes no
/// candidates; the items it would have removed are kept in `held_back` for
/// reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionPlan {
    key: GroupKey,
    keep: MediaItem,
    candidates: Vec<MediaItem>,
    held_back: Vec<MediaItem>,
    aliases: Vec<MediaItem>,
    status: PlanStatus,
}

impl DeletionPlan {
    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    pub fn keep(&self) -> &MediaItem {
        &self.keep
    }

    /// Items that may be deleted. Always empty for an unsafe plan.
    pub fn candidates(&self) -> &[MediaItem] {
        &self.candidates
    }

    /// Items that would have been candidates if the plan were safe.
    pub fn held_back(&self) -> &[MediaItem] {
        &self.held_back
    }

    /// Extra records for a path already represented by the kept item or a
    /// candidate. Never deleted on their own.
    pub fn aliases(&self) -> &[MediaItem] {
        &self.aliases
    }

    pub fn status(&self) -> &PlanStatus {
        &self.status
    }

    pub fn is_safe(&self) -> bool {
        matches!(self.status, PlanStatus::Safe)
    }

    /// Bytes freed by removing every candidate.
    pub fn reclaimable_bytes(&self) -> u64 {
        self.candidates.iter().map(|c| c.size).sum()
    }
}

/// Gate every selection must pass before anything is deleted.
///
/// Checks the candidates against the kept item only. Use
/// `validate_with_index` when the rest of the library is known.
pub fn validate(selection: Selection) -> DeletionPlan {
    validate_with_index(selection, &IdentityIndex::default())
}

/// Like `validate`, additionally refusing candidates whose catalog entry
/// spans files that are not themselves candidates of this group.
pub fn validate_with_index(selection: Selection, index: &IdentityIndex) -> DeletionPlan {
    let Selection {
        key,
        keep,
        candidates,
        aliases,
    } = selection;

    let collisions = find_collisions(&keep, &candidates, &aliases, index);
    if collisions.is_empty() {
        return DeletionPlan {
            key,
            keep,
            candidates,
            held_back: Vec::new(),
            aliases,
            status: PlanStatus::Safe,
        };
    }

    warn!(
        "Unsafe duplicate group [{}]: keep '{}' (id {}) collides with {} candidate(s); skipping automatic removal",
        key,
        keep.path,
        keep.id,
        candidates.len()
    );

    DeletionPlan {
        key,
        keep,
        candidates: Vec::new(),
        held_back: candidates,
        aliases,
        status: PlanStatus::Unsafe(collisions),
    }
}

fn find_collisions(
    keep: &MediaItem,
    candidates: &[MediaItem],
    aliases: &[MediaItem],
    index: &IdentityIndex,
) -> Vec<Collision> {
    // Every id that refers to the kept file, including its aliases.
    let keep_ids: BTreeSet<&str> = std::iter::once(keep)
        .chain(aliases.iter().filter(|a| a.path == keep.path))
        .map(|item| item.id.as_str())
        .collect();
    let candidate_paths: BTreeSet<&str> = candidates.iter().map(|c| c.path.as_str()).collect();

    let mut ids = BTreeSet::new();
    for alias in aliases {
        if candidate_paths.contains(alias.path.as_str()) && keep_ids.contains(alias.id.as_str()) {
            ids.insert(alias.id.clone());
        }
    }

    let mut paths = BTreeSet::new();
    let mut merged = BTreeSet::new();
    for candidate in candidates {
        if keep_ids.contains(candidate.id.as_str()) {
            ids.insert(candidate.id.clone());
        } else if let Some(known) = index.paths(&candidate.id) {
            if known.iter().any(|p| !candidate_paths.contains(p.as_str())) {
                merged.insert(candidate.id.clone());
            }
        }
        if candidate.path == keep.path {
            paths.insert(candidate.path.clone());
        }
    }

    ids.into_iter()
        .map(Collision::SharedId)
        .chain(paths.into_iter().map(Collision::SharedPath))
        .chain(merged.into_iter().map(Collision::MergedEntry))
        .collect()
}
