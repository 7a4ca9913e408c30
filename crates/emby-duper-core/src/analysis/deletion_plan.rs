use tracing::debug;

use super::filter::filter_duplicates;
use super::grouping::group_items;
use super::safety::{validate_with_index, DeletionPlan, IdentityIndex};
use super::selection::{select, SelectionPolicy};
use crate::model::MediaItem;

/// Run the whole classification: group, filter, select, validate.
///
/// The safety check sees every item passed in, so a candidate whose catalog
/// entry also covers a file elsewhere in the input is held back too.
///
/// Pure and deterministic for a given input order. Plans come out in the
/// order their groups were first seen.
pub fn classify<I, P>(items: I, policy: &P) -> Vec<DeletionPlan>
where
    I: IntoIterator<Item = MediaItem>,
    P: SelectionPolicy + ?Sized,
{
    let items: Vec<MediaItem> = items.into_iter().collect();
    let index = IdentityIndex::build(&items);
    let groups = group_items(items);
    let bucket_count = groups.len();
    let duplicates = filter_duplicates(groups);
    debug!(
        "{} buckets, {} qualify as duplicate groups",
        bucket_count,
        duplicates.len()
    );

    duplicates
        .into_iter()
        .filter_map(|group| select(group, policy))
        .map(|selection| validate_with_index(selection, &index))
        .collect()
}

/// Totals across a set of plans.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlanSummary {
    pub duplicate_groups: usize,
    pub safe_groups: usize,
    pub unsafe_groups: usize,
    pub candidates: usize,
    pub reclaimable_bytes: u64,
}

impl PlanSummary {
    pub fn from_plans<'a, I>(plans: I) -> Self
    where
        I: IntoIterator<Item = &'a DeletionPlan>,
    {
        plans.into_iter().fold(Self::default(), |mut acc, plan| {
            acc.merge(&Self::of(plan));
            acc
        })
    }

    pub fn merge(&mut self, other: &PlanSummary) {
        self.duplicate_groups += other.duplicate_groups;
        self.safe_groups += other.safe_groups;
        self.unsafe_groups += other.unsafe_groups;
        self.candidates += other.candidates;
        self.reclaimable_bytes += other.reclaimable_bytes;
    }

    fn of(plan: &DeletionPlan) -> Self {
        let safe = plan.is_safe();
        PlanSummary {
            duplicate_groups: 1,
            safe_groups: usize::from(safe),
            unsafe_groups: usize::from(!safe),
            candidates: plan.candidates().len(),
            reclaimable_bytes: plan.reclaimable_bytes(),
        }
    }
}
