//! Duplicate classification: normalize → group → filter → select → validate.
//!
//! Everything here is a pure in-memory transformation over records that were
//! already fetched. No network, filesystem or terminal access.

pub mod deletion_plan;
pub mod filter;
pub mod grouping;
pub mod normalize;
pub mod safety;
pub mod selection;

pub use deletion_plan::{classify, PlanSummary};
pub use grouping::{DuplicateGroup, GroupKey};
pub use safety::{Collision, DeletionPlan, IdentityIndex, PlanStatus};
pub use selection::{KeepPolicy, SelectionPolicy};
