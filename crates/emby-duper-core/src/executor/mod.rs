//! Turn validated plans into actions. Executors only ever read
//! `DeletionPlan::candidates`, which is empty for unsafe groups.

pub mod api;
pub mod script;

pub use api::execute_api_deletions;
pub use script::{render_script, write_script};
