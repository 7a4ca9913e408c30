pub mod analysis;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod model;
pub mod progress;
pub mod report;

pub use analysis::{classify, DeletionPlan, KeepPolicy, PlanStatus, PlanSummary};
pub use catalog::{Catalog, EmbyClient};
pub use config::AppConfig;
pub use engine::{LibraryScan, ScanEngine, ScanResult};
pub use error::Error;
pub use model::{Library, LibraryKind, MediaItem, MediaKind};
pub use progress::{ProgressReporter, SilentReporter};
