pub mod breakdown;
pub mod categories;
pub mod error;
pub mod logger;
pub mod models;
pub mod normalizer;
pub mod orchestrator;
pub mod weekly;

pub use error::{LookupError, SourceResult, Upstream};
pub use models::*;
pub use orchestrator::LookupService;
