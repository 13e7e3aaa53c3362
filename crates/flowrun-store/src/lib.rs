//! SQLite persistence for workflow definitions, plus the seeded sample
//! weather-alert workflow.

pub mod sample;
pub mod store;

pub use sample::{sample_workflow, SAMPLE_WORKFLOW_ID};
pub use store::SqliteStore;
