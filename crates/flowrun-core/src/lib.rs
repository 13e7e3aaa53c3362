pub mod config;
pub mod error;
pub mod metadata;
pub mod state;
pub mod traits;
pub mod types;

pub use config::AppConfig;
pub use error::{FlowError, NodeError, NodeResult, Result};
pub use state::ExecutionState;
pub use types::*;
