use std::sync::Arc;

use flowrun_core::config::GatewayConfig;
use flowrun_core::traits::WorkflowStore;
use flowrun_engine::WorkflowEngine;

/// Shared application state for axum handlers.
pub struct AppState {
    pub config: GatewayConfig,
    pub engine: Arc<WorkflowEngine>,
    pub store: Arc<dyn WorkflowStore>,
}
