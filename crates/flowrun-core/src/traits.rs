use futures::future::BoxFuture;

use crate::error::{NodeResult, Result};
use crate::state::ExecutionState;
use crate::types::{Node, NodeOutput, Workflow};

/// Executes every node of one type tag.
///
/// Handlers are stateless after construction and shared across runs. They
/// must not keep the state borrow past their own invocation, and they never
/// choose the next node: traversal belongs to the engine.
pub trait NodeHandler: Send + Sync + 'static {
    /// Type tag this handler is registered under (e.g. "condition").
    fn node_type(&self) -> &str;

    /// Execute a single step against the run's shared state.
    fn execute<'a>(
        &'a self,
        node: &'a Node,
        state: &'a mut ExecutionState,
    ) -> BoxFuture<'a, NodeResult<NodeOutput>>;
}

/// External temperature source used by integration nodes.
///
/// Implementations bound their own latency; the engine applies no timeout.
/// Every failure surfaces as one opaque error.
pub trait TemperatureLookup: Send + Sync + 'static {
    /// Current temperature in Celsius at the given coordinates.
    fn temperature(&self, latitude: f64, longitude: f64) -> BoxFuture<'_, Result<f64>>;
}

/// Definition provider keyed by workflow id.
pub trait WorkflowStore: Send + Sync + 'static {
    /// Load a definition. `Ok(None)` means not found.
    fn get(&self, id: &str) -> BoxFuture<'_, Result<Option<Workflow>>>;
}
