use futures::future::BoxFuture;

use flowrun_core::error::NodeResult;
use flowrun_core::traits::NodeHandler;
use flowrun_core::types::{Node, NodeOutput};
use flowrun_core::ExecutionState;

/// Entry marker. Does nothing and always succeeds.
pub struct StartHandler;

impl NodeHandler for StartHandler {
    fn node_type(&self) -> &str {
        "start"
    }

    fn execute<'a>(
        &'a self,
        _node: &'a Node,
        _state: &'a mut ExecutionState,
    ) -> BoxFuture<'a, NodeResult<NodeOutput>> {
        Box::pin(async { Ok(NodeOutput::new("Workflow execution started")) })
    }
}

/// Exit marker. Does nothing and always succeeds.
pub struct EndHandler;

impl NodeHandler for EndHandler {
    fn node_type(&self) -> &str {
        "end"
    }

    fn execute<'a>(
        &'a self,
        _node: &'a Node,
        _state: &'a mut ExecutionState,
    ) -> BoxFuture<'a, NodeResult<NodeOutput>> {
        Box::pin(async { Ok(NodeOutput::new("Workflow execution completed")) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_handler() {
        let node = Node::new("start", "start", "Start");
        let mut state = ExecutionState::default();
        let out = StartHandler.execute(&node, &mut state).await.unwrap();
        assert_eq!(out.message, "Workflow execution started");
        assert!(state.variables().is_empty());
    }

    #[tokio::test]
    async fn test_end_handler() {
        let node = Node::new("end", "end", "Complete");
        let mut state = ExecutionState::default();
        let out = EndHandler.execute(&node, &mut state).await.unwrap();
        assert_eq!(out.message, "Workflow execution completed");
    }
}
