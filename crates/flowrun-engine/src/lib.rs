//! Workflow execution engine.
//!
//! A workflow is a directed graph of typed nodes. The `WorkflowEngine` walks
//! it from the `start` node, dispatching each node to the handler registered
//! for its type and following edges until a node has no successor. Condition
//! nodes pick their outgoing edge by branch handle.

pub mod executor;
pub mod graph;
pub mod handlers;
pub mod registry;

pub use executor::WorkflowEngine;
pub use graph::GraphIndex;
pub use registry::HandlerRegistry;
