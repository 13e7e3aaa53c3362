use std::collections::HashMap;

use flowrun_core::types::{Edge, Node, Workflow};

/// Type tag of the entry node.
pub const START_TYPE: &str = "start";
/// Type tag of nodes whose outgoing edge is chosen by branch handle.
pub const CONDITION_TYPE: &str = "condition";

/// Read-only lookup tables over a workflow, built once per run.
pub struct GraphIndex<'a> {
    start: Option<&'a Node>,
    nodes: HashMap<&'a str, &'a Node>,
    outgoing: HashMap<&'a str, Vec<&'a Edge>>,
}

impl<'a> GraphIndex<'a> {
    pub fn build(workflow: &'a Workflow) -> Self {
        let start = workflow.nodes.iter().find(|n| n.node_type == START_TYPE);
        let nodes = workflow.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        let mut outgoing: HashMap<&'a str, Vec<&'a Edge>> = HashMap::new();
        for edge in &workflow.edges {
            outgoing.entry(edge.source.as_str()).or_default().push(edge);
        }

        Self {
            start,
            nodes,
            outgoing,
        }
    }

    /// The first node typed `start`, in definition order.
    pub fn start_node(&self) -> Option<&'a Node> {
        self.start
    }

    pub fn node(&self, id: &str) -> Option<&'a Node> {
        self.nodes.get(id).copied()
    }

    /// Outgoing edges of a node, in definition order.
    pub fn outgoing(&self, id: &str) -> &[&'a Edge] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Pick the id of the node to visit after `node`.
    ///
    /// Condition nodes follow the edge whose handle equals `branch`; no
    /// match means the run ends there. Every other node follows its first
    /// outgoing edge, even if it has several.
    pub fn next_target(&self, node: &Node, branch: Option<&str>) -> Option<&'a str> {
        let edges = self.outgoing(&node.id);
        let edge = if node.node_type == CONDITION_TYPE {
            let branch = branch?;
            edges
                .iter()
                .find(|e| e.source_handle.as_deref() == Some(branch))
        } else {
            edges.first()
        };
        edge.copied().map(|e| e.target.as_str())
    }
}
