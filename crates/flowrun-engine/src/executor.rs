use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use flowrun_core::config::DEFAULT_MAX_STEPS;
use flowrun_core::error::{FlowError, Result};
use flowrun_core::state::CONDITION_RESULT_KEY;
use flowrun_core::types::{
    ExecutionId, ExecutionResults, ExecutionStep, Node, RunStatus, StepStatus, Workflow,
};
use flowrun_core::ExecutionState;

use crate::graph::GraphIndex;
use crate::registry::HandlerRegistry;

/// Walks a workflow graph from its `start` node.
///
/// Each visited node is dispatched to the handler registered for its type,
/// one at a time, and recorded as a step. A handler error ends the run with
/// status `failed` and is returned as data. Structural problems (no start
/// node, unregistered type, dangling edge, step bound reached) are returned
/// as `Err` and produce no results at all.
pub struct WorkflowEngine {
    registry: Arc<HandlerRegistry>,
    max_steps: usize,
}

impl WorkflowEngine {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self {
            registry,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Override the step bound (minimum 1).
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Execute `workflow` with a fresh run state.
    ///
    /// The definition is only read. The state is owned by this run and
    /// dropped when it returns.
    pub async fn execute(
        &self,
        workflow: &Workflow,
        mut state: ExecutionState,
    ) -> Result<ExecutionResults> {
        let started = Instant::now();
        let start_time = Utc::now();
        let execution_id = ExecutionId::new();

        let index = GraphIndex::build(workflow);
        let mut current = index.start_node().ok_or(FlowError::NoStartNode)?;

        info!(
            execution_id = %execution_id,
            workflow_id = %workflow.id,
            "Executing workflow"
        );

        let mut steps: Vec<ExecutionStep> = Vec::new();
        let mut status = RunStatus::Completed;
        let mut finished = false;

        while steps.len() < self.max_steps {
            let handler = self
                .registry
                .get(&current.node_type)
                .ok_or_else(|| FlowError::UnregisteredNodeType(current.node_type.clone()))?;

            let step_start = Instant::now();
            let outcome = handler.execute(current, &mut state).await;
            let elapsed_ms = step_start.elapsed().as_millis() as u64;
            let step_number = steps.len() + 1;

            match outcome {
                Ok(output) => {
                    debug!(
                        step = step_number,
                        node_id = %current.id,
                        node_type = %current.node_type,
                        elapsed_ms,
                        "Step completed"
                    );
                    steps.push(record(
                        step_number,
                        current,
                        StepStatus::Completed,
                        elapsed_ms,
                        output.into_map(),
                        None,
                    ));
                }
                Err(e) => {
                    warn!(
                        step = step_number,
                        node_id = %current.id,
                        node_type = %current.node_type,
                        error = %e,
                        "Step failed, stopping workflow"
                    );
                    let mut output = Map::new();
                    output.insert("message".into(), Value::String(format!("Error: {}", e)));
                    steps.push(record(
                        step_number,
                        current,
                        StepStatus::Error,
                        elapsed_ms,
                        output,
                        Some(e.to_string()),
                    ));
                    status = RunStatus::Failed;
                    finished = true;
                    break;
                }
            }

            let branch = state.get_str(CONDITION_RESULT_KEY);
            match index.next_target(current, branch) {
                Some(target) => {
                    current = index
                        .node(target)
                        .ok_or_else(|| FlowError::DanglingEdge(target.to_string()))?;
                }
                None => {
                    debug!(node_id = %current.id, "No outgoing edge, workflow complete");
                    finished = true;
                    break;
                }
            }
        }

        if !finished {
            warn!(
                execution_id = %execution_id,
                max_steps = self.max_steps,
                "Step bound reached without a terminal node"
            );
            return Err(FlowError::MaxStepsExceeded(self.max_steps));
        }

        let total_duration = started.elapsed().as_millis() as u64;
        info!(
            execution_id = %execution_id,
            status = ?status,
            steps = steps.len(),
            total_duration,
            "Workflow finished"
        );

        Ok(ExecutionResults {
            execution_id,
            status,
            start_time,
            end_time: Utc::now(),
            total_duration,
            steps,
        })
    }
}

fn record(
    step_number: usize,
    node: &Node,
    status: StepStatus,
    duration: u64,
    output: Map<String, Value>,
    error: Option<String>,
) -> ExecutionStep {
    ExecutionStep {
        step_number,
        node_id: node.id.clone(),
        node_type: node.node_type.clone(),
        step_type: node.node_type.clone(),
        label: node.data.label.clone(),
        status,
        duration,
        output,
        timestamp: Utc::now(),
        error,
    }
}
