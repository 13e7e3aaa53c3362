//! Mocks and fixtures shared by the Flowrun test suites.

use std::collections::HashMap;
use std::sync::Mutex;

use futures::future::BoxFuture;
use serde_json::{json, Map, Value};

use flowrun_core::error::{FlowError, Result};
use flowrun_core::traits::{TemperatureLookup, WorkflowStore};
use flowrun_core::types::{ConditionInput, Edge, Node, Workflow};
use flowrun_core::ExecutionState;

pub const SAMPLE_WORKFLOW_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

/// Temperature lookup that returns a canned answer and records every call.
pub struct MockTemperature {
    answer: std::result::Result<f64, String>,
    calls: Mutex<Vec<(f64, f64)>>,
}

impl MockTemperature {
    pub fn fixed(temperature: f64) -> Self {
        Self {
            answer: Ok(temperature),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            answer: Err(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Coordinates passed to each lookup, in order.
    pub fn calls(&self) -> Vec<(f64, f64)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl TemperatureLookup for MockTemperature {
    fn temperature(&self, latitude: f64, longitude: f64) -> BoxFuture<'_, Result<f64>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((latitude, longitude));
        }
        let answer = self.answer.clone().map_err(FlowError::Weather);
        Box::pin(async move { answer })
    }
}

/// In-memory workflow store. `failing()` makes every read error out.
#[derive(Default)]
pub struct StubStore {
    workflows: HashMap<String, Workflow>,
    fail: bool,
}

impl StubStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, workflow: Workflow) -> Self {
        self.workflows.insert(workflow.id.clone(), workflow);
        self
    }

    pub fn failing() -> Self {
        Self {
            workflows: HashMap::new(),
            fail: true,
        }
    }
}

impl WorkflowStore for StubStore {
    fn get(&self, id: &str) -> BoxFuture<'_, Result<Option<Workflow>>> {
        let result = if self.fail {
            Err(FlowError::Database("connection refused".into()))
        } else {
            Ok(self.workflows.get(id).cloned())
        };
        Box::pin(async move { result })
    }
}

/// start → form → weather-api → condition → (true) email / (false) end;
/// email → end.
pub fn sample_workflow() -> Workflow {
    Workflow::new(SAMPLE_WORKFLOW_ID, "Test Workflow")
        .with_node(Node::new("start", "start", "Start"))
        .with_node(Node::new("form", "form", "User Input"))
        .with_node(
            Node::new("weather-api", "integration", "Weather API").with_metadata(json!({
                "apiEndpoint": "https://api.open-meteo.com/v1/forecast",
                "options": [
                    {"city": "Sydney", "lat": -33.8688, "lon": 151.2093},
                    {"city": "Perth", "lat": -31.9505, "lon": 115.8605},
                ],
            })),
        )
        .with_node(Node::new("condition", "condition", "Check Condition"))
        .with_node(
            Node::new("email", "email", "Send Alert").with_metadata(json!({
                "emailTemplate": {
                    "subject": "Weather Alert",
                    "body": "Alert for {{city}}! Temp: {{temperature}}\u{b0}C!",
                }
            })),
        )
        .with_node(Node::new("end", "end", "Complete"))
        .with_edge(Edge::new("e1", "start", "form"))
        .with_edge(Edge::new("e2", "form", "weather-api"))
        .with_edge(Edge::new("e3", "weather-api", "condition"))
        .with_edge(Edge::new("e4", "condition", "email").with_handle("true"))
        .with_edge(Edge::new("e5", "condition", "end").with_handle("false"))
        .with_edge(Edge::new("e6", "email", "end"))
}

/// Build a form map from string pairs.
pub fn form_data(fields: &[(&str, &str)]) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

/// Valid run input for Alice in Sydney.
pub fn sample_state(operator: &str, threshold: f64) -> ExecutionState {
    ExecutionState::new(
        form_data(&[
            ("name", "Alice"),
            ("email", "alice@example.com"),
            ("city", "Sydney"),
        ]),
        ConditionInput::new(operator, threshold),
    )
}

/// The JSON body the gateway expects for an execute request.
pub fn sample_request(operator: &str, threshold: f64) -> Value {
    json!({
        "formData": {"name": "Alice", "email": "alice@example.com", "city": "Sydney"},
        "condition": {"operator": operator, "threshold": threshold},
    })
}
