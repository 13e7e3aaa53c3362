use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::types::ConditionInput;

/// Accumulator key for the temperature written by integration nodes.
pub const TEMPERATURE_KEY: &str = "temperature";
/// Accumulator key for the branch token written by condition nodes.
pub const CONDITION_RESULT_KEY: &str = "conditionResult";

/// Run-scoped state threaded through every handler call.
///
/// Created once per run and owned by it; handlers only see it through a
/// `&mut` borrow for the duration of their own step.
#[derive(Debug, Clone, Default)]
pub struct ExecutionState {
    /// Caller-supplied form values.
    pub form_data: Map<String, Value>,
    /// Caller-supplied comparison for condition nodes.
    pub condition: ConditionInput,
    variables: HashMap<String, Value>,
}

impl ExecutionState {
    pub fn new(form_data: Map<String, Value>, condition: ConditionInput) -> Self {
        Self {
            form_data,
            condition,
            variables: HashMap::new(),
        }
    }

    /// Pre-populate an accumulator value.
    pub fn with_variable(mut self, key: impl Into<String>, value: Value) -> Self {
        self.variables.insert(key.into(), value);
        self
    }

    /// Get a form value as a string, if it is one.
    pub fn form_str(&self, field: &str) -> Option<&str> {
        self.form_data.get(field).and_then(|v| v.as_str())
    }

    /// Get an accumulator value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.variables.get(key)
    }

    /// Get an accumulator value as a string, if it is one.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.variables.get(key).and_then(|v| v.as_str())
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.variables.insert(key.into(), value);
    }

    pub fn set_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables
            .insert(key.into(), Value::String(value.into()));
    }

    pub fn variables(&self) -> &HashMap<String, Value> {
        &self.variables
    }
}
