use serde::Deserialize;
use serde_json::{Map, Value};

use flowrun_core::types::{ConditionInput, Operator};
use flowrun_core::ExecutionState;

/// Form fields every execute request must carry as non-empty strings.
/// Whitespace-only values pass here and fail at the form node.
const REQUIRED_FORM_FIELDS: [&str; 3] = ["name", "email", "city"];

/// Body of `POST /api/v1/workflows/{id}/execute`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    #[serde(default)]
    pub form_data: Option<Map<String, Value>>,
    #[serde(default)]
    pub condition: ConditionInput,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(String),

    #[error("{0} is invalid")]
    Invalid(String),
}

impl ExecuteRequest {
    /// Check the payload before any workflow is loaded.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let form = self
            .form_data
            .as_ref()
            .ok_or_else(|| ValidationError::Missing("formData".into()))?;

        for field in REQUIRED_FORM_FIELDS {
            let present = form
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty());
            if !present {
                return Err(ValidationError::Missing(field.into()));
            }
        }

        if Operator::parse(&self.condition.operator).is_none() {
            return Err(ValidationError::Invalid("operator".into()));
        }
        Ok(())
    }

    /// Turn a validated request into fresh run state.
    pub fn into_state(self) -> ExecutionState {
        ExecutionState::new(self.form_data.unwrap_or_default(), self.condition)
    }
}
