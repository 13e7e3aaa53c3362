use futures::future::BoxFuture;
use serde_json::Value;

use flowrun_core::error::{NodeError, NodeResult};
use flowrun_core::traits::NodeHandler;
use flowrun_core::types::{Node, NodeOutput};
use flowrun_core::ExecutionState;

/// Fields every run must supply before it gets past a form node.
pub const REQUIRED_FIELDS: [&str; 3] = ["name", "email", "city"];

/// Validates the caller's form values and echoes them.
pub struct FormHandler;

impl NodeHandler for FormHandler {
    fn node_type(&self) -> &str {
        "form"
    }

    fn execute<'a>(
        &'a self,
        _node: &'a Node,
        state: &'a mut ExecutionState,
    ) -> BoxFuture<'a, NodeResult<NodeOutput>> {
        Box::pin(async move {
            validate_form(state)?;

            let name = state.form_str("name").unwrap_or_default();
            Ok(NodeOutput::new(format!("Collected user input for {}", name))
                .with("formData", Value::Object(state.form_data.clone())))
        })
    }
}

/// Fail on the first required field that is absent, not a string, or blank.
fn validate_form(state: &ExecutionState) -> NodeResult<()> {
    for field in REQUIRED_FIELDS {
        match state.form_data.get(field) {
            None => return Err(NodeError::MissingField(field.to_string())),
            Some(Value::String(s)) if !s.trim().is_empty() => {}
            Some(_) => return Err(NodeError::BlankField(field.to_string())),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowrun_test_utils::{form_data, sample_state};
    use serde_json::json;

    fn form_node() -> Node {
        Node::new("form", "form", "User Input")
    }

    #[tokio::test]
    async fn test_valid_form() {
        let mut state = sample_state("greater_than", 25.0);
        let out = FormHandler.execute(&form_node(), &mut state).await.unwrap();
        assert_eq!(out.message, "Collected user input for Alice");
        assert_eq!(out.get("formData").unwrap()["city"], "Sydney");
    }

    #[tokio::test]
    async fn test_missing_field_named() {
        let mut state = sample_state("greater_than", 25.0);
        state.form_data.remove("email");
        let err = FormHandler.execute(&form_node(), &mut state).await.unwrap_err();
        assert_eq!(err, NodeError::MissingField("email".into()));
        assert!(err.to_string().contains("email"));
    }

    #[tokio::test]
    async fn test_first_missing_field_wins() {
        let mut state = sample_state("greater_than", 25.0);
        state.form_data = form_data(&[("city", "Perth")]);
        let err = FormHandler.execute(&form_node(), &mut state).await.unwrap_err();
        assert_eq!(err, NodeError::MissingField("name".into()));
    }

    #[tokio::test]
    async fn test_blank_and_non_string_fields() {
        let mut state = sample_state("greater_than", 25.0);
        state.form_data.insert("city".into(), json!("   "));
        let err = FormHandler.execute(&form_node(), &mut state).await.unwrap_err();
        assert_eq!(err, NodeError::BlankField("city".into()));
        assert!(err.is_field_error());

        state.form_data.insert("city".into(), json!(42));
        let err = FormHandler.execute(&form_node(), &mut state).await.unwrap_err();
        assert_eq!(err, NodeError::BlankField("city".into()));
    }
}
