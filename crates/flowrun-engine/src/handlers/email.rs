use chrono::{SecondsFormat, Utc};
use futures::future::BoxFuture;
use serde_json::json;

use flowrun_core::error::{NodeError, NodeResult};
use flowrun_core::metadata::{as_number, optional_str, require_object};
use flowrun_core::state::TEMPERATURE_KEY;
use flowrun_core::traits::NodeHandler;
use flowrun_core::types::{Node, NodeOutput};
use flowrun_core::ExecutionState;

const SENDER: &str = "weather-alerts@example.com";

/// Drafts an alert email from the node's `emailTemplate` metadata.
/// Nothing is delivered.
pub struct EmailHandler;

impl NodeHandler for EmailHandler {
    fn node_type(&self) -> &str {
        "email"
    }

    fn execute<'a>(
        &'a self,
        node: &'a Node,
        state: &'a mut ExecutionState,
    ) -> BoxFuture<'a, NodeResult<NodeOutput>> {
        Box::pin(async move {
            let name = state.form_str("name").unwrap_or_default();
            let email = state.form_str("email").unwrap_or_default();
            let city = state.form_str("city").unwrap_or_default();
            let temperature = state
                .get(TEMPERATURE_KEY)
                .ok_or_else(|| NodeError::MissingVariable(TEMPERATURE_KEY.to_string()))
                .and_then(|v| {
                    as_number(v).ok_or_else(|| NodeError::NotNumeric(TEMPERATURE_KEY.to_string()))
                })?;

            let template = require_object(&node.data.metadata, "emailTemplate")?;
            let vars = [
                ("name", name.to_string()),
                ("city", city.to_string()),
                ("temperature", format!("{:.1}", temperature)),
            ];
            let subject = render(optional_str(template, "subject").unwrap_or_default(), &vars);
            let body = render(optional_str(template, "body").unwrap_or_default(), &vars);

            Ok(NodeOutput::new(format!("Weather alert email drafted for {}", email))
                .with(
                    "emailDraft",
                    json!({
                        "to": email,
                        "from": SENDER,
                        "subject": subject,
                        "body": body,
                        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                    }),
                )
                .with(
                    "emailContent",
                    json!({ "to": email, "subject": subject, "body": body }),
                )
                .with("emailSent", json!(true)))
        })
    }
}

/// Substitute `{{key}}` placeholders in one pass. Substituted text is not
/// rescanned, and unknown placeholders are left as they are.
fn render(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let hit = vars.iter().find_map(|(key, value)| {
            after
                .strip_prefix(key)
                .and_then(|tail| tail.strip_prefix("}}"))
                .map(|tail| (value, tail))
        });
        match hit {
            Some((value, tail)) => {
                out.push_str(value);
                rest = tail;
            }
            None => {
                out.push('{');
                rest = &rest[open + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowrun_test_utils::sample_state;

    fn email_node() -> Node {
        Node::new("email", "email", "Send Alert").with_metadata(json!({
            "emailTemplate": {
                "subject": "Weather Alert for {{name}}",
                "body": "Alert for {{city}}! Temp: {{temperature}}\u{b0}C!",
            }
        }))
    }

    #[tokio::test]
    async fn test_drafts_email() {
        let mut state =
            sample_state("greater_than", 25.0).with_variable(TEMPERATURE_KEY, json!(30.04));
        let out = EmailHandler.execute(&email_node(), &mut state).await.unwrap();

        assert_eq!(out.message, "Weather alert email drafted for alice@example.com");
        let draft = out.get("emailDraft").unwrap();
        assert_eq!(draft["to"], "alice@example.com");
        assert_eq!(draft["from"], SENDER);
        assert_eq!(draft["subject"], "Weather Alert for Alice");
        assert_eq!(draft["body"], "Alert for Sydney! Temp: 30.0\u{b0}C!");
        assert_eq!(out.get("emailSent"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_missing_template_is_step_error() {
        let mut state =
            sample_state("greater_than", 25.0).with_variable(TEMPERATURE_KEY, json!(30.0));
        let node = Node::new("email", "email", "Send Alert");
        let err = EmailHandler.execute(&node, &mut state).await.unwrap_err();
        assert!(matches!(err, NodeError::Metadata { ref key, .. } if key == "emailTemplate"));
    }

    #[tokio::test]
    async fn test_missing_temperature() {
        let mut state = sample_state("greater_than", 25.0);
        let err = EmailHandler.execute(&email_node(), &mut state).await.unwrap_err();
        assert_eq!(err, NodeError::MissingVariable("temperature".into()));
    }

    #[test]
    fn test_render_single_pass() {
        let vars = [
            ("name", "{{city}}".to_string()),
            ("city", "Perth".to_string()),
        ];
        assert_eq!(render("{{name}} in {{city}}", &vars), "{{city}} in Perth");
        assert_eq!(render("{{unknown}} {{city", &vars), "{{unknown}} {{city");
        assert_eq!(render("no placeholders", &vars), "no placeholders");
        assert_eq!(render("{{{city}}", &vars), "{Perth");
        assert_eq!(render("{{{{city}}}}", &vars), "{{Perth}}");
    }
}
