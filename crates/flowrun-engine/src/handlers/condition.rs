use futures::future::BoxFuture;
use serde_json::json;

use flowrun_core::error::{NodeError, NodeResult};
use flowrun_core::metadata::as_number;
use flowrun_core::state::{CONDITION_RESULT_KEY, TEMPERATURE_KEY};
use flowrun_core::traits::NodeHandler;
use flowrun_core::types::{Node, NodeOutput, Operator};
use flowrun_core::ExecutionState;

/// Compares the stored temperature with the caller's threshold and leaves
/// `"true"` or `"false"` in the accumulator as the branch token.
///
/// An unrecognized operator evaluates to `false` here. Rejecting bad
/// operators is the gateway's job.
pub struct ConditionHandler;

impl NodeHandler for ConditionHandler {
    fn node_type(&self) -> &str {
        "condition"
    }

    fn execute<'a>(
        &'a self,
        _node: &'a Node,
        state: &'a mut ExecutionState,
    ) -> BoxFuture<'a, NodeResult<NodeOutput>> {
        Box::pin(async move {
            let temperature = state
                .get(TEMPERATURE_KEY)
                .ok_or_else(|| NodeError::MissingVariable(TEMPERATURE_KEY.to_string()))?;
            let temperature = as_number(temperature)
                .ok_or_else(|| NodeError::NotNumeric(TEMPERATURE_KEY.to_string()))?;

            let token = state.condition.operator.clone();
            let threshold = state.condition.threshold;
            let operator = Operator::parse(&token);
            let result = operator.is_some_and(|op| op.evaluate(temperature, threshold));

            state.set_str(CONDITION_RESULT_KEY, if result { "true" } else { "false" });

            let symbol = operator.map_or("?", |op| op.symbol());
            let label = operator.map_or(token.as_str(), |op| op.label());
            let message = if result {
                format!(
                    "Temperature {:.1}\u{b0}C is {} {:.1}\u{b0}C - condition met",
                    temperature, label, threshold
                )
            } else {
                format!(
                    "Temperature {:.1}\u{b0}C is not {} {:.1}\u{b0}C - condition not met",
                    temperature, label, threshold
                )
            };

            Ok(NodeOutput::new(message)
                .with("conditionMet", json!(result))
                .with(
                    "conditionResult",
                    json!({
                        "expression": format!("{:.1} {} {:.1}", temperature, symbol, threshold),
                        "result": result,
                        "temperature": temperature,
                        "operator": token,
                        "threshold": threshold,
                    }),
                ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowrun_test_utils::sample_state;

    fn condition_node() -> Node {
        Node::new("condition", "condition", "Check Condition")
    }

    async fn run(temperature: f64, operator: &str, threshold: f64) -> (NodeOutput, ExecutionState) {
        let mut state = sample_state(operator, threshold).with_variable(TEMPERATURE_KEY, json!(temperature));
        let out = ConditionHandler
            .execute(&condition_node(), &mut state)
            .await
            .unwrap();
        (out, state)
    }

    #[tokio::test]
    async fn test_all_operators() {
        let cases = [
            ("greater_than", 30.0, 25.0, true),
            ("greater_than", 20.0, 25.0, false),
            ("less_than", 20.0, 25.0, true),
            ("less_than", 30.0, 25.0, false),
            ("equals", 25.0, 25.0, true),
            ("equals", 25.2, 25.0, false),
            ("greater_than_or_equal", 25.0, 25.0, true),
            ("greater_than_or_equal", 24.8, 25.0, false),
            ("less_than_or_equal", 25.0, 25.0, true),
            ("less_than_or_equal", 25.2, 25.0, false),
        ];

        for (op, temp, threshold, expected) in cases {
            let (out, state) = run(temp, op, threshold).await;
            assert_eq!(out.get("conditionMet"), Some(&json!(expected)), "{op} {temp} {threshold}");
            assert_eq!(
                state.get_str(CONDITION_RESULT_KEY),
                Some(if expected { "true" } else { "false" })
            );
        }
    }

    #[tokio::test]
    async fn test_float_artifacts_are_rounded_away() {
        let (out, _) = run(0.1 + 0.2, "equals", 0.3).await;
        assert_eq!(out.get("conditionMet"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_expression_and_message() {
        let (out, _) = run(30.0, "greater_than", 25.0).await;
        assert_eq!(out.get("conditionResult").unwrap()["expression"], "30.0 > 25.0");
        assert_eq!(
            out.message,
            "Temperature 30.0\u{b0}C is greater than 25.0\u{b0}C - condition met"
        );

        let (out, _) = run(20.0, "greater_than", 25.0).await;
        assert!(out.message.ends_with("condition not met"));
    }

    #[tokio::test]
    async fn test_unknown_operator_is_false_not_error() {
        let (out, state) = run(30.0, "invalid_op", 25.0).await;
        assert_eq!(out.get("conditionMet"), Some(&json!(false)));
        assert_eq!(out.get("conditionResult").unwrap()["expression"], "30.0 ? 25.0");
        assert_eq!(state.get_str(CONDITION_RESULT_KEY), Some("false"));
    }

    #[tokio::test]
    async fn test_missing_temperature() {
        let mut state = sample_state("greater_than", 25.0);
        let err = ConditionHandler
            .execute(&condition_node(), &mut state)
            .await
            .unwrap_err();
        assert_eq!(err, NodeError::MissingVariable("temperature".into()));
        assert!(state.get(CONDITION_RESULT_KEY).is_none());
    }

    #[tokio::test]
    async fn test_non_numeric_temperature() {
        let mut state =
            sample_state("greater_than", 25.0).with_variable(TEMPERATURE_KEY, json!("hot"));
        let err = ConditionHandler
            .execute(&condition_node(), &mut state)
            .await
            .unwrap_err();
        assert_eq!(err, NodeError::NotNumeric("temperature".into()));
    }
}
