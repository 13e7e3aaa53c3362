use serde_json::json;

use flowrun_core::types::{Edge, Node, Workflow};

/// Id under which the sample workflow is seeded.
pub const SAMPLE_WORKFLOW_ID: &str = "550e8400-e29b-41d4-a716-446655440000";
pub const SAMPLE_WORKFLOW_NAME: &str = "Weather Alert Workflow";

/// The weather-alert workflow inserted by `SqliteStore::seed`.
///
/// start → form → weather-api → condition; the `true` branch drafts an
/// email before ending, the `false` branch ends directly.
pub fn sample_workflow() -> Workflow {
    let mut wf = Workflow::new(SAMPLE_WORKFLOW_ID, SAMPLE_WORKFLOW_NAME);
    wf.nodes = sample_nodes();
    wf.edges = sample_edges();
    wf
}

fn sample_nodes() -> Vec<Node> {
    vec![
        Node::new("start", "start", "Start")
            .at(-160.0, 300.0)
            .with_description("Begin weather check workflow")
            .with_metadata(json!({
                "hasHandles": {"source": true, "target": false},
            })),
        Node::new("form", "form", "User Input")
            .at(152.0, 304.0)
            .with_description("Process collected data - name, email, location")
            .with_metadata(json!({
                "hasHandles": {"source": true, "target": true},
                "inputFields": ["name", "email", "city"],
                "outputVariables": ["name", "email", "city"],
            })),
        Node::new("weather-api", "integration", "Weather API")
            .at(460.0, 304.0)
            .with_description("Fetch current temperature for {{city}}")
            .with_metadata(json!({
                "hasHandles": {"source": true, "target": true},
                "inputVariables": ["city"],
                "apiEndpoint": "https://api.open-meteo.com/v1/forecast?latitude={lat}&longitude={lon}&current_weather=true",
                "outputVariables": ["temperature"],
                "options": [
                    {"city": "Sydney", "lat": -33.8688, "lon": 151.2093},
                    {"city": "Melbourne", "lat": -37.8136, "lon": 144.9631},
                    {"city": "Brisbane", "lat": -27.4698, "lon": 153.0251},
                    {"city": "Perth", "lat": -31.9505, "lon": 115.8605},
                    {"city": "Adelaide", "lat": -34.9285, "lon": 138.6007},
                ],
            })),
        Node::new("condition", "condition", "Check Condition")
            .at(794.0, 304.0)
            .with_description("Evaluate temperature threshold")
            .with_metadata(json!({
                "hasHandles": {"source": ["true", "false"], "target": true},
                "conditionExpression": "temperature {{operator}} {{threshold}}",
                "outputVariables": ["conditionMet"],
            })),
        Node::new("email", "email", "Send Alert")
            .at(1096.0, 88.0)
            .with_description("Email weather alert notification")
            .with_metadata(json!({
                "hasHandles": {"source": true, "target": true},
                "inputVariables": ["name", "city", "temperature"],
                "outputVariables": ["emailSent"],
                "emailTemplate": {
                    "subject": "Weather Alert",
                    "body": "Weather alert for {{city}}! Temperature is {{temperature}}\u{b0}C!",
                },
            })),
        Node::new("end", "end", "Complete")
            .at(1360.0, 302.0)
            .with_description("Workflow execution finished")
            .with_metadata(json!({
                "hasHandles": {"source": false, "target": true},
            })),
    ]
}

fn stroke(color: &str, width: u32) -> serde_json::Value {
    json!({"stroke": color, "strokeWidth": width})
}

fn bold(color: &str) -> serde_json::Value {
    json!({"fill": color, "fontWeight": "bold"})
}

fn sample_edges() -> Vec<Edge> {
    vec![
        Edge::new("e1", "start", "form")
            .styled("smoothstep", true, stroke("#10b981", 3))
            .with_label("Initialize"),
        Edge::new("e2", "form", "weather-api")
            .styled("smoothstep", true, stroke("#3b82f6", 3))
            .with_label("Submit Data"),
        Edge::new("e3", "weather-api", "condition")
            .styled("smoothstep", true, stroke("#f97316", 3))
            .with_label("Temperature Data"),
        Edge::new("e4", "condition", "email")
            .with_handle("true")
            .styled("smoothstep", true, stroke("#10b981", 3))
            .with_label("\u{2713} Condition Met")
            .with_label_style(bold("#10b981")),
        Edge::new("e5", "condition", "end")
            .with_handle("false")
            .styled("smoothstep", true, stroke("#6b7280", 3))
            .with_label("\u{2717} No Alert Needed")
            .with_label_style(bold("#6b7280")),
        Edge::new("e6", "email", "end")
            .styled("smoothstep", true, stroke("#ef4444", 2))
            .with_label("Alert Sent")
            .with_label_style(bold("#ef4444")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_shape() {
        let wf = sample_workflow();
        assert_eq!(wf.nodes.len(), 6);
        assert_eq!(wf.edges.len(), 6);
        assert_eq!(wf.nodes.iter().filter(|n| n.node_type == "start").count(), 1);

        let branches: Vec<_> = wf
            .edges
            .iter()
            .filter(|e| e.source == "condition")
            .filter_map(|e| e.source_handle.as_deref())
            .collect();
        assert_eq!(branches, vec!["true", "false"]);
    }

    #[test]
    fn test_every_edge_resolves() {
        let wf = sample_workflow();
        for edge in &wf.edges {
            assert!(wf.nodes.iter().any(|n| n.id == edge.source), "{}", edge.id);
            assert!(wf.nodes.iter().any(|n| n.id == edge.target), "{}", edge.id);
        }
    }

    #[test]
    fn test_weather_options() {
        let wf = sample_workflow();
        let api = wf.nodes.iter().find(|n| n.id == "weather-api").unwrap();
        let cities: Vec<_> = api.data.metadata["options"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["city"].as_str().unwrap())
            .collect();
        assert_eq!(cities, vec!["Sydney", "Melbourne", "Brisbane", "Perth", "Adelaide"]);
    }
}
