use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::{json, Value};
use tracing::debug;

use flowrun_core::error::{FlowError, NodeError, NodeResult};
use flowrun_core::metadata::{as_number, optional_str, require_array};
use flowrun_core::state::TEMPERATURE_KEY;
use flowrun_core::traits::{NodeHandler, TemperatureLookup};
use flowrun_core::types::{Node, NodeOutput};
use flowrun_core::ExecutionState;

/// Looks up the current temperature for the form's city.
///
/// Coordinates come from the node's `options` metadata, a list of
/// `{city, lat, lon}` entries matched case-insensitively on `city`.
pub struct IntegrationHandler {
    lookup: Arc<dyn TemperatureLookup>,
}

impl IntegrationHandler {
    pub fn new(lookup: Arc<dyn TemperatureLookup>) -> Self {
        Self { lookup }
    }
}

impl NodeHandler for IntegrationHandler {
    fn node_type(&self) -> &str {
        "integration"
    }

    fn execute<'a>(
        &'a self,
        node: &'a Node,
        state: &'a mut ExecutionState,
    ) -> BoxFuture<'a, NodeResult<NodeOutput>> {
        Box::pin(async move {
            let city = state.form_str("city").unwrap_or_default().to_string();
            let meta = &node.data.metadata;

            let (lat, lon) = find_coordinates(require_array(meta, "options")?, &city)?;
            let endpoint = optional_str(meta, "apiEndpoint").unwrap_or_default();

            debug!(node_id = %node.id, city = %city, lat, lon, "Looking up temperature");

            let temperature = self
                .lookup
                .temperature(lat, lon)
                .await
                .map_err(|e| match e {
                    FlowError::Weather(msg) => NodeError::Lookup(msg),
                    other => NodeError::Lookup(other.to_string()),
                })?;

            state.set(TEMPERATURE_KEY, json!(temperature));

            Ok(NodeOutput::new(format!(
                "Current temperature in {}: {:.1}\u{b0}C",
                city, temperature
            ))
            .with("temperature", json!(temperature))
            .with("location", json!(city))
            // Descriptive record of the call for the UI, not a replay.
            .with(
                "apiResponse",
                json!({
                    "endpoint": endpoint,
                    "method": "GET",
                    "statusCode": 200,
                    "data": { "temperature": temperature },
                }),
            ))
        })
    }
}

/// Find `(lat, lon)` for `city`. Entries that are not objects are skipped.
fn find_coordinates(options: &[Value], city: &str) -> NodeResult<(f64, f64)> {
    let wanted = city.to_lowercase();
    let entry = options
        .iter()
        .filter_map(Value::as_object)
        .find(|opt| {
            opt.get("city")
                .and_then(Value::as_str)
                .is_some_and(|name| name.to_lowercase() == wanted)
        })
        .ok_or_else(|| NodeError::CityNotFound(city.to_string()))?;

    match (
        entry.get("lat").and_then(as_number),
        entry.get("lon").and_then(as_number),
    ) {
        (Some(lat), Some(lon)) => Ok((lat, lon)),
        _ => Err(NodeError::InvalidCoordinates(city.to_string())),
    }
}
