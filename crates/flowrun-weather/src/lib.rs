//! Temperature lookup backed by the Open-Meteo forecast API.

use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::debug;

use flowrun_core::config::WeatherConfig;
use flowrun_core::error::{FlowError, Result};
use flowrun_core::traits::TemperatureLookup;

/// Open-Meteo client with a bounded request timeout.
pub struct OpenMeteoClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ForecastResponse {
    current_weather: CurrentWeather,
}

#[derive(Deserialize)]
struct CurrentWeather {
    temperature: f64,
}

impl OpenMeteoClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("flowrun/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FlowError::Weather(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('?').to_string(),
        })
    }

    fn forecast_url(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}?latitude={:.4}&longitude={:.4}&current_weather=true",
            self.base_url, latitude, longitude
        )
    }

    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<f64> {
        let url = self.forecast_url(latitude, longitude);
        debug!(url = %url, "Requesting current weather");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FlowError::Weather(format!("request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FlowError::Weather(format!(
                "weather API returned status {}",
                status.as_u16()
            )));
        }

        let body: ForecastResponse = resp
            .json()
            .await
            .map_err(|e| FlowError::Weather(format!("decode weather response: {}", e)))?;

        Ok(body.current_weather.temperature)
    }
}

impl TemperatureLookup for OpenMeteoClient {
    fn temperature(&self, latitude: f64, longitude: f64) -> BoxFuture<'_, Result<f64>> {
        Box::pin(self.fetch(latitude, longitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use tokio::net::TcpListener;

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1/forecast", addr)
    }

    fn client(base_url: String) -> OpenMeteoClient {
        OpenMeteoClient::new(&WeatherConfig {
            base_url,
            timeout_secs: 2,
        })
        .unwrap()
    }

    #[test]
    fn test_forecast_url() {
        let c = client("https://api.open-meteo.com/v1/forecast".into());
        assert_eq!(
            c.forecast_url(-33.8688, 151.2093),
            "https://api.open-meteo.com/v1/forecast?latitude=-33.8688&longitude=151.2093&current_weather=true"
        );
    }

    #[tokio::test]
    async fn test_reads_current_temperature() {
        let app = Router::new().route(
            "/v1/forecast",
            get(|| async {
                Json(serde_json::json!({
                    "latitude": -33.875,
                    "current_weather": {"temperature": 22.4, "windspeed": 11.2}
                }))
            }),
        );
        let c = client(serve(app).await);
        assert_eq!(c.temperature(-33.8688, 151.2093).await.unwrap(), 22.4);
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let app = Router::new().route(
            "/v1/forecast",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let c = client(serve(app).await);
        let err = c.temperature(0.0, 0.0).await.unwrap_err();
        assert!(matches!(err, FlowError::Weather(ref m) if m.contains("503")));
    }

    #[tokio::test]
    async fn test_malformed_body_is_error() {
        let app = Router::new().route("/v1/forecast", get(|| async { "not json" }));
        let c = client(serve(app).await);
        let err = c.temperature(0.0, 0.0).await.unwrap_err();
        assert!(matches!(err, FlowError::Weather(ref m) if m.contains("decode")));
    }
}
