use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use flowrun_core::config::GatewayConfig;
use flowrun_core::traits::WorkflowStore;
use flowrun_engine::WorkflowEngine;

use crate::routes;
use crate::state::AppState;

/// HTTP gateway server built on axum.
pub struct GatewayServer {
    config: GatewayConfig,
    engine: Arc<WorkflowEngine>,
    store: Arc<dyn WorkflowStore>,
}

impl GatewayServer {
    pub fn new(
        config: GatewayConfig,
        engine: Arc<WorkflowEngine>,
        store: Arc<dyn WorkflowStore>,
    ) -> Self {
        Self {
            config,
            engine,
            store,
        }
    }

    /// Run the gateway server until the cancellation token is triggered.
    pub async fn run(&self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let state = Arc::new(AppState {
            config: self.config.clone(),
            engine: self.engine.clone(),
            store: self.store.clone(),
        });
        let app = build_router(state);

        let listener = TcpListener::bind(&self.config.bind).await?;
        info!(bind = %self.config.bind, "Gateway listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!("Gateway shut down");
        Ok(())
    }
}

/// Routes plus CORS, ready to serve or to drive from tests.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/v1/workflows/{id}", get(routes::get_workflow))
        .route("/api/v1/workflows/{id}/execute", post(routes::execute_workflow))
        .layer(cors)
        .with_state(state)
}

/// An empty origin list means permissive CORS.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
