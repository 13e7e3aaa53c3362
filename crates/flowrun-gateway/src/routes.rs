use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use tracing::{debug, error, info};

use flowrun_core::types::{ExecutionResults, Workflow};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::ExecuteRequest;

// GET /api/health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// GET /api/v1/workflows/{id}
pub async fn get_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Workflow>, ApiError> {
    debug!(workflow_id = %id, "Getting workflow");
    check_id(&id)?;
    let workflow = load(&state, &id).await?;
    Ok(Json(workflow))
}

// POST /api/v1/workflows/{id}/execute
pub async fn execute_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ExecutionResults>, ApiError> {
    debug!(workflow_id = %id, "Executing workflow");
    check_id(&id)?;

    let request: ExecuteRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::bad_request("invalid request body"))?;
    request.validate()?;

    let workflow = load(&state, &id).await?;

    let results = state
        .engine
        .execute(&workflow, request.into_state())
        .await
        .map_err(|e| {
            error!(workflow_id = %id, error = %e, "Workflow execution failed");
            ApiError::internal()
        })?;

    info!(
        workflow_id = %id,
        execution_id = %results.execution_id,
        status = ?results.status,
        "Workflow executed"
    );
    Ok(Json(results))
}

fn check_id(id: &str) -> Result<(), ApiError> {
    uuid::Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| ApiError::bad_request("invalid workflow id"))
}

async fn load(state: &AppState, id: &str) -> Result<Workflow, ApiError> {
    match state.store.get(id).await {
        Ok(Some(workflow)) => Ok(workflow),
        Ok(None) => Err(ApiError::not_found("workflow not found")),
        Err(e) => {
            error!(workflow_id = %id, error = %e, "Failed to load workflow");
            Err(ApiError::internal())
        }
    }
}
