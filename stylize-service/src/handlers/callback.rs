use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};
use service_core::error::AppError;

use crate::dtos::KieCallback;
use crate::services::metrics::record_callback;
use crate::startup::AppState;

/// Records the final state of a task reported by the provider.
#[tracing::instrument(skip_all, fields(task_id = tracing::field::Empty))]
pub async fn kie_callback(
    State(state): State<AppState>,
    payload: Result<Json<KieCallback>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(callback) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let task_id = callback
        .task_id()
        .ok_or_else(|| AppError::BadRequest("Missing taskId".to_string()))?
        .to_string();
    tracing::Span::current().record("task_id", task_id.as_str());

    if state.store.find_transformation(&task_id).await?.is_none() {
        tracing::warn!("Callback for unknown transformation");
        return Err(AppError::NotFound("Transformation not found".to_string()));
    }

    let Some(outcome) = callback.outcome() else {
        tracing::debug!(state = ?callback.data.as_ref().and_then(|d| d.state.as_deref()), "Task still running");
        return Ok(Json(json!({ "success": true })));
    };

    let status = outcome.status().to_string();
    if !state
        .store
        .complete_transformation(&task_id, &outcome)
        .await?
    {
        return Err(AppError::NotFound("Transformation not found".to_string()));
    }

    record_callback(&status);
    tracing::info!(status = %status, "Transformation finished");

    Ok(Json(json!({ "success": true })))
}
