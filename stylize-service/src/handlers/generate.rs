use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap},
    Json,
};
use service_core::error::AppError;

use crate::dtos::{present, GenerateRequest, GenerateResponse};
use crate::services::metrics::{record_job_submitted, record_quota_rejection};
use crate::services::quota::check_quota;
use crate::services::Job;
use crate::startup::AppState;

const CALLBACK_PATH: &str = "/api/kie-callback";

/// Provider callbacks go back to whichever host the client reached us on.
fn callback_url(headers: &HeaderMap, default_host: &str) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .unwrap_or(default_host);

    format!("https://{}{}", host, CALLBACK_PATH)
}

#[tracing::instrument(
    skip_all,
    fields(user_id = tracing::field::Empty, style = tracing::field::Empty)
)]
pub async fn generate_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let (user_id, style) = match (present(&request.user_id), present(&request.style)) {
        (Some(user_id), Some(style)) => (user_id.to_string(), style.to_string()),
        _ => return Err(AppError::BadRequest("Missing userId or style".to_string())),
    };

    let span = tracing::Span::current();
    span.record("user_id", user_id.as_str());
    span.record("style", style.as_str());

    let job = Job::plan(&style, &request)?;

    let user = state
        .store
        .find_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if let Err(rejection) = check_quota(&user, job.kind()) {
        let subscription = user
            .subscription_type
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_default();
        tracing::info!(subscription = %subscription, kind = %job.kind(), "Quota exceeded");
        record_quota_rejection(&subscription);
        return Err(rejection);
    }

    let submission = job.submission(callback_url(&headers, &state.config.callback.default_host));

    tracing::info!(
        kind = %job.kind(),
        model = %submission.model,
        prompt = %job.prompt(),
        callback_url = %submission.callback_url,
        "Submitting generation task"
    );

    let task_id = state.provider.create_task(&submission).await?;

    // Check and debit are not atomic; concurrent requests may both pass the check.
    state.store.debit_quota(&user_id).await?;
    state
        .store
        .save_pending(&job.pending_record(&user, &task_id))
        .await?;

    record_job_submitted(&job.kind().to_string(), job.model());
    tracing::info!(task_id = %task_id, "Generation started");

    Ok(Json(GenerateResponse::started(task_id, job.kind())))
}
