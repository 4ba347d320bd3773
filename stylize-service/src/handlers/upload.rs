use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use service_core::error::AppError;

use crate::dtos::{present, UploadRequest, UploadResponse};
use crate::services::metrics::record_upload;
use crate::services::ImagePayload;
use crate::startup::AppState;

#[tracing::instrument(skip_all)]
pub async fn upload_image(
    State(state): State<AppState>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let encoded = present(&request.image_base64)
        .ok_or_else(|| AppError::BadRequest("Missing imageBase64".to_string()))?;

    let image = ImagePayload::from_base64(encoded)?;
    let host = state.image_host.name();

    match state.image_host.upload(&image).await {
        Ok(image_url) => {
            record_upload(host, "success");
            Ok(Json(UploadResponse {
                success: true,
                image_url,
            }))
        }
        Err(e) => {
            record_upload(host, "failure");
            Err(e.into())
        }
    }
}
