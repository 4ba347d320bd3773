//! Public image hosts used to turn an uploaded image into a URL the providers can fetch.

pub mod catbox;
pub mod imgbb;

use async_trait::async_trait;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, Engine as _, GeneralPurpose, GeneralPurposeConfig};
use service_core::error::AppError;
use thiserror::Error;

pub use catbox::CatboxHost;
pub use imgbb::ImgbbHost;

/// Standard alphabet, padding optional.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid image payload: {0}")]
    InvalidPayload(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// The host answered but did not hand back a URL.
    #[error("{host} upload failed")]
    Rejected { host: &'static str, details: String },

    #[error("Network error: {0}")]
    Network(String),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::InvalidPayload(_) => AppError::BadRequest("Invalid imageBase64".to_string()),
            UploadError::Rejected { host, details } => AppError::UpstreamError {
                error: format!("{} upload failed", host),
                details: Some(details),
            },
            other => AppError::InternalError(anyhow::anyhow!(other.to_string())),
        }
    }
}

/// A decoded image together with its canonical base64 form.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    bytes: Vec<u8>,
    base64: String,
}

impl ImagePayload {
    /// Accepts raw base64 or a `data:image/<type>;base64,` URL.
    pub fn from_base64(input: &str) -> Result<Self, UploadError> {
        let encoded: String = strip_data_url(input)
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();

        let bytes = LENIENT_BASE64
            .decode(&encoded)
            .map_err(|e| UploadError::InvalidPayload(e.to_string()))?;

        if bytes.is_empty() {
            return Err(UploadError::InvalidPayload("image is empty".to_string()));
        }

        Ok(Self {
            bytes,
            base64: encoded,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn base64(&self) -> &str {
        &self.base64
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn strip_data_url(input: &str) -> &str {
    let Some(rest) = input.strip_prefix("data:image/") else {
        return input;
    };

    match rest.split_once(";base64,") {
        Some((kind, data))
            if !kind.is_empty() && kind.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') =>
        {
            data
        }
        _ => input,
    }
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Upload the image and return its public URL.
    async fn upload(&self, image: &ImagePayload) -> Result<String, UploadError>;

    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_data_url_prefix() {
        let image = ImagePayload::from_base64("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(image.bytes(), b"hello");
        assert_eq!(image.base64(), "aGVsbG8=");
    }

    #[test]
    fn tolerates_missing_padding_and_line_breaks() {
        let image = ImagePayload::from_base64("aGVs\nbG8").unwrap();
        assert_eq!(image.bytes(), b"hello");
    }

    #[test]
    fn keeps_unrecognised_prefix() {
        assert_eq!(strip_data_url("data:text/plain;base64,AAAA"), "data:text/plain;base64,AAAA");
        assert_eq!(strip_data_url("data:image/svg+xml;base64,AAAA"), "data:image/svg+xml;base64,AAAA");
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            ImagePayload::from_base64("not base64 at all!"),
            Err(UploadError::InvalidPayload(_))
        ));
    }

    #[test]
    fn rejects_empty_payload() {
        assert!(ImagePayload::from_base64("data:image/png;base64,").is_err());
    }
}
