pub mod callback;
pub mod generate;
pub mod upload;

pub use callback::{KieCallback, KieCallbackData};
pub use generate::{GenerateRequest, GenerateResponse};
pub use upload::{UploadRequest, UploadResponse};

/// Treat empty strings the way a missing field is treated.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
