pub mod database;
pub mod image_host;
pub mod memory;
pub mod metrics;
pub mod prompts;
pub mod providers;
pub mod quota;

pub use database::{MongoStore, StylizeStore};
pub use image_host::{CatboxHost, ImageHost, ImagePayload, ImgbbHost, UploadError};
pub use memory::InMemoryStore;
pub use metrics::{get_metrics, init_metrics};
pub use prompts::Job;
pub use providers::{KieProvider, ProviderError, TaskProvider};
