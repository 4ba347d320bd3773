use secrecy::Secret;
use service_core::config::{self as core_config, get_env};
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct StylizeConfig {
    pub common: core_config::Config,
    pub store: StoreConfig,
    pub kie: KieConfig,
    pub image_host: ImageHostConfig,
    pub callback: CallbackConfig,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    /// Process-local store for local development and tests.
    Memory,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub mongodb: MongoConfig,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct KieConfig {
    pub api_base_url: String,
    pub api_key: Secret<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageHostKind {
    Catbox,
    Imgbb,
}

#[derive(Debug, Clone)]
pub struct ImageHostConfig {
    pub kind: ImageHostKind,
    pub catbox_api_url: String,
    pub imgbb_api_url: String,
    pub imgbb_api_key: Secret<String>,
}

#[derive(Debug, Clone)]
pub struct CallbackConfig {
    /// Host used for the provider callback URL when a request carries no `Host` header.
    pub default_host: String,
}

impl StylizeConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = common_config.is_production();

        let backend = match get_env("STORE_BACKEND", Some("mongo"), false)?.as_str() {
            "mongo" => StoreBackend::Mongo,
            "memory" if !is_prod => StoreBackend::Memory,
            other => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "unsupported STORE_BACKEND '{}'",
                    other
                )))
            }
        };

        let mongodb = match backend {
            StoreBackend::Mongo => MongoConfig {
                uri: get_env("MONGODB_URI", None, is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("stylize_db"), is_prod)?,
            },
            StoreBackend::Memory => MongoConfig {
                uri: String::new(),
                database: String::new(),
            },
        };

        let kind = match get_env("IMAGE_HOST", Some("catbox"), false)?.as_str() {
            "catbox" => ImageHostKind::Catbox,
            "imgbb" => ImageHostKind::Imgbb,
            other => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "unsupported IMAGE_HOST '{}'",
                    other
                )))
            }
        };

        // The ImgBB key only matters when ImgBB is the selected host.
        let imgbb_api_key = if kind == ImageHostKind::Imgbb {
            get_env("IMGBB_API_KEY", None, is_prod)?
        } else {
            env::var("IMGBB_API_KEY").unwrap_or_default()
        };

        Ok(StylizeConfig {
            common: common_config,
            store: StoreConfig { backend, mongodb },
            kie: KieConfig {
                api_base_url: get_env("KIE_API_BASE_URL", Some("https://api.kie.ai"), false)?,
                api_key: Secret::new(get_env("KIE_API_KEY", Some(""), is_prod)?),
            },
            image_host: ImageHostConfig {
                kind,
                catbox_api_url: get_env(
                    "CATBOX_API_URL",
                    Some("https://catbox.moe/user/api.php"),
                    false,
                )?,
                imgbb_api_url: get_env("IMGBB_API_URL", Some("https://api.imgbb.com"), false)?,
                imgbb_api_key: Secret::new(imgbb_api_key),
            },
            callback: CallbackConfig {
                default_host: get_env("CALLBACK_DEFAULT_HOST", Some("localhost:8080"), is_prod)?,
            },
            otlp_endpoint: optional_env("OTLP_ENDPOINT"),
        })
    }
}

/// An optional setting; unset and empty both mean "not configured".
fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}
