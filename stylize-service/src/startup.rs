//! Application startup and lifecycle management.

use crate::config::{ImageHostKind, StoreBackend, StylizeConfig};
use crate::handlers;
use crate::services::{
    CatboxHost, ImageHost, ImgbbHost, InMemoryStore, KieProvider, MongoStore, StylizeStore,
    TaskProvider,
};
use axum::{
    http::{header, Method, Request},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: StylizeConfig,
    pub store: Arc<dyn StylizeStore>,
    pub provider: Arc<dyn TaskProvider>,
    pub image_host: Arc<dyn ImageHost>,
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    http_listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: StylizeConfig) -> Result<Self, AppError> {
        let store: Arc<dyn StylizeStore> = match config.store.backend {
            StoreBackend::Mongo => {
                let db =
                    MongoStore::connect(&config.store.mongodb.uri, &config.store.mongodb.database)
                        .await?;

                db.initialize_indexes().await.map_err(|e| {
                    tracing::error!("Failed to initialize database indexes: {}", e);
                    e
                })?;
                Arc::new(db)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; data is lost on restart");
                Arc::new(InMemoryStore::new())
            }
        };

        Self::build_with_store(config, store).await
    }

    /// Build the application around an already constructed store.
    pub async fn build_with_store(
        config: StylizeConfig,
        store: Arc<dyn StylizeStore>,
    ) -> Result<Self, AppError> {
        let kie = KieProvider::new(config.kie.clone());
        if !kie.is_configured() {
            tracing::warn!("KIE_API_KEY is not set; generation requests will fail");
        }
        let provider: Arc<dyn TaskProvider> = Arc::new(kie);

        let image_host: Arc<dyn ImageHost> = match config.image_host.kind {
            ImageHostKind::Catbox => {
                Arc::new(CatboxHost::new(config.image_host.catbox_api_url.clone()))
            }
            ImageHostKind::Imgbb => Arc::new(ImgbbHost::new(
                config.image_host.imgbb_api_url.clone(),
                config.image_host.imgbb_api_key.clone(),
            )),
        };

        tracing::info!(
            provider = provider.name(),
            image_host = image_host.name(),
            "Initialized collaborators"
        );

        let state = AppState {
            config: config.clone(),
            store,
            provider,
            image_host,
        };

        // Port 0 binds a random port for testing
        let http_addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let http_listener = TcpListener::bind(http_addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", http_addr, e);
            AppError::from(e)
        })?;
        let http_port = http_listener.local_addr()?.port();

        tracing::info!("Stylize service: HTTP on port {}", http_port);

        Ok(Self {
            http_port,
            http_listener,
            router: router(state),
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.http_listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Service shutdown complete");
        Ok(())
    }
}

/// Build the HTTP router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(handlers::health_check).fallback(handlers::method_not_allowed),
        )
        .route(
            "/ready",
            get(handlers::readiness_check).fallback(handlers::method_not_allowed),
        )
        .route(
            "/metrics",
            get(handlers::metrics_endpoint).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/generate-image",
            post(handlers::generate_image).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/upload-image",
            post(handlers::upload_image).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/kie-callback",
            post(handlers::kie_callback).fallback(handlers::method_not_allowed),
        )
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        // Browser clients call the API directly
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::AUTHORIZATION,
                    header::HeaderName::from_static(REQUEST_ID_HEADER),
                ])
                .expose_headers([header::HeaderName::from_static(REQUEST_ID_HEADER)])
                .max_age(std::time::Duration::from_secs(86400)),
        )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
