#![allow(dead_code)]

use reqwest::Client;
use secrecy::Secret;
use serde_json::{json, Value};
use service_core::config::Config as CommonConfig;
use std::sync::Arc;
use std::time::Duration;
use stylize_service::config::{
    CallbackConfig, ImageHostConfig, ImageHostKind, KieConfig, MongoConfig, StoreBackend,
    StoreConfig, StylizeConfig,
};
use stylize_service::models::{SubscriptionType, UserAccount};
use stylize_service::services::InMemoryStore;
use stylize_service::startup::Application;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CALLBACK_HOST: &str = "stylize.test";

/// A running stylize-service backed by an in-memory store and mock collaborators.
pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryStore>,
    pub kie: MockServer,
    pub image_host: MockServer,
    pub client: Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_host(ImageHostKind::Catbox).await
    }

    pub async fn spawn_with_host(kind: ImageHostKind) -> Self {
        let kie = MockServer::start().await;
        let image_host = MockServer::start().await;

        let config = StylizeConfig {
            common: CommonConfig {
                port: 0,
                environment: "test".to_string(),
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                mongodb: MongoConfig {
                    uri: String::new(),
                    database: String::new(),
                },
            },
            kie: KieConfig {
                api_base_url: kie.uri(),
                api_key: Secret::new("test-kie-key".to_string()),
            },
            image_host: ImageHostConfig {
                kind,
                catbox_api_url: format!("{}/user/api.php", image_host.uri()),
                imgbb_api_url: image_host.uri(),
                imgbb_api_key: Secret::new("test-imgbb-key".to_string()),
            },
            callback: CallbackConfig {
                default_host: CALLBACK_HOST.to_string(),
            },
            otlp_endpoint: None,
        };

        let store = Arc::new(InMemoryStore::new());
        let app = Application::build_with_store(config, store.clone())
            .await
            .expect("Failed to build application");
        let address = format!("http://127.0.0.1:{}", app.http_port());

        tokio::spawn(async move {
            let _ = app.run_until_stopped().await;
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to build client");

        wait_until_healthy(&client, &address).await;

        Self {
            address,
            store,
            kie,
            image_host,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn seed_user(&self, user_id: &str, subscription: &str, quota: Option<i64>) {
        self.store
            .insert_user(UserAccount::new(
                user_id,
                SubscriptionType::from(subscription.to_string()),
                quota,
            ))
            .await;
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send request")
    }

    /// Accept every createTask call with `task_id`.
    pub async fn mount_kie_task(&self, task_id: &str) {
        Mock::given(method("POST"))
            .and(path("/api/v1/jobs/createTask"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "msg": "success",
                "data": { "taskId": task_id }
            })))
            .mount(&self.kie)
            .await;
    }

    /// Body of the single createTask call KIE received.
    pub async fn kie_submission(&self) -> Value {
        let requests = self
            .kie
            .received_requests()
            .await
            .expect("request recording is enabled");
        assert_eq!(requests.len(), 1, "expected exactly one createTask call");
        serde_json::from_slice(&requests[0].body).expect("createTask body is JSON")
    }
}

async fn wait_until_healthy(client: &Client, address: &str) {
    for _ in 0..50 {
        if let Ok(response) = client.get(format!("{}/health", address)).send().await {
            if response.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("stylize-service did not become healthy at {}", address);
}
