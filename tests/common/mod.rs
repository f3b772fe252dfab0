//! Shared test harness: the full router wired to an in-memory store and a
//! wiremock double of the Telegram Bot API.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

use paybridge_api as api;

pub const TEST_BOT_TOKEN: &str = "test-token";

pub struct TestApp {
    pub router: axum::Router,
    pub db: Arc<DatabaseConnection>,
    pub telegram: MockServer,
}

impl TestApp {
    pub async fn new() -> Self {
        let telegram = MockServer::start().await;

        // Single connection so every query sees the same in-memory database.
        let mut options = ConnectOptions::new("sqlite::memory:".to_string());
        options.max_connections(1);
        let db = Database::connect(options).await.expect("sqlite connects");
        api::db::init_schema(&db).await.expect("schema created");
        let db = Arc::new(db);

        let config = api::config::AppConfig {
            database_url: "sqlite::memory:".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            log_level: "debug".to_string(),
            log_json: false,
            telegram_bot_token: TEST_BOT_TOKEN.to_string(),
            telegram_api_base: telegram.uri(),
            auto_migrate: false,
            db_max_connections: 1,
            db_min_connections: 1,
            db_connect_timeout_secs: 5,
            db_idle_timeout_secs: 60,
        };

        let gateway: Arc<dyn api::gateway::BotApi> = Arc::new(
            api::gateway::TelegramGateway::new(telegram.uri(), TEST_BOT_TOKEN),
        );

        let state = api::AppState {
            db: db.clone(),
            config,
            gateway,
        };

        Self {
            router: api::app_router(state),
            db,
            telegram,
        }
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> Response {
        self.post_raw(uri, body.to_string()).await
    }

    pub async fn post_raw(&self, uri: &str, body: String) -> Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .expect("request built"),
            )
            .await
            .expect("router responds")
    }

    /// Requests the mock provider has seen for a given Bot API method.
    pub async fn provider_requests(&self, bot_method: &str) -> Vec<wiremock::Request> {
        self.telegram
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path().ends_with(bot_method))
            .collect()
    }

    /// Polls until at least `expected` calls to a Bot API method were seen.
    /// Needed because the confirmation send is detached from the webhook path.
    pub async fn wait_for_provider_calls(&self, bot_method: &str, expected: usize) -> usize {
        for _ in 0..50 {
            let count = self.provider_requests(bot_method).await.len();
            if count >= expected {
                return count;
            }
            tokio::time::sleep(Duration::from_millis(40)).await;
        }
        self.provider_requests(bot_method).await.len()
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub async fn response_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}
