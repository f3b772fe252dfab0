//! Paybridge API Library
//!
//! A payment-orchestration bridge: accepts invoice-creation requests from a
//! storefront frontend, creates Telegram payment invoices, and records
//! payment confirmations exactly once per order as they arrive over the
//! provider webhook.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod services;

use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use gateway::BotApi;

/// Shared application state, injected at startup so every collaborator
/// (provider gateway, store handle) can be replaced with a test double.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub gateway: Arc<dyn BotApi>,
}

/// Builds the application router over the given state.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/v1/invoices/link",
            post(handlers::invoices::create_invoice_link),
        )
        .route(
            "/api/v1/telegram/webhook",
            post(handlers::webhooks::telegram_webhook),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
