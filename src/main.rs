use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tracing::info;

use paybridge_api as api;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    let db = api::db::establish_connection(&cfg)
        .await
        .context("failed to connect to the payment store")?;
    if cfg.auto_migrate {
        api::db::init_schema(&db)
            .await
            .context("failed to initialize schema")?;
    }

    let gateway: Arc<dyn api::gateway::BotApi> = Arc::new(api::gateway::TelegramGateway::new(
        cfg.telegram_api_base.clone(),
        cfg.telegram_bot_token.clone(),
    ));

    let state = api::AppState {
        db: Arc::new(db),
        config: cfg.clone(),
        gateway,
    };

    let cors = if cfg.is_production() {
        CorsLayer::new()
    } else {
        CorsLayer::permissive()
    };
    let app = api::app_router(state).layer(cors);

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .context("invalid host/port configuration")?;
    info!(%addr, "paybridge API listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!(%err, "failed to install shutdown signal handler");
    }
    info!("shutdown signal received");
}
