mod bootstrap;
mod chat;
mod health;
mod report;
mod webhook;

use std::future::IntoFuture;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use rentbot_core::config::{AppConfig, LoadOptions, LogFormat};
use tokio::sync::Notify;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::bootstrap::Application;

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    let builder = tracing_subscriber::fmt().with_target(false).with_env_filter(filter);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

pub fn app_router(app: &Application) -> Router {
    let static_dir = Path::new(&app.config.server.static_dir);

    let mut router = Router::new()
        .merge(health::router(health::HealthState {
            db_pool: app.db_pool.clone(),
            catalog: app.catalog.clone(),
        }))
        .merge(chat::router(chat::ChatState {
            runtime: app.runtime.clone(),
            catalog: app.catalog.clone(),
            reporter: app.reporter.clone(),
        }));

    if app.config.messaging.enabled {
        router = router.merge(webhook::router(webhook::WebhookState {
            runtime: app.runtime.clone(),
            transcriber: app.transcriber.clone(),
        }));
    }

    router
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;
    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        messaging_enabled = app.config.messaging.enabled,
        "rentbot-server listening"
    );

    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    let shutdown = Arc::new(Notify::new());
    let trigger = shutdown.clone();
    let server = axum::serve(listener, app_router(&app))
        .with_graceful_shutdown(async move { trigger.notified().await })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result.context("server terminated unexpectedly"),
        signal = tokio::signal::ctrl_c() => signal.context("failed to listen for shutdown signal")?,
    }

    info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        grace_secs = grace.as_secs(),
        "draining in-flight requests"
    );
    shutdown.notify_one();

    match tokio::time::timeout(grace, server).await {
        Ok(result) => result.context("server failed while draining")?,
        Err(_) => warn!(
            event_name = "system.server.drain_timeout",
            correlation_id = "shutdown",
            "in-flight requests did not finish before the shutdown deadline"
        ),
    }

    app.db_pool.close().await;
    Ok(())
}
