mod audit;
mod bootstrap;
mod bridge;
mod health;

use std::time::Duration;

use anyhow::Result;
use almanac_core::config::{AppConfig, LoadOptions, LogFormat};
use tracing_subscriber::EnvFilter;

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

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let listener =
        health::bind(&app.config.server.bind_address, app.config.server.health_check_port).await?;
    let health_router = health::router(app.db_pool.clone());
    let health_server = tokio::spawn(async move { axum::serve(listener, health_router).await });

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        max_concurrent_messages = app.config.telegram.max_concurrent_messages,
        "almanac-server started"
    );

    tokio::select! {
        result = app.polling_runner.start() => {
            result?;
            tracing::warn!(
                event_name = "system.server.polling_stopped",
                correlation_id = "shutdown",
                "telegram polling stopped"
            );
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!(
                event_name = "system.server.stopping",
                correlation_id = "shutdown",
                "shutdown signal received"
            );
        }
    }

    health_server.abort();
    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    if tokio::time::timeout(grace, app.db_pool.close()).await.is_err() {
        tracing::warn!(
            event_name = "system.server.pool_close_timeout",
            correlation_id = "shutdown",
            "database pool did not close within the grace period"
        );
    }
    tracing::info!(
        event_name = "system.server.stopped",
        correlation_id = "shutdown",
        "almanac-server stopped"
    );

    Ok(())
}
