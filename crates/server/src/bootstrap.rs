use std::sync::Arc;
use std::time::Duration;

use almanac_agent::llm::GeminiConfig;
use almanac_agent::{
    AgentRuntime, AuthorizationPolicy, EventStore, GeminiClient, IntentClassifier, LlmError,
    ToolRegistry,
};
use almanac_core::config::{AppConfig, ConfigError, DatabaseConfig};
use almanac_core::SystemClock;
use almanac_db::{connect_with_settings, migrations, ping, DbPool, SqlEventRepository};
use almanac_telegram::{
    BotApiClient, EventDispatcher, PollingRunner, ReconnectPolicy, TransportError,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::audit::TracingAuditSink;
use crate::bridge::RuntimeBridge;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub polling_runner: PollingRunner,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed after {attempts} attempt(s): {source}")]
    DatabaseConnect {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },
    #[error("database health check failed: {0}")]
    DatabaseHealth(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("classifier client setup failed: {0}")]
    Classifier(#[from] LlmError),
    #[error("telegram client setup failed: {0}")]
    Telegram(#[from] TransportError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_retry(&config.database).await?;
    ping(&db_pool).await.map_err(BootstrapError::DatabaseHealth)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let clock = Arc::new(SystemClock);
    let telegram = Arc::new(BotApiClient::new(&config.telegram)?);
    let gemini = GeminiClient::new(GeminiConfig::from_llm_config(&config.llm)?)?;
    info!(
        event_name = "system.bootstrap.classifier_ready",
        correlation_id = "bootstrap",
        model = gemini.model(),
        "classifier client configured"
    );

    let classifier = IntentClassifier::new(
        Arc::new(gemini),
        ToolRegistry::event_functions(),
        clock.clone(),
        classification_budget(&config),
    );
    let store = EventStore::new(Arc::new(SqlEventRepository::new(db_pool.clone())), clock);
    let policy = AuthorizationPolicy::new(config.authz.privileged_user_id.clone());
    if policy.privileged_user_id().is_none() {
        warn!(
            event_name = "system.bootstrap.operator_unconfigured",
            correlation_id = "bootstrap",
            "no privileged user configured; every mutation will be denied"
        );
    }

    let agent_runtime = Arc::new(AgentRuntime::new(
        classifier,
        store,
        policy,
        telegram.clone(),
        Arc::new(TracingAuditSink),
    ));

    let bridge = RuntimeBridge::new(agent_runtime);
    let dispatcher = EventDispatcher::with_services(bridge.clone(), bridge);
    let polling_runner = PollingRunner::new(
        telegram.clone(),
        Arc::new(dispatcher),
        telegram,
        ReconnectPolicy::default(),
        config.telegram.max_concurrent_messages,
    );

    Ok(Application { config, db_pool, polling_runner })
}

/// Upper bound on one classification, covering the configured retries.
fn classification_budget(config: &AppConfig) -> Duration {
    let attempts = u64::from(config.llm.max_retries) + 1;
    Duration::from_secs(config.llm.timeout_secs.max(1) * attempts + 1)
}

async fn connect_with_retry(database: &DatabaseConfig) -> Result<DbPool, BootstrapError> {
    let attempts = database.connect_retries.max(1);
    let mut delay = Duration::from_millis(database.connect_backoff_ms);
    let mut attempt = 1;

    loop {
        match connect_with_settings(&database.url, database.max_connections, database.timeout_secs)
            .await
        {
            Ok(pool) => return Ok(pool),
            Err(source) if attempt >= attempts => {
                return Err(BootstrapError::DatabaseConnect { attempts, source });
            }
            Err(error) => {
                warn!(
                    event_name = "system.bootstrap.database_retry",
                    correlation_id = "bootstrap",
                    attempt,
                    max_attempts = attempts,
                    error = %error,
                    "database connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
        }
    }
}
