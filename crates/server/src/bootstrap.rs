use std::sync::Arc;

use rentbot_agent::{AgentRuntime, LlmClient, LlmError, OpenAiCompatibleClient};
use rentbot_core::config::{AppConfig, ConfigError, LoadOptions};
use rentbot_db::{
    connect_with_settings, migrations, CatalogSeed, ConversationRepository, DbPool,
    RepositoryError, SeedOutcome, SqlConversationRepository, SqlVehicleRepository,
    VehicleRepository,
};
use rentbot_messaging::{NoopTranscriber, Transcriber};
use thiserror::Error;
use tracing::info;

use crate::report::{ConversationReporter, LoggingReporter, ReportError};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub catalog: Arc<dyn VehicleRepository>,
    pub runtime: Arc<AgentRuntime>,
    pub transcriber: Arc<dyn Transcriber>,
    pub reporter: Option<Arc<dyn ConversationReporter>>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("catalog seeding failed: {0}")]
    Seed(#[source] RepositoryError),
    #[error("llm client setup failed: {0}")]
    Llm(#[source] LlmError),
    #[error("report renderer setup failed: {0}")]
    Reports(#[source] ReportError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let base_url = config.llm_base_url();
    let llm = OpenAiCompatibleClient::from_config(&config.llm, &base_url)
        .map_err(BootstrapError::Llm)?;
    bootstrap_with_llm(config, Arc::new(llm)).await
}

/// Wires the application around an already-built LLM client.
pub async fn bootstrap_with_llm(
    config: AppConfig,
    llm: Arc<dyn LlmClient>,
) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", correlation_id = "bootstrap", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
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

    let catalog: Arc<dyn VehicleRepository> = Arc::new(SqlVehicleRepository::new(db_pool.clone()));
    let conversations: Arc<dyn ConversationRepository> =
        Arc::new(SqlConversationRepository::new(db_pool.clone()));

    if config.assistant.seed_catalog {
        let outcome = CatalogSeed::load_if_empty(catalog.as_ref()).await.map_err(BootstrapError::Seed)?;
        if let SeedOutcome::Inserted(count) = outcome {
            info!(
                event_name = "system.bootstrap.catalog_seeded",
                correlation_id = "bootstrap",
                vehicles = count,
                "demo fleet loaded into empty catalog"
            );
        }
    }

    let reporter: Option<Arc<dyn ConversationReporter>> = if config.reports.enabled {
        let reporter =
            LoggingReporter::new(config.reports.recipient.clone()).map_err(BootstrapError::Reports)?;
        Some(Arc::new(reporter))
    } else {
        None
    };

    let runtime = Arc::new(AgentRuntime::new(
        catalog.clone(),
        conversations,
        llm,
        &config.assistant.currency_code,
    ));

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        llm_provider = ?config.llm.provider,
        llm_model = %config.llm.model,
        messaging_enabled = config.messaging.enabled,
        reports_enabled = config.reports.enabled,
        "application bootstrap complete"
    );

    Ok(Application {
        config,
        db_pool,
        catalog,
        runtime,
        transcriber: Arc::new(NoopTranscriber),
        reporter,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use rentbot_agent::llm::{CompletionRequest, LlmClient, LlmError, LlmReply};
    use rentbot_core::config::{AppConfig, ConfigOverrides, LlmProvider, LoadOptions};

    use super::{bootstrap, bootstrap_with_llm, BootstrapError};

    struct SilentLlm;

    #[async_trait]
    impl LlmClient for SilentLlm {
        async fn complete(&self, _: CompletionRequest) -> Result<LlmReply, LlmError> {
            Err(LlmError::Timeout)
        }
    }

    fn memory_config(seed_catalog: bool) -> AppConfig {
        let mut config = AppConfig::default();
        config.database.url = "sqlite::memory:".to_string();
        config.assistant.seed_catalog = seed_catalog;
        config
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_when_openai_has_no_key() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                llm_provider: Some(LlmProvider::OpenAi),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        let message = match result {
            Err(BootstrapError::Config(error)) => error.to_string(),
            Err(other) => panic!("expected config error, got {other}"),
            Ok(_) => panic!("expected bootstrap to fail"),
        };
        assert!(message.contains("llm.api_key"));
    }

    #[tokio::test]
    async fn bootstrap_migrates_and_seeds_the_catalog() {
        let app = bootstrap_with_llm(memory_config(true), Arc::new(SilentLlm))
            .await
            .expect("bootstrap");

        assert_eq!(app.catalog.count().await.expect("count"), 19);
        assert!(app.reporter.is_some());

        let (tables,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('vehicle', 'conversation')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("table count");
        assert_eq!(tables, 2);

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn seeding_can_be_disabled() {
        let mut config = memory_config(false);
        config.reports.enabled = false;
        let app = bootstrap_with_llm(config, Arc::new(SilentLlm)).await.expect("bootstrap");

        assert_eq!(app.catalog.count().await.expect("count"), 0);
        assert!(app.reporter.is_none());
    }
}
