//! Application state wiring configuration, providers and storage together.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use artistry_core::service::GenerationService;
use artistry_infra::config::{load_settings, resolve_data_dir};
use artistry_infra::provider::create_providers;
use artistry_infra::sqlite::generation_log::SqliteGenerationLogStore;
use artistry_infra::sqlite::pool::{DatabasePool, database_url};
use artistry_types::config::OrchestratorSettings;

pub struct AppState {
    pub service: GenerationService,
    pub history: Arc<SqliteGenerationLogStore>,
    pub settings: OrchestratorSettings,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load config, open the history database and build the service.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data dir {}", data_dir.display()))?;

        let settings = load_settings(&data_dir).await;

        let pool = DatabasePool::new(&database_url(&data_dir))
            .await
            .context("failed to open history database")?;
        let history = Arc::new(SqliteGenerationLogStore::new(pool));

        let providers = create_providers(&settings);
        let service = GenerationService::new(&settings, providers, history.clone());
        tracing::debug!(data_dir = %data_dir.display(), "application state initialized");

        Ok(Self {
            service,
            history,
            settings,
            data_dir,
        })
    }
}
