//! Application state wiring services together.
//!
//! AppState holds the concrete service instances used by both CLI commands
//! and REST API handlers. Services are generic over repository traits;
//! AppState pins them to the SQLite implementations.

use std::path::PathBuf;
use std::sync::Arc;

use parley_core::chat::service::ChatService;
use parley_core::lifecycle::metrics::MetricsWorker;
use parley_infra::sqlite::chat::SqliteChatRepository;
use parley_infra::sqlite::message::SqliteMessageRepository;
use parley_infra::sqlite::pool::DatabasePool;
use parley_types::metrics::MetricsSnapshot;
use tokio::sync::watch;

use crate::settings::Settings;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteChatService = ChatService<SqliteChatRepository, SqliteMessageRepository>;

pub type ConcreteMetricsWorker = MetricsWorker<SqliteChatRepository, SqliteMessageRepository>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    /// Latest snapshot published by the metrics worker.
    pub metrics: watch::Receiver<Option<MetricsSnapshot>>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Connect to the database (running migrations) and wire services.
    ///
    /// Also returns the metrics worker feeding `metrics`; the caller decides
    /// whether to run it.
    pub async fn init(settings: &Settings) -> anyhow::Result<(Self, ConcreteMetricsWorker)> {
        tokio::fs::create_dir_all(&settings.data_dir).await?;
        let db_pool = DatabasePool::new(&settings.database_url).await?;
        Ok(Self::from_pool(db_pool, settings))
    }

    pub fn from_pool(db_pool: DatabasePool, settings: &Settings) -> (Self, ConcreteMetricsWorker) {
        let chat_repo = SqliteChatRepository::new(db_pool.clone());
        let message_repo = SqliteMessageRepository::new(db_pool.clone());

        let worker = MetricsWorker::new(
            chat_repo.clone(),
            message_repo.clone(),
            settings.metrics_interval,
        );

        let state = Self {
            chat_service: Arc::new(ChatService::new(chat_repo, message_repo)),
            metrics: worker.subscribe(),
            data_dir: settings.data_dir.clone(),
            db_pool,
        };

        (state, worker)
    }
}
