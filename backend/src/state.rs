use std::sync::Arc;

use crate::{
    config::Config,
    db::connection::{create_pool, run_migrations},
    repositories::{AccountRepositoryTrait, InMemoryAccountRepository, PgAccountRepository},
    services::LifecycleService,
};

#[derive(Clone)]
pub struct AppState {
    pub lifecycle: LifecycleService,
    pub config: Config,
}

impl AppState {
    pub fn new(repository: Arc<dyn AccountRepositoryTrait>, config: Config) -> Self {
        Self {
            lifecycle: LifecycleService::new(repository, config.time_zone),
            config,
        }
    }

    /// Connects to PostgreSQL and migrates when `DATABASE_URL` is set,
    /// otherwise falls back to the in-memory store.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let repository: Arc<dyn AccountRepositoryTrait> = match config.database_url.as_deref() {
            Some(url) => {
                let pool = create_pool(url, config.db_max_connections).await?;
                run_migrations(&pool).await?;
                tracing::info!(max_connections = config.db_max_connections, "Using PostgreSQL account store");
                Arc::new(PgAccountRepository::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL not set; accounts are kept in memory and lost on restart");
                Arc::new(InMemoryAccountRepository::new())
            }
        };
        Ok(Self::new(repository, config))
    }
}
