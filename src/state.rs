use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{CatalogService, SeaOrmCatalogService};

/// Long-lived services shared by the HTTP server and the command line.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub catalog: Arc<dyn CatalogService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let catalog = Arc::new(SeaOrmCatalogService::new(
            Arc::new(store.clone()),
            &config.cache,
        )) as Arc<dyn CatalogService>;

        Ok(Self::from_parts(config, store, catalog))
    }

    /// Assembles state around an existing store and catalog service.
    #[must_use]
    pub fn from_parts(config: Config, store: Store, catalog: Arc<dyn CatalogService>) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            catalog,
        }
    }
}
