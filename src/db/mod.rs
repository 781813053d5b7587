use crate::catalog::query::{Pagination, WhereClause};
use crate::catalog::rows::{
    CategoryRow, FeatureRow, ModelRow, ServiceRow, ToolRow, TypeRow, UseCaseRow,
};
use crate::catalog::source::CatalogSource;
use crate::models::service::Service;
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

fn is_memory_url(db_url: &str) -> bool {
    db_url.contains(":memory:") || db_url.contains("mode=memory")
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = is_memory_url(db_url);

        if !in_memory {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // An in-memory database lives only as long as its connections, so
        // the pool is pinned to one connection that never expires.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        if !in_memory {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn catalog_repo(&self) -> repositories::catalog::CatalogRepository {
        repositories::catalog::CatalogRepository::new(self.conn.clone())
    }

    pub async fn upsert_service(&self, service: &Service) -> Result<()> {
        self.catalog_repo().upsert(service).await
    }
}

#[async_trait::async_trait]
impl CatalogSource for Store {
    async fn count_services(&self, clause: &WhereClause) -> Result<u64> {
        self.catalog_repo().count(clause).await
    }

    async fn fetch_services(
        &self,
        clause: &WhereClause,
        page: Option<Pagination>,
    ) -> Result<Vec<ServiceRow>> {
        self.catalog_repo().list(clause, page).await
    }

    async fn fetch_service_categories(&self, ids: &[String]) -> Result<Vec<CategoryRow>> {
        self.catalog_repo().categories_for(ids).await
    }

    async fn fetch_service_types(&self, ids: &[String]) -> Result<Vec<TypeRow>> {
        self.catalog_repo().types_for(ids).await
    }

    async fn fetch_service_features(&self, ids: &[String]) -> Result<Vec<FeatureRow>> {
        self.catalog_repo().features_for(ids).await
    }

    async fn fetch_service_models(&self, ids: &[String]) -> Result<Vec<ModelRow>> {
        self.catalog_repo().models_for(ids).await
    }

    async fn fetch_service_use_cases(&self, ids: &[String]) -> Result<Vec<UseCaseRow>> {
        self.catalog_repo().use_cases_for(ids).await
    }

    async fn fetch_service_tools(&self, ids: &[String]) -> Result<Vec<ToolRow>> {
        self.catalog_repo().tools_for(ids).await
    }

    async fn fetch_all_categories(&self) -> Result<Vec<String>> {
        self.catalog_repo().category_names().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_urls_are_detected() {
        assert!(is_memory_url("sqlite::memory:"));
        assert!(is_memory_url("sqlite:file:catalog?mode=memory&cache=shared"));
        assert!(!is_memory_url("sqlite:data/pricing-hub.db"));
    }
}
