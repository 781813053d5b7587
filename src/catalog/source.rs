//! Read access to the catalog tables.
//!
//! The facade only talks to a [`CatalogSource`], so tests can wrap the real
//! store to count or fail individual queries.

use anyhow::Result;
use std::time::Instant;
use tracing::debug;

use super::query::{Pagination, WhereClause};
use super::rows::{
    CategoryRow, FeatureRow, ModelRow, RelatedRows, ServiceRow, ToolRow, TypeRow, UseCaseRow,
};

/// Batched row fetchers. Each sub-table method issues exactly one query for
/// the whole id list and returns no rows, without querying, for an empty list.
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    async fn count_services(&self, clause: &WhereClause) -> Result<u64>;

    async fn fetch_services(
        &self,
        clause: &WhereClause,
        page: Option<Pagination>,
    ) -> Result<Vec<ServiceRow>>;

    async fn fetch_service_categories(&self, ids: &[String]) -> Result<Vec<CategoryRow>>;

    async fn fetch_service_types(&self, ids: &[String]) -> Result<Vec<TypeRow>>;

    async fn fetch_service_features(&self, ids: &[String]) -> Result<Vec<FeatureRow>>;

    async fn fetch_service_models(&self, ids: &[String]) -> Result<Vec<ModelRow>>;

    async fn fetch_service_use_cases(&self, ids: &[String]) -> Result<Vec<UseCaseRow>>;

    async fn fetch_service_tools(&self, ids: &[String]) -> Result<Vec<ToolRow>>;

    /// Distinct category names, sorted.
    async fn fetch_all_categories(&self) -> Result<Vec<String>>;
}

/// Fetches every sub-table for `ids` concurrently.
///
/// The six queries are issued together and awaited jointly; the first
/// failure cancels the rest and is returned.
pub async fn fetch_related_rows(source: &dyn CatalogSource, ids: &[String]) -> Result<RelatedRows> {
    if ids.is_empty() {
        return Ok(RelatedRows::default());
    }

    let start = Instant::now();

    let (categories, types, features, models, use_cases, tools) = tokio::try_join!(
        source.fetch_service_categories(ids),
        source.fetch_service_types(ids),
        source.fetch_service_features(ids),
        source.fetch_service_models(ids),
        source.fetch_service_use_cases(ids),
        source.fetch_service_tools(ids),
    )?;

    debug!(
        services = ids.len(),
        elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "Fetched related catalog rows"
    );

    Ok(RelatedRows {
        categories,
        types,
        features,
        models,
        use_cases,
        tools,
    })
}
