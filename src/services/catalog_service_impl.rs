//! SQL-backed implementation of [`CatalogService`].

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::catalog::mappers::assemble_services;
use crate::catalog::query::{Pagination, ServiceFilters, WhereClause, build_where_clause};
use crate::catalog::source::{CatalogSource, fetch_related_rows};
use crate::config::CacheConfig;
use crate::domain::{ServiceId, ServiceType};
use crate::models::service::{Service, ServicesPage};
use crate::services::cache::{CacheStore, MemoryCache, ServiceSnapshot};
use crate::services::catalog_service::{CatalogError, CatalogService, rank_related};

const CATEGORIES_KEY: &str = "categories";

/// Cache key for one `list_services` call.
///
/// Filters are serialized in canonical form so equal filter sets always
/// share a key. A filter set that restricts nothing keys like no filters.
#[must_use]
pub fn list_cache_key(
    service_type: Option<ServiceType>,
    page: Option<u32>,
    limit: Option<u32>,
    filters: Option<&ServiceFilters>,
) -> String {
    format!(
        "services:{}:{}:{}:{}",
        service_type.map_or("all", |t| t.as_str()),
        page.unwrap_or(1),
        limit.unwrap_or(0),
        filters
            .filter(|f| !f.is_empty())
            .map(ServiceFilters::cache_key)
            .unwrap_or_default()
    )
}

/// Checks the criteria SQL cannot see once rows are grouped: category
/// intersection and minimum model rating.
fn passes_post_filter(service: &Service, filters: &ServiceFilters) -> bool {
    let filters = filters.canonical();

    if !filters.categories.is_empty() && !service.has_any_category(&filters.categories) {
        return false;
    }

    if filters
        .min_rating
        .is_some_and(|min| !service.has_model_rated_at_least(min))
    {
        return false;
    }

    if !filters.types.is_empty() && !filters.types.iter().any(|t| service.has_type(*t)) {
        return false;
    }

    true
}

pub struct SeaOrmCatalogService {
    source: Arc<dyn CatalogSource>,
    lists: MemoryCache<Arc<ServicesPage>>,
    services: MemoryCache<Service>,
    categories: MemoryCache<Arc<Vec<String>>>,
    snapshot: ServiceSnapshot,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub fn new(source: Arc<dyn CatalogSource>, config: &CacheConfig) -> Self {
        let ttl = Duration::from_secs(config.ttl_seconds);
        Self {
            source,
            lists: MemoryCache::new("services_list", ttl, config.max_entries),
            services: MemoryCache::new("service_by_id", ttl, config.max_entries),
            categories: MemoryCache::new("categories", ttl, 1),
            snapshot: ServiceSnapshot::new(ttl),
        }
    }

    /// Runs the count, page and related-row queries and maps the result.
    async fn load(
        &self,
        clause: &WhereClause,
        page: Option<Pagination>,
    ) -> Result<ServicesPage, CatalogError> {
        let start = Instant::now();

        let (total, rows) = tokio::try_join!(
            self.source.count_services(clause),
            self.source.fetch_services(clause, page),
        )?;

        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let related = fetch_related_rows(self.source.as_ref(), &ids).await?;
        let services = assemble_services(rows, related)?;

        debug!(
            services = services.len(),
            total,
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Loaded services from database"
        );

        Ok(ServicesPage { services, total })
    }

    /// The fresh snapshot, reloading it when expired.
    async fn all_services(&self) -> Result<Arc<Vec<Service>>, CatalogError> {
        if let Some(all) = self.snapshot.get().await {
            return Ok(all);
        }
        let page = self.load(&WhereClause::default(), None).await?;
        let all = Arc::new(page.services);
        self.snapshot.set(Arc::clone(&all)).await;
        Ok(all)
    }
}

#[async_trait::async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn list_services(
        &self,
        service_type: Option<ServiceType>,
        page: Option<u32>,
        limit: Option<u32>,
        filters: Option<&ServiceFilters>,
    ) -> Result<Arc<ServicesPage>, CatalogError> {
        let key = list_cache_key(service_type, page, limit, filters);
        if let Some(hit) = self.lists.get(&key).await {
            return Ok(hit);
        }

        let pagination = match (page, limit) {
            (Some(page), Some(limit)) => Pagination::new(page, limit),
            _ => None,
        };
        let clause = build_where_clause(service_type, filters);
        let mut result = self.load(&clause, pagination).await?;

        if let Some(filters) = filters {
            let before = result.services.len();
            result.services.retain(|s| passes_post_filter(s, filters));
            let dropped = before - result.services.len();
            if dropped > 0 {
                warn!(dropped, "Post-filter removed services the query matched");
                result.total = result
                    .total
                    .saturating_sub(u64::try_from(dropped).unwrap_or(u64::MAX));
            }
        }

        let unrestricted = service_type.is_none()
            && pagination.is_none()
            && filters.is_none_or(ServiceFilters::is_empty);
        if unrestricted {
            self.snapshot.set(Arc::new(result.services.clone())).await;
        }

        let result = Arc::new(result);
        self.lists.set(key, Arc::clone(&result)).await;
        Ok(result)
    }

    async fn get_service_by_id(&self, id: &ServiceId) -> Result<Option<Service>, CatalogError> {
        let key = format!("service:{id}");
        if let Some(hit) = self.services.get(&key).await {
            return Ok(Some(hit));
        }

        if let Some(found) = self.snapshot.find(id).await {
            self.services.set(key, found.clone()).await;
            return Ok(Some(found));
        }

        let page = self.load(&WhereClause::by_id(id), None).await?;
        let Some(found) = page.services.into_iter().next() else {
            debug!(service_id = %id, "Service not found");
            return Ok(None);
        };

        self.services.set(key, found.clone()).await;
        Ok(Some(found))
    }

    async fn get_related_services(
        &self,
        id: &ServiceId,
        categories: &[String],
        limit: usize,
        service_type: Option<ServiceType>,
    ) -> Result<Vec<Service>, CatalogError> {
        if categories.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let all = self.all_services().await?;
        Ok(rank_related(&all, id, categories, limit, service_type))
    }

    async fn get_categories(&self) -> Result<Vec<String>, CatalogError> {
        if let Some(hit) = self.categories.get(CATEGORIES_KEY).await {
            return Ok(hit.as_ref().clone());
        }

        let mut names = self.source.fetch_all_categories().await?;
        names.sort();
        names.dedup();

        self.categories
            .set(CATEGORIES_KEY.to_string(), Arc::new(names.clone()))
            .await;
        Ok(names)
    }

    async fn refresh_snapshot(&self) -> Result<usize, CatalogError> {
        let page = self.load(&WhereClause::default(), None).await?;
        let count = page.services.len();
        self.snapshot.set(Arc::new(page.services)).await;
        Ok(count)
    }
}
