//! Start-up cache warming.

use std::time::Instant;
use tracing::{error, info};

use crate::services::catalog_service::CatalogService;

/// What the warm-up managed to load. `None` marks a step that failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreloadSummary {
    pub categories: Option<usize>,
    pub popular: Option<usize>,
    pub snapshot: Option<usize>,
}

/// Warms the categories cache, the first page of `popular_size` services
/// and the all-services snapshot.
///
/// The three loads run concurrently. Failures are logged and never
/// returned, so a cold database cannot block start-up.
pub async fn preload_caches(catalog: &dyn CatalogService, popular_size: u32) -> PreloadSummary {
    let start = Instant::now();

    let (categories, popular, snapshot) = tokio::join!(
        catalog.get_categories(),
        catalog.list_services(None, Some(1), Some(popular_size), None),
        catalog.refresh_snapshot(),
    );

    let summary = PreloadSummary {
        categories: categories
            .map(|c| c.len())
            .inspect_err(|e| error!(error = %e, "Failed to preload categories"))
            .ok(),
        popular: popular
            .map(|p| p.services.len())
            .inspect_err(|e| error!(error = %e, "Failed to preload popular services"))
            .ok(),
        snapshot: snapshot
            .inspect_err(|e| error!(error = %e, "Failed to preload service snapshot"))
            .ok(),
    };

    info!(
        categories = ?summary.categories,
        popular = ?summary.popular,
        snapshot = ?summary.snapshot,
        elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "Cache preload finished"
    );

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::query::ServiceFilters;
    use crate::domain::{ServiceId, ServiceType};
    use crate::models::service::{Service, ServicesPage};
    use crate::services::catalog_service::CatalogError;
    use std::sync::Arc;

    struct Unavailable;

    #[async_trait::async_trait]
    impl CatalogService for Unavailable {
        async fn list_services(
            &self,
            _service_type: Option<ServiceType>,
            _page: Option<u32>,
            _limit: Option<u32>,
            _filters: Option<&ServiceFilters>,
        ) -> Result<Arc<ServicesPage>, CatalogError> {
            Err(CatalogError::Database("connection refused".into()))
        }

        async fn get_service_by_id(&self, _id: &ServiceId) -> Result<Option<Service>, CatalogError> {
            Ok(None)
        }

        async fn get_related_services(
            &self,
            _id: &ServiceId,
            _categories: &[String],
            _limit: usize,
            _service_type: Option<ServiceType>,
        ) -> Result<Vec<Service>, CatalogError> {
            Ok(Vec::new())
        }

        async fn get_categories(&self) -> Result<Vec<String>, CatalogError> {
            Ok(vec!["Text".into()])
        }

        async fn refresh_snapshot(&self) -> Result<usize, CatalogError> {
            Err(CatalogError::Database("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn failures_are_reported_not_raised() {
        let summary = preload_caches(&Unavailable, 20).await;
        assert_eq!(
            summary,
            PreloadSummary {
                categories: Some(1),
                popular: None,
                snapshot: None,
            }
        );
    }
}
