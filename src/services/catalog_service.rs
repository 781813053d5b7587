//! Domain service for catalog lookups.
//!
//! HTTP handlers and the command line only see this trait. It hides the
//! composition of query building, batched row fetching, mapping and caching.

use std::sync::Arc;
use thiserror::Error;

use crate::catalog::query::ServiceFilters;
use crate::domain::{ServiceId, ServiceType};
use crate::models::service::{Service, ServicesPage};

/// Domain errors for catalog operations.
///
/// A missing service is not an error; lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Malformed {field} for service {service_id}: {message}")]
    Decode {
        service_id: String,
        field: &'static str,
        message: String,
    },

    #[error("Invalid catalog data: {0}")]
    InvalidData(String),
}

impl CatalogError {
    /// Only store failures may succeed on a later attempt; malformed data
    /// fails the same way every time.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Database(_))
    }

    pub fn decode(
        service_id: impl Into<String>,
        field: &'static str,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::Decode {
            service_id: service_id.into(),
            field,
            message: message.to_string(),
        }
    }
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Domain service trait for catalog reads.
///
/// Errors from the underlying store are propagated unchanged; recovering from
/// them (retry, stale fallback) is the caller's job.
#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// Lists services of an optional type matching `filters`, paged when both
    /// `page` and `limit` are given.
    ///
    /// `total` counts every matching service, not just the returned page.
    ///
    /// # Errors
    ///
    /// - Returns [`CatalogError::Database`] on query failures
    /// - Returns [`CatalogError::Decode`] when stored JSON is malformed
    async fn list_services(
        &self,
        service_type: Option<ServiceType>,
        page: Option<u32>,
        limit: Option<u32>,
        filters: Option<&ServiceFilters>,
    ) -> Result<Arc<ServicesPage>, CatalogError>;

    /// Fetches one service, or `None` when the id is unknown.
    async fn get_service_by_id(&self, id: &ServiceId) -> Result<Option<Service>, CatalogError>;

    /// Other services sharing any of `categories`, most shared first.
    async fn get_related_services(
        &self,
        id: &ServiceId,
        categories: &[String],
        limit: usize,
        service_type: Option<ServiceType>,
    ) -> Result<Vec<Service>, CatalogError>;

    /// The category vocabulary, sorted.
    async fn get_categories(&self) -> Result<Vec<String>, CatalogError>;

    /// Reloads the all-services snapshot used for by-id lookups.
    ///
    /// Returns the number of services in the new snapshot.
    async fn refresh_snapshot(&self) -> Result<usize, CatalogError>;
}

/// Ranks `candidates` by the number of categories shared with `categories`.
///
/// The service itself and services without a shared category are dropped.
/// Ties keep their input order.
#[must_use]
pub fn rank_related(
    candidates: &[Service],
    id: &ServiceId,
    categories: &[String],
    limit: usize,
    service_type: Option<ServiceType>,
) -> Vec<Service> {
    let mut ranked: Vec<(usize, &Service)> = candidates
        .iter()
        .filter(|s| &s.id != id)
        .filter(|s| service_type.is_none_or(|ty| s.has_type(ty)))
        .map(|s| (s.shared_category_count(categories), s))
        .filter(|(shared, _)| *shared > 0)
        .collect();

    ranked.sort_by(|a, b| b.0.cmp(&a.0));

    ranked
        .into_iter()
        .take(limit)
        .map(|(_, s)| s.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LocalizedList, LocalizedText};

    fn service(id: &str, categories: &[&str], types: &[ServiceType]) -> Service {
        Service {
            id: ServiceId::from(id),
            name: id.to_uppercase(),
            description: LocalizedText::default(),
            price_details: String::new(),
            categories: categories.iter().map(ToString::to_string).collect(),
            types: types.to_vec(),
            features: LocalizedList::default(),
            has_free: false,
            has_api: false,
            commercial_use: false,
            custom_models: false,
            is_new: false,
            release_year: 2024,
            models: Vec::new(),
            use_cases: LocalizedList::default(),
            tools: None,
            security: None,
            support: None,
            integrations: None,
        }
    }

    #[test]
    fn only_database_errors_are_transient() {
        assert!(CatalogError::Database("locked".into()).is_transient());
        assert!(!CatalogError::decode("a", "tool_data", "expected object").is_transient());
        assert!(!CatalogError::InvalidData("no type".into()).is_transient());
    }

    #[test]
    fn rank_related_orders_by_shared_categories() {
        let a = service("a", &["X", "Y"], &[ServiceType::Api]);
        let b = service("b", &["X"], &[ServiceType::Api]);
        let c = service("c", &["X", "Y", "Z"], &[ServiceType::Api]);
        let cats = vec!["X".to_string(), "Y".to_string()];

        let ranked = rank_related(&[a.clone(), b, c], &a.id, &cats, 3, None);
        let ids: Vec<&str> = ranked.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }

    #[test]
    fn rank_related_keeps_input_order_on_ties() {
        let first = service("first", &["X"], &[ServiceType::Api]);
        let second = service("second", &["X"], &[ServiceType::Api]);
        let cats = vec!["X".to_string()];

        let ranked = rank_related(&[first, second], &ServiceId::from("z"), &cats, 5, None);
        assert_eq!(ranked[0].id.as_str(), "first");
        assert_eq!(ranked[1].id.as_str(), "second");
    }

    #[test]
    fn rank_related_respects_limit_and_type() {
        let api = service("api", &["X"], &[ServiceType::Api]);
        let editor = service("editor", &["X"], &[ServiceType::CodeEditor]);
        let cats = vec!["X".to_string()];

        let ranked = rank_related(
            &[api.clone(), editor],
            &ServiceId::from("z"),
            &cats,
            5,
            Some(ServiceType::CodeEditor),
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id.as_str(), "editor");

        let ranked = rank_related(&[api], &ServiceId::from("z"), &cats, 0, None);
        assert!(ranked.is_empty());
    }

    #[test]
    fn catalog_error_display() {
        let err = CatalogError::decode("svc", "tool_data", "expected value at line 1");
        assert_eq!(
            err.to_string(),
            "Malformed tool_data for service svc: expected value at line 1"
        );
    }
}
