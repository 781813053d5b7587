use axum::{
    Json,
    extract::{Path, Query, RawQuery, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::validation::{
    parse_flag, parse_min_rating, parse_release_year, parse_service_type, validate_limit,
    validate_page,
};
use super::{ApiError, AppState, RelatedQuery};
use crate::catalog::query::ServiceFilters;
use crate::config::ApiConfig;
use crate::domain::{ServiceId, ServiceType};
use crate::models::service::{Service, ServicesPage};
use crate::services::{CacheStore, CatalogError, CatalogService, filter_by_search};

const DEFAULT_RELATED_LIMIT: usize = 3;

/// Parsed query string of `GET /api/services`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListServicesQuery {
    /// Ignored when `filters.types` is non-empty.
    pub service_type: Option<ServiceType>,
    pub filters: ServiceFilters,
    pub search: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl ListServicesQuery {
    /// Parses a raw query string. Repeated `types` and `category` keys
    /// accumulate; unknown keys are ignored.
    pub fn parse(raw: &str, api: &ApiConfig) -> Result<Self, ApiError> {
        let mut service_type = None;
        let mut filters = ServiceFilters::default();
        let mut search = None;
        let mut page = 1;
        let mut limit = api.default_page_size;

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "type" if !value.trim().is_empty() => {
                    service_type = Some(parse_service_type(&value)?);
                }
                "types" if !value.trim().is_empty() => {
                    filters.types.push(parse_service_type(&value)?);
                }
                "category" if !value.trim().is_empty() => {
                    filters.categories.push(value.trim().to_string());
                }
                "minRating" => filters.min_rating = parse_min_rating(&value)?,
                "hasFree" => filters.has_free = parse_flag("hasFree", &value)?,
                "hasAPI" => filters.has_api = parse_flag("hasAPI", &value)?,
                "commercialUse" => filters.commercial_use = parse_flag("commercialUse", &value)?,
                "customModels" => filters.custom_models = parse_flag("customModels", &value)?,
                "isNew" => filters.is_new = parse_flag("isNew", &value)?,
                "releaseYear" => filters.release_year = parse_release_year(&value)?,
                "search" => {
                    let term = value.trim();
                    search = (!term.is_empty()).then(|| term.to_string());
                }
                "page" => page = validate_page(&value)?,
                "limit" => limit = validate_limit(&value, api.max_page_size)?,
                _ => {}
            }
        }

        if !filters.types.is_empty() {
            service_type = None;
        }

        Ok(Self {
            service_type,
            filters: filters.canonical(),
            search,
            page,
            limit,
        })
    }

    fn filters(&self) -> Option<&ServiceFilters> {
        (!self.filters.is_empty()).then_some(&self.filters)
    }

    /// True when only the type and paging are set.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.filters.is_empty() && self.search.is_none()
    }

    /// Response cache key. Equal queries produce equal keys regardless of
    /// parameter order.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!(
            "http:{}:{}:{}:{}:{}",
            self.service_type.map_or("all", |t| t.as_str()),
            self.page,
            self.limit,
            self.filters.cache_key(),
            self.search.as_deref().unwrap_or_default().to_lowercase()
        )
    }

    /// Key of the unfiltered listing for this query's type and page, used
    /// as the last fallback.
    #[must_use]
    pub fn type_key(&self) -> String {
        format!(
            "services:{}:{}:{}",
            self.service_type.map_or("all", |t| t.as_str()),
            self.page,
            self.limit
        )
    }
}

/// One facade round trip for `query`.
///
/// A search term spans fields SQL does not see, so searches list every
/// matching service and paginate after matching.
async fn fetch_page(
    catalog: &dyn CatalogService,
    query: &ListServicesQuery,
) -> Result<Arc<ServicesPage>, CatalogError> {
    let Some(term) = query.search.as_deref() else {
        return catalog
            .list_services(
                query.service_type,
                Some(query.page),
                Some(query.limit),
                query.filters(),
            )
            .await;
    };

    let all = catalog
        .list_services(query.service_type, None, None, query.filters())
        .await?;
    let matched = filter_by_search(&all.services, term);
    let total = u64::try_from(matched.len()).unwrap_or(u64::MAX);
    let offset = (query.page as usize - 1).saturating_mul(query.limit as usize);

    Ok(Arc::new(ServicesPage {
        services: matched
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .collect(),
        total,
    }))
}

fn page_response(page: &ServicesPage, cache_control: Option<&str>, fallback: bool) -> Response {
    let mut response = (StatusCode::OK, Json(page)).into_response();
    let headers = response.headers_mut();

    if let Some(value) = cache_control.and_then(|v| HeaderValue::from_str(v).ok()) {
        headers.insert(header::CACHE_CONTROL, value);
    }
    if fallback {
        headers.insert("x-error-fallback", HeaderValue::from_static("true"));
    }

    response
}

pub async fn list_services(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> Result<Response, ApiError> {
    let query = ListServicesQuery::parse(raw.as_deref().unwrap_or_default(), &state.api)?;
    let key = query.cache_key();
    let cache_control = state.api.cache_control();

    if let Some(hit) = state.responses.get(&key).await {
        return Ok(page_response(&hit, Some(&cache_control), false));
    }

    let catalog = state.catalog();
    let result = state
        .retry
        .run_if(
            "list_services",
            || fetch_page(catalog.as_ref(), &query),
            CatalogError::is_transient,
        )
        .await;

    match result {
        Ok(page) => {
            state.responses.set(key, Arc::clone(&page)).await;
            if query.is_unfiltered() {
                state.responses.set(query.type_key(), Arc::clone(&page)).await;
            }
            Ok(page_response(&page, Some(&cache_control), false))
        }
        Err(err) => {
            error!(error = %err, query = %key, "Failed to fetch services after retries");

            let fallback = match state.responses.get_stale(&key).await {
                Some(page) => Some(page),
                None => state.responses.get_stale(&query.type_key()).await,
            };

            match fallback {
                Some(page) => {
                    warn!(query = %key, "Serving cached services as fallback");
                    metrics::counter!("services_fallback_total").increment(1);
                    Ok(page_response(&page, None, true))
                }
                None => Err(ApiError::CatalogUnavailable(err.to_string())),
            }
        }
    }
}

pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Service>, ApiError> {
    let id = ServiceId::new(id);
    let service = state
        .catalog()
        .get_service_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Service", &id))?;

    Ok(Json(service))
}

pub async fn get_related_services(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<RelatedQuery>,
) -> Result<Json<Vec<Service>>, ApiError> {
    let id = ServiceId::new(id);
    let limit = params
        .limit
        .as_deref()
        .filter(|l| !l.trim().is_empty())
        .map(|l| validate_limit(l, state.api.max_page_size))
        .transpose()?
        .map_or(DEFAULT_RELATED_LIMIT, |l| l as usize);

    let service_type = params
        .service_type
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(parse_service_type)
        .transpose()?;

    let catalog = state.catalog();
    let service = catalog
        .get_service_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Service", &id))?;

    let related = catalog
        .get_related_services(&id, &service.categories, limit, service_type)
        .await?;

    debug!(service_id = %id, related = related.len(), "Ranked related services");
    Ok(Json(related))
}

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.catalog().get_categories().await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<ListServicesQuery, ApiError> {
        ListServicesQuery::parse(raw, &ApiConfig::default())
    }

    #[test]
    fn defaults_apply_without_parameters() {
        let query = parse("").unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 9);
        assert!(query.is_unfiltered());
        assert_eq!(query.type_key(), "services:all:1:9");
    }

    #[test]
    fn type_key_is_per_page() {
        let first = parse("type=api&category=Text").unwrap();
        let third = parse("type=api&page=3").unwrap();
        assert_eq!(first.type_key(), "services:api:1:9");
        assert_ne!(first.type_key(), third.type_key());
    }

    #[test]
    fn repeated_keys_accumulate() {
        let query = parse("category=Text&category=Audio&hasFree=true&minRating=4").unwrap();
        assert_eq!(query.filters.categories, vec!["Audio", "Text"]);
        assert!(query.filters.has_free);
        assert_eq!(query.filters.min_rating, Some(4.0));
        assert!(!query.is_unfiltered());
    }

    #[test]
    fn types_override_single_type() {
        let query = parse("type=api&types=individual&types=code-editor").unwrap();
        assert_eq!(query.service_type, None);
        assert_eq!(
            query.filters.types,
            vec![ServiceType::Individual, ServiceType::CodeEditor]
        );
    }

    #[test]
    fn parameter_order_does_not_change_key() {
        let a = parse("category=Text&category=Image&isNew=true").unwrap();
        let b = parse("isNew=true&category=Image&category=Text").unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn search_is_decoded_and_trimmed() {
        let query = parse("search=%20voice+cloning%20").unwrap();
        assert_eq!(query.search.as_deref(), Some("voice cloning"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(parse("type=desktop").is_err());
        assert!(parse("page=0").is_err());
        assert!(parse("limit=1000").is_err());
        assert!(parse("hasAPI=maybe").is_err());
    }
}
