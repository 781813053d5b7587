//! Multi-field text search over assembled services.
//!
//! Matching is case-insensitive and looks at every locale, so a term found
//! only in the English text still matches when Spanish is displayed.

use crate::models::service::Service;

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// True when `term` occurs in the service name, any description, any model
/// name or description, any feature or any use case.
#[must_use]
pub fn matches_search(service: &Service, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    contains(&service.name, &needle)
        || service.description.values().any(|d| contains(d, &needle))
        || service.models.iter().any(|m| {
            contains(&m.name, &needle) || m.description.values().any(|d| contains(d, &needle))
        })
        || service.features.iter_all().any(|f| contains(f, &needle))
        || service.use_cases.iter_all().any(|u| contains(u, &needle))
}

/// Keeps the services matching `term`, preserving order.
#[must_use]
pub fn filter_by_search(services: &[Service], term: &str) -> Vec<Service> {
    services
        .iter()
        .filter(|s| matches_search(s, term))
        .cloned()
        .collect()
}
