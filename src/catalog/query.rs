//! Translation of filter criteria into parameterized SQL.
//!
//! Nothing here touches the database. Every user-supplied value travels as a
//! bound parameter; the SQL text only ever contains fixed fragments and `?`
//! placeholders.

use sea_orm::Value;
use serde::{Deserialize, Serialize};

use crate::domain::{ServiceId, ServiceType};

/// Columns selected for a service row, in [`crate::catalog::rows::ServiceRow`] order.
const SERVICE_COLUMNS: &str = "s.id, s.name, s.description_es, s.description_en, s.price_details, \
     s.has_free, s.has_api, s.commercial_use, s.custom_models, s.is_new, s.release_year, \
     s.security_es, s.security_en, s.support_es, s.support_en, s.integrations_es, s.integrations_en";

/// Request-scoped filter criteria.
///
/// Field order is part of the cache key format: serializing two equal
/// filter sets always yields the same string once [`Self::canonical`] has
/// been applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceFilters {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<ServiceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub has_free: bool,
    #[serde(default, rename = "hasAPI")]
    pub has_api: bool,
    #[serde(default)]
    pub commercial_use: bool,
    #[serde(default)]
    pub custom_models: bool,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
}

impl ServiceFilters {
    /// Sorts and deduplicates set-valued fields and drops values that mean
    /// "not set" (a zero year or rating).
    #[must_use]
    pub fn canonical(&self) -> Self {
        let mut categories = self.categories.clone();
        categories.sort();
        categories.dedup();

        let mut types = self.types.clone();
        types.sort();
        types.dedup();

        Self {
            categories,
            types,
            min_rating: self.effective_min_rating(),
            release_year: self.effective_release_year(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn effective_min_rating(&self) -> Option<f64> {
        self.min_rating.filter(|r| *r > 0.0)
    }

    #[must_use]
    pub fn effective_release_year(&self) -> Option<i32> {
        self.release_year.filter(|y| *y != 0)
    }

    /// True when no criterion would restrict the result set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.canonical() == Self::default()
    }

    /// Deterministic serialization used inside cache keys.
    #[must_use]
    pub fn cache_key(&self) -> String {
        serde_json::to_string(&self.canonical()).unwrap_or_default()
    }
}

/// One-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    /// Returns `None` when either value is zero, meaning "no pagination".
    #[must_use]
    pub const fn new(page: u32, limit: u32) -> Option<Self> {
        if page == 0 || limit == 0 {
            None
        } else {
            Some(Self { page, limit })
        }
    }

    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

/// A `WHERE` predicate plus its bound values, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub sql: String,
    pub values: Vec<Value>,
}

impl Default for WhereClause {
    fn default() -> Self {
        Self {
            sql: "WHERE 1=1".to_string(),
            values: Vec::new(),
        }
    }
}

impl WhereClause {
    fn and(&mut self, condition: &str) {
        self.sql.push_str(" AND ");
        self.sql.push_str(condition);
    }

    fn and_bound(&mut self, condition: &str, values: impl IntoIterator<Item = Value>) {
        self.and(condition);
        self.values.extend(values);
    }

    /// Restricts to a single service.
    #[must_use]
    pub fn by_id(id: &ServiceId) -> Self {
        let mut clause = Self::default();
        clause.and_bound("s.id = ?", [Value::from(id.as_str())]);
        clause
    }
}

/// `?, ?, ?` for `n` parameters.
#[must_use]
pub fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Builds the predicate for the services query.
///
/// With no type and no filters the predicate matches every row.
#[must_use]
pub fn build_where_clause(
    service_type: Option<ServiceType>,
    filters: Option<&ServiceFilters>,
) -> WhereClause {
    let mut clause = WhereClause::default();

    if let Some(ty) = service_type {
        clause.and_bound(
            "EXISTS (SELECT 1 FROM service_types st WHERE st.service_id = s.id AND st.type = ?)",
            [Value::from(ty.as_str())],
        );
    }

    let Some(filters) = filters else {
        return clause;
    };
    let filters = filters.canonical();

    if !filters.types.is_empty() {
        let condition = format!(
            "EXISTS (SELECT 1 FROM service_types st WHERE st.service_id = s.id AND st.type IN ({}))",
            placeholders(filters.types.len())
        );
        clause.and_bound(
            &condition,
            filters.types.iter().map(|t| Value::from(t.as_str())),
        );
    }

    if !filters.categories.is_empty() {
        let condition = format!(
            "EXISTS (SELECT 1 FROM service_categories sc JOIN categories c ON c.id = sc.category_id \
             WHERE sc.service_id = s.id AND c.name IN ({}))",
            placeholders(filters.categories.len())
        );
        clause.and_bound(
            &condition,
            filters.categories.iter().map(|c| Value::from(c.as_str())),
        );
    }

    if let Some(min_rating) = filters.min_rating {
        clause.and_bound(
            "EXISTS (SELECT 1 FROM models m WHERE m.service_id = s.id AND m.rating >= ?)",
            [Value::from(min_rating)],
        );
    }

    if filters.has_free {
        clause.and("s.has_free = 1");
    }
    if filters.has_api {
        clause.and("s.has_api = 1");
    }
    if filters.commercial_use {
        clause.and("s.commercial_use = 1");
    }
    if filters.custom_models {
        clause.and("s.custom_models = 1");
    }
    if filters.is_new {
        clause.and("s.is_new = 1");
    }

    if let Some(year) = filters.release_year {
        clause.and_bound("s.release_year = ?", [Value::from(year)]);
    }

    clause
}

/// Total number of services matching `clause`.
#[must_use]
pub fn count_query(clause: &WhereClause) -> (String, Vec<Value>) {
    (
        format!("SELECT COUNT(*) AS total FROM ai_services s {}", clause.sql),
        clause.values.clone(),
    )
}

/// Service rows matching `clause`, ordered by name, optionally paged.
#[must_use]
pub fn services_query(clause: &WhereClause, page: Option<Pagination>) -> (String, Vec<Value>) {
    let mut sql = format!(
        "SELECT {SERVICE_COLUMNS} FROM ai_services s {} ORDER BY s.name, s.id",
        clause.sql
    );
    let mut values = clause.values.clone();

    if let Some(page) = page {
        sql.push_str(" LIMIT ? OFFSET ?");
        values.push(Value::from(i64::from(page.limit)));
        values.push(Value::from(page.offset()));
    }

    (sql, values)
}
