//! Flat row shapes returned by the catalog queries.

use sea_orm::FromQueryResult;

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct ServiceRow {
    pub id: String,
    pub name: String,
    pub description_es: Option<String>,
    pub description_en: Option<String>,
    pub price_details: String,
    pub has_free: bool,
    pub has_api: bool,
    pub commercial_use: bool,
    pub custom_models: bool,
    pub is_new: bool,
    pub release_year: i32,
    pub security_es: Option<String>,
    pub security_en: Option<String>,
    pub support_es: Option<String>,
    pub support_en: Option<String>,
    pub integrations_es: Option<String>,
    pub integrations_en: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct CategoryRow {
    pub service_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct TypeRow {
    pub service_id: String,
    pub service_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct FeatureRow {
    pub service_id: String,
    pub feature_es: String,
    pub feature_en: String,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct ModelRow {
    pub service_id: String,
    pub name: String,
    pub description_es: Option<String>,
    pub description_en: Option<String>,
    pub price_input: Option<String>,
    pub price_cached_input: Option<String>,
    pub price_output: Option<String>,
    pub context_length: Option<String>,
    pub rating: f64,
    pub additional_price_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct UseCaseRow {
    pub service_id: String,
    pub use_case_es: String,
    pub use_case_en: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct ToolRow {
    pub service_id: String,
    pub tool_name: String,
    pub tool_data: String,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct CountRow {
    pub total: i64,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct NameRow {
    pub name: String,
}

/// Raw rows of every sub-table for one batch of service ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelatedRows {
    pub categories: Vec<CategoryRow>,
    pub types: Vec<TypeRow>,
    pub features: Vec<FeatureRow>,
    pub models: Vec<ModelRow>,
    pub use_cases: Vec<UseCaseRow>,
    pub tools: Vec<ToolRow>,
}
