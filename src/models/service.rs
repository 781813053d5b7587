use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{Locale, LocalizedList, LocalizedText, ServiceId, ServiceType};

/// A cataloged AI product or plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default)]
    pub price_details: String,
    #[serde(default)]
    pub categories: Vec<String>,
    pub types: Vec<ServiceType>,
    #[serde(default)]
    pub features: LocalizedList,
    #[serde(default)]
    pub has_free: bool,
    #[serde(rename = "hasAPI", default)]
    pub has_api: bool,
    #[serde(default)]
    pub commercial_use: bool,
    #[serde(default)]
    pub custom_models: bool,
    #[serde(default)]
    pub is_new: bool,
    pub release_year: i32,
    #[serde(default)]
    pub models: Vec<AiModel>,
    #[serde(default)]
    pub use_cases: LocalizedList,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrations: Option<LocalizedText>,
}

impl Service {
    #[must_use]
    pub fn has_type(&self, ty: ServiceType) -> bool {
        self.types.contains(&ty)
    }

    #[must_use]
    pub fn has_any_category(&self, categories: &[String]) -> bool {
        categories.iter().any(|c| self.categories.contains(c))
    }

    /// Number of `categories` this service also belongs to.
    #[must_use]
    pub fn shared_category_count(&self, categories: &[String]) -> usize {
        self.categories
            .iter()
            .filter(|c| categories.contains(c))
            .count()
    }

    /// True when at least one model is rated `min_rating` or better.
    #[must_use]
    pub fn has_model_rated_at_least(&self, min_rating: f64) -> bool {
        self.models.iter().any(|m| m.rating >= min_rating)
    }

    #[must_use]
    pub fn description_for(&self, locale: Locale) -> &str {
        self.description.resolve(locale).unwrap_or_default()
    }
}

/// One priced model or tier of a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiModel {
    pub name: String,
    #[serde(default)]
    pub description: LocalizedText,
    /// Price component (`input`, `cached_input`, `output`, ...) to display string.
    #[serde(default)]
    pub price: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_length: Option<String>,
    #[serde(default)]
    pub rating: f64,
}

/// Structured metadata per tool name.
///
/// Every value is a JSON object; anything else is rejected when rows are
/// mapped so malformed data never reaches clients.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolMetadata(BTreeMap<String, serde_json::Map<String, serde_json::Value>>);

impl ToolMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tool: String, data: serde_json::Map<String, serde_json::Value>) {
        self.0.insert(tool, data);
    }

    #[must_use]
    pub fn get(&self, tool: &str) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.0.get(tool)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&String, &serde_json::Map<String, serde_json::Value>)> {
        self.0.iter()
    }
}

/// A page of services plus the number of services matching the query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServicesPage {
    pub services: Vec<Service>,
    pub total: u64,
}
