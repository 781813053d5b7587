//! Conversion of flat rows into nested catalog types.
//!
//! Pure and deterministic. Malformed JSON columns and unknown type values
//! are reported as errors instead of being dropped.

use std::collections::{BTreeMap, HashMap};

use super::rows::{ModelRow, RelatedRows, ServiceRow};
use crate::domain::{LocalizedList, LocalizedText, ServiceId, ServiceType};
use crate::models::service::{AiModel, Service, ToolMetadata};
use crate::services::catalog_service::CatalogError;

/// Related rows grouped by service id, in row order.
#[derive(Debug, Default)]
struct Grouped {
    categories: HashMap<String, Vec<String>>,
    types: HashMap<String, Vec<ServiceType>>,
    features: HashMap<String, LocalizedList>,
    models: HashMap<String, Vec<AiModel>>,
    use_cases: HashMap<String, LocalizedList>,
    tools: HashMap<String, ToolMetadata>,
}

fn group(related: RelatedRows) -> Result<Grouped, CatalogError> {
    let mut grouped = Grouped::default();

    for row in related.categories {
        grouped
            .categories
            .entry(row.service_id)
            .or_default()
            .push(row.name);
    }

    for row in related.types {
        let ty = row.service_type.parse::<ServiceType>().map_err(|e| {
            CatalogError::InvalidData(format!("service {}: {e}", row.service_id))
        })?;
        let types = grouped.types.entry(row.service_id).or_default();
        if !types.contains(&ty) {
            types.push(ty);
        }
    }

    for row in related.features {
        grouped
            .features
            .entry(row.service_id)
            .or_default()
            .push(row.feature_es, row.feature_en);
    }

    for row in related.models {
        let service_id = row.service_id.clone();
        let model = map_model_row(row)?;
        grouped.models.entry(service_id).or_default().push(model);
    }

    for row in related.use_cases {
        grouped
            .use_cases
            .entry(row.service_id)
            .or_default()
            .push(row.use_case_es, row.use_case_en);
    }

    for row in related.tools {
        let data = parse_tool_data(&row.service_id, &row.tool_data)?;
        grouped
            .tools
            .entry(row.service_id)
            .or_default()
            .insert(row.tool_name, data);
    }

    Ok(grouped)
}

/// Parses a `tool_data` column. Only JSON objects are accepted.
pub fn parse_tool_data(
    service_id: &str,
    raw: &str,
) -> Result<serde_json::Map<String, serde_json::Value>, CatalogError> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(CatalogError::decode(
            service_id,
            "tool_data",
            format!("expected a JSON object, found {}", json_kind(&other)),
        )),
        Err(e) => Err(CatalogError::decode(service_id, "tool_data", e)),
    }
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Maps a model row. Fixed price columns come first; entries from
/// `additional_price_data` are merged over them.
pub fn map_model_row(row: ModelRow) -> Result<AiModel, CatalogError> {
    let mut price = BTreeMap::new();
    for (key, value) in [
        ("input", row.price_input),
        ("cached_input", row.price_cached_input),
        ("output", row.price_output),
    ] {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            price.insert(key.to_string(), v);
        }
    }

    if let Some(raw) = row.additional_price_data.as_deref().filter(|r| !r.trim().is_empty()) {
        let extra: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)
            .map_err(|e| CatalogError::decode(&row.service_id, "additional_price_data", e))?;

        for (key, value) in extra {
            let display = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                other => {
                    return Err(CatalogError::decode(
                        &row.service_id,
                        "additional_price_data",
                        format!("price '{key}' must be a string or number, found {}", json_kind(&other)),
                    ));
                }
            };
            price.insert(key, display);
        }
    }

    Ok(AiModel {
        name: row.name,
        description: LocalizedText::from_columns(row.description_es, row.description_en),
        price,
        context_length: row.context_length.filter(|c| !c.is_empty()),
        rating: row.rating,
    })
}

fn optional_text(es: Option<String>, en: Option<String>) -> Option<LocalizedText> {
    let text = LocalizedText::from_columns(es, en);
    (!text.is_empty()).then_some(text)
}

fn map_service_row(row: ServiceRow, grouped: &mut Grouped) -> Result<Service, CatalogError> {
    let types = grouped.types.remove(&row.id).unwrap_or_default();
    if types.is_empty() {
        return Err(CatalogError::InvalidData(format!(
            "service {} has no type",
            row.id
        )));
    }

    Ok(Service {
        description: LocalizedText::from_columns(row.description_es, row.description_en),
        price_details: row.price_details,
        categories: grouped.categories.remove(&row.id).unwrap_or_default(),
        types,
        features: grouped.features.remove(&row.id).unwrap_or_default(),
        has_free: row.has_free,
        has_api: row.has_api,
        commercial_use: row.commercial_use,
        custom_models: row.custom_models,
        is_new: row.is_new,
        release_year: row.release_year,
        models: grouped.models.remove(&row.id).unwrap_or_default(),
        use_cases: grouped.use_cases.remove(&row.id).unwrap_or_default(),
        tools: grouped.tools.remove(&row.id).filter(|t| !t.is_empty()),
        security: optional_text(row.security_es, row.security_en),
        support: optional_text(row.support_es, row.support_en),
        integrations: optional_text(row.integrations_es, row.integrations_en),
        name: row.name,
        id: ServiceId::from(row.id),
    })
}

/// Assembles full services from base rows and their related rows.
///
/// Output order follows `rows`.
pub fn assemble_services(
    rows: Vec<ServiceRow>,
    related: RelatedRows,
) -> Result<Vec<Service>, CatalogError> {
    let mut grouped = group(related)?;
    rows.into_iter()
        .map(|row| map_service_row(row, &mut grouped))
        .collect()
}
