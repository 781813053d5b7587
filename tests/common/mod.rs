#![allow(dead_code)]

use pricing_hub::config::Config;
use pricing_hub::domain::{LocalizedList, LocalizedText, ServiceId, ServiceType};
use pricing_hub::models::service::{AiModel, Service};
use std::collections::BTreeMap;

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.observability.metrics_enabled = false;
    config.api.retry_delay_ms = 0;
    config
}

pub fn service(id: &str, name: &str, types: &[ServiceType], categories: &[&str]) -> Service {
    Service {
        id: ServiceId::from(id),
        name: name.to_string(),
        description: LocalizedText::from_columns(
            Some(format!("Descripción de {name}")),
            Some(format!("Description of {name}")),
        ),
        price_details: "From $10/month".to_string(),
        categories: categories.iter().map(ToString::to_string).collect(),
        types: types.to_vec(),
        features: LocalizedList {
            es: vec!["Respuestas rápidas".to_string()],
            en: vec!["Fast answers".to_string()],
        },
        has_free: false,
        has_api: types.contains(&ServiceType::Api),
        commercial_use: true,
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

pub fn model(name: &str, rating: f64) -> AiModel {
    let mut price = BTreeMap::new();
    price.insert("input".to_string(), "$1.00 / 1M tokens".to_string());
    price.insert("output".to_string(), "$4.00 / 1M tokens".to_string());

    AiModel {
        name: name.to_string(),
        description: LocalizedText::from_columns(None, Some(format!("{name} model"))),
        price,
        context_length: Some("128k".to_string()),
        rating,
    }
}

/// `count` API services named `Service 01`..`Service NN`.
pub fn numbered_services(count: usize) -> Vec<Service> {
    (1..=count)
        .map(|i| {
            service(
                &format!("svc-{i:02}"),
                &format!("Service {i:02}"),
                &[ServiceType::Api],
                &["Text"],
            )
        })
        .collect()
}
