//! Show service command handler

use crate::config::Config;
use crate::domain::{Locale, ServiceId, resolve_localized};
use crate::state::SharedState;

pub async fn cmd_show_service(config: &Config, id: &str, lang: &str) -> anyhow::Result<()> {
    let locale: Locale = lang.parse().map_err(anyhow::Error::msg)?;
    let state = SharedState::new(config.clone()).await?;

    let Some(service) = state.catalog.get_service_by_id(&ServiceId::from(id)).await? else {
        println!("Service '{id}' not found.");
        println!("Use 'pricing-hub list' to see IDs");
        return Ok(());
    };

    println!("{}", service.name);
    println!("{:-<70}", "");
    println!("ID:          {}", service.id);
    if let Some(description) = resolve_localized(&service.description, locale, Locale::En) {
        println!("Description: {description}");
    }
    println!("Pricing:     {}", service.price_details);
    println!("Categories:  {}", service.categories.join(", "));
    println!(
        "Free tier: {} | API: {} | Commercial use: {} | Released: {}",
        yes_no(service.has_free),
        yes_no(service.has_api),
        yes_no(service.commercial_use),
        service.release_year
    );

    let features = service.features.resolve(locale);
    if !features.is_empty() {
        println!();
        println!("Features:");
        for feature in features {
            println!("  - {feature}");
        }
    }

    if !service.models.is_empty() {
        println!();
        println!("Models:");
        for model in &service.models {
            let prices: Vec<String> = model
                .price
                .iter()
                .map(|(component, price)| format!("{component}: {price}"))
                .collect();
            println!("  {} (rating {:.1})", model.name, model.rating);
            if !prices.is_empty() {
                println!("    {}", prices.join(" | "));
            }
            if let Some(context) = &model.context_length {
                println!("    Context: {context}");
            }
        }
    }

    for (label, text) in [
        ("Security", &service.security),
        ("Support", &service.support),
        ("Integrations", &service.integrations),
    ] {
        if let Some(value) = text.as_ref().and_then(|t| t.resolve(locale)) {
            println!("{label}: {value}");
        }
    }

    Ok(())
}

const fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
