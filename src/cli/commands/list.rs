//! List services command handler

use crate::config::Config;
use crate::domain::{Locale, ServiceType};
use crate::state::SharedState;

pub async fn cmd_list_services(
    config: &Config,
    service_type: Option<&str>,
    lang: &str,
    page: u32,
    limit: u32,
) -> anyhow::Result<()> {
    let locale: Locale = lang.parse().map_err(anyhow::Error::msg)?;
    let service_type = service_type
        .map(str::parse::<ServiceType>)
        .transpose()?;

    let state = SharedState::new(config.clone()).await?;
    let result = state
        .catalog
        .list_services(service_type, Some(page), Some(limit), None)
        .await?;

    if result.services.is_empty() {
        println!("No services found.");
        println!();
        println!("Import services with: pricing-hub import services.json");
        return Ok(());
    }

    println!(
        "Services (page {page}, {} of {} total)",
        result.services.len(),
        result.total
    );
    println!("{:-<70}", "");

    for service in &result.services {
        let types: Vec<&str> = service.types.iter().map(ServiceType::as_str).collect();
        let free = if service.has_free { " [free tier]" } else { "" };

        println!("• {} ({}){}", service.name, types.join(", "), free);
        println!("  ID: {} | {}", service.id, service.price_details);
        if let Some(description) = service.description.resolve(locale) {
            println!("  {description}");
        }
    }

    Ok(())
}
