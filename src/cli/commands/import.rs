//! Import services command handler

use anyhow::Context;
use std::path::Path;
use tracing::{error, info};

use crate::config::Config;
use crate::db::Store;
use crate::models::service::Service;

/// Reads a JSON array of services.
pub fn read_services(path: &Path) -> anyhow::Result<Vec<Service>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse services from {}", path.display()))
}

pub async fn cmd_import(config: &Config, path: &str, dry_run: bool) -> anyhow::Result<()> {
    let services = read_services(Path::new(path))?;
    println!("Read {} services from {path}", services.len());

    let invalid: Vec<&Service> = services.iter().filter(|s| s.types.is_empty()).collect();
    for service in &invalid {
        println!("  ✗ {} has no type and will be skipped", service.id);
    }

    if dry_run {
        println!(
            "Dry run: {} would be imported, {} skipped",
            services.len() - invalid.len(),
            invalid.len()
        );
        return Ok(());
    }

    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let mut imported = 0;
    let mut failed = 0;

    for service in services.iter().filter(|s| !s.types.is_empty()) {
        match store.upsert_service(service).await {
            Ok(()) => {
                imported += 1;
                info!(service_id = %service.id, "Imported service");
            }
            Err(e) => {
                failed += 1;
                error!(service_id = %service.id, error = %e, "Failed to import service");
                println!("  ✗ {}: {e}", service.id);
            }
        }
    }

    println!(
        "Imported {imported} services ({failed} failed, {} skipped)",
        invalid.len()
    );

    if failed > 0 {
        anyhow::bail!("{failed} services failed to import");
    }

    Ok(())
}
