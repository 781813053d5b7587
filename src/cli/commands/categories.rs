//! Categories command handler

use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_categories(config: &Config) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;
    let categories = state.catalog.get_categories().await?;

    if categories.is_empty() {
        println!("No categories found.");
        return Ok(());
    }

    println!("Categories ({} total)", categories.len());
    for category in categories {
        println!("  {category}");
    }

    Ok(())
}
