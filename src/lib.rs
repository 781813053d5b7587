pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
pub use config::Config;
use state::SharedState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "pricing-hub")?
            .extra_field("env", "production")?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    match cli.command {
        Some(Commands::Serve { port, no_preload }) => {
            run_server(config, prometheus_handle, port, !no_preload).await
        }
        Some(Commands::List {
            service_type,
            lang,
            page,
            limit,
        }) => cli::cmd_list_services(&config, service_type.as_deref(), &lang, page, limit).await,
        Some(Commands::Show { id, lang }) => cli::cmd_show_service(&config, &id, &lang).await,
        Some(Commands::Categories) => cli::cmd_categories(&config).await,
        Some(Commands::Import { path, dry_run }) => cli::cmd_import(&config, &path, dry_run).await,
        Some(Commands::Init) => {
            if Config::create_default_if_missing()? {
                println!("Created config.toml with defaults");
            } else {
                println!("config.toml already exists");
            }
            Ok(())
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
    port_override: Option<u16>,
    preload: bool,
) -> anyhow::Result<()> {
    info!(
        "Pricing Hub v{} starting HTTP server...",
        env!("CARGO_PKG_VERSION")
    );

    let port = port_override.unwrap_or(config.server.port);
    let popular_size = config.cache.popular_preload_size;

    let shared = Arc::new(SharedState::new(config).await?);

    if preload {
        let catalog = Arc::clone(&shared.catalog);
        tokio::spawn(async move {
            services::preload_caches(catalog.as_ref(), popular_size).await;
        });
    }

    let api_state = api::create_app_state(shared, prometheus_handle).await?;
    let app = api::router(api_state).await;

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Web Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}
