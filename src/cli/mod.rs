//! CLI module - Command-line interface for the catalog
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Pricing Hub - AI service pricing catalog
/// Serves and inspects the catalog of AI services and their plans
#[derive(Parser)]
#[command(name = "pricing-hub")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    #[command(alias = "daemon", alias = "web")]
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
        /// Skip cache warming at start-up
        #[arg(long)]
        no_preload: bool,
    },

    /// List services
    #[command(alias = "ls", alias = "l")]
    List {
        /// Only services of this type (api, individual, code-editor)
        #[arg(long = "type")]
        service_type: Option<String>,
        /// Display language (es or en)
        #[arg(long, default_value = "en")]
        lang: String,
        /// Page number
        #[arg(long, default_value = "1")]
        page: u32,
        /// Page size
        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// Show details about one service
    #[command(alias = "info", alias = "i")]
    Show {
        /// Service ID
        id: String,
        /// Display language (es or en)
        #[arg(long, default_value = "en")]
        lang: String,
    },

    /// List the category vocabulary
    Categories,

    /// Import services from a JSON file
    Import {
        /// Path to a JSON array of services
        path: String,
        /// Validate without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
