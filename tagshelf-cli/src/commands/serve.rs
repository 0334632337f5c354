//! HTTP server command
//!
//! Runs the catalog API. Flags override the environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use tagshelf_server::http::{run_server, ServerConfig};
use tagshelf_server::CatalogConfig;

use super::{open_catalog, DatabaseArgs};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: HOST_ADDRESS:HOST_PORT or 127.0.0.1:3030)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Serve a static frontend from this directory
    #[arg(long, env = "FRONTEND_DIR")]
    pub frontend: Option<PathBuf>,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let catalog = CatalogConfig::from_env().context("Invalid configuration")?;

    let mut config = ServerConfig::from(&catalog);
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    config.cors_permissive |= args.cors_permissive;
    if args.frontend.is_some() {
        config.frontend_dir = args.frontend;
    }
    let database_url = args.db.database_url.unwrap_or(catalog.database_url);

    tracing::info!(env = ?catalog.app_env, "Starting tagshelf server on {}", config.bind_addr);

    // Schema failure is fatal: never serve against missing tables
    let pool = open_catalog(&database_url).await?;

    // Run server (blocks until shutdown)
    run_server(pool, config).await.context("Server error")?;

    Ok(())
}
