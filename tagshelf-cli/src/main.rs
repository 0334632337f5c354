//! tagshelf CLI - tag-based article catalog
//!
//! Entry point for the `tagshelf` command-line tool:
//! - `serve`: run the HTTP API (search, upload, per-record endpoints)
//! - `init-db`: create the catalog tables
//! - `import`: bulk-load articles or tags from CSV
//! - `user`: add users and check credentials

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tagshelf_server::config::AppEnv;

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "tagshelf",
    author,
    version,
    about = "Tag-based article catalog with tag-intersection search",
    long_about = "Store articles and tags in SQLite, link them many-to-many, and find \
                  articles carrying every one of a set of tags."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create the catalog tables if they are missing
    InitDb(commands::init_db::InitDbArgs),
    /// Import articles or tags from a CSV file
    Import(commands::import::ImportArgs),
    /// Manage users (add, verify)
    User(commands::user::UserArgs),
}

/// Load `.env` unless running in production.
///
/// Runs before argument parsing so clap's `env` fallbacks see the file.
/// Returns the loaded path, or `None` in production.
fn load_env() -> Result<Option<PathBuf>, dotenvy::Error> {
    let app_env = std::env::var("APP_ENV")
        .map(|v| AppEnv::parse(&v))
        .unwrap_or_default();
    if app_env == AppEnv::Production {
        return Ok(None);
    }
    dotenvy::dotenv().map(Some)
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = load_env();
    let cli = Cli::parse();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();

    match env_file {
        Ok(Some(path)) => tracing::debug!(path = %path.display(), "loaded .env"),
        Ok(None) => {}
        Err(err) if err.not_found() => {
            tracing::warn!("no .env file found, using the process environment")
        }
        Err(err) => tracing::warn!(error = %err, "failed to load .env"),
    }

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::InitDb(args) => commands::run_init_db(args).await?,
        Commands::Import(args) => commands::run_import(args).await?,
        Commands::User(args) => commands::run_user(args).await?,
    }

    Ok(())
}
