//! Subcommand implementations

pub mod import;
pub mod init_db;
pub mod serve;
pub mod user;

pub use import::run_import;
pub use init_db::run_init_db;
pub use serve::run_serve;
pub use user::run_user;

use anyhow::{Context, Result};
use clap::Args;
use sqlx::SqlitePool;
use tagshelf_server::config::{default_database_url, sqlite_file_path};
use tagshelf_server::db::{create_pool, schema};

/// Database selection shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Database URL (default: sqlite://~/.tagshelf/catalog.db)
    #[arg(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,
}

impl DatabaseArgs {
    pub fn url(&self) -> String {
        self.database_url.clone().unwrap_or_else(default_database_url)
    }
}

/// Open the catalog, creating the database file and tables as needed.
pub async fn open_catalog(database_url: &str) -> Result<SqlitePool> {
    if let Some(parent) = sqlite_file_path(database_url)
        .as_deref()
        .and_then(|path| path.parent())
        .filter(|dir| !dir.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let pool = create_pool(database_url)
        .await
        .with_context(|| format!("Failed to open database {database_url}"))?;
    schema::init(&pool)
        .await
        .context("Failed to initialize database schema")?;
    Ok(pool)
}
