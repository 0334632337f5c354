//! Database initialization command

use anyhow::Result;
use clap::Parser;

use tagshelf_server::db::schema;

use super::{open_catalog, DatabaseArgs};

/// Arguments for the init-db command
#[derive(Parser, Debug)]
pub struct InitDbArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,
}

/// Create any missing catalog tables
pub async fn run_init_db(args: InitDbArgs) -> Result<()> {
    let url = args.db.url();
    let pool = open_catalog(&url).await?;
    pool.close().await;

    println!("Catalog ready at {url}");
    for table in schema::table_names() {
        println!("  {table}");
    }
    Ok(())
}
