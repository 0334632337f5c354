//! CSV import command

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use tagshelf_server::import::{import_articles, import_tags};

use super::{open_catalog, DatabaseArgs};

/// What the CSV file holds
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ImportKind {
    /// Rows of `name,url,description,tags`
    Articles,
    /// Rows of `name,description`
    Tags,
}

/// Arguments for the import command
#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Record kind
    #[arg(value_enum)]
    pub kind: ImportKind,

    /// CSV file to read
    pub file: PathBuf,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

/// Import a CSV file into the catalog
pub async fn run_import(args: ImportArgs) -> Result<()> {
    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let reader = BufReader::new(file);
    let pool = open_catalog(&args.db.url()).await?;

    let summary = match args.kind {
        ImportKind::Articles => import_articles(&pool, reader).await,
        ImportKind::Tags => import_tags(&pool, reader).await,
    }
    .with_context(|| format!("Import of {} failed", args.file.display()))?;
    pool.close().await;

    println!(
        "Imported {} rows, skipped {}",
        summary.inserted, summary.skipped
    );
    Ok(())
}
