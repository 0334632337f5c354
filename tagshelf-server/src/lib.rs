//! tagshelf-server: tag-based article catalog
//!
//! Articles and tags live in SQLite, linked many-to-many. Article search
//! is by tag intersection: an article matches when it carries every
//! requested tag. The HTTP layer exposes search, upload (JSON and CSV),
//! and per-record read/replace/delete.

pub mod config;
pub mod db;
pub mod http;
pub mod import;
pub mod models;
pub mod password;

pub use config::{CatalogConfig, ConfigError};
pub use db::{create_memory_pool, create_pool, DbError};
pub use http::{build_router, run_server, AppState, ServerConfig, ServerError};
pub use import::{ImportError, ImportSummary};
