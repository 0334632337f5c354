//! Database layer - connection pool, schema, queries and repositories
//!
//! # Design Principles
//!
//! - Connection pool, no swappable global handle
//! - Caller values always travel as bound parameters
//! - Search results get their tags in one batched query (no N+1)
//! - Transactions for multi-step operations

pub mod error;
pub mod mapper;
pub mod pool;
pub mod query;
pub mod repos;
pub mod schema;

pub use error::DbError;
pub use mapper::{Article, Tag, User};
pub use pool::{begin_write, create_memory_pool, create_pool};
pub use repos::*;
