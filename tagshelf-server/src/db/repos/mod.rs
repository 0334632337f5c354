//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Borrows the pool; no repository owns a connection
//! - Multi-statement writes run in one transaction
//! - Connection-level helpers are shared so composite writes stay atomic

pub mod articles;
pub mod links;
pub mod tags;
pub mod users;

pub use articles::{ArticleRepo, UnknownTagPolicy};
pub use links::LinkRepo;
pub use tags::TagRepo;
pub use users::UserRepo;
