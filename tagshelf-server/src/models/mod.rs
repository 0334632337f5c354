//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod article;
pub mod tag;
pub mod user;
pub mod search;
pub mod pagination;

pub use validation::ValidationError;
pub use article::{ArticleInput, ArticleName, NewArticle};
pub use tag::{NewTag, TagInput, TagName};
pub use user::{NewUser, UserName};
pub use search::{ArticleSearch, Criteria, OrderBy, SearchParams, TagSearch};
pub use pagination::Pagination;
