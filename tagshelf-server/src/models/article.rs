//! Article input validation

use serde::Deserialize;

use super::validation::{optional_text, required_text};
use super::ValidationError;

/// Maximum length for article names
pub const MAX_ARTICLE_NAME_LEN: usize = 512;

/// Maximum length for article URLs
pub const MAX_ARTICLE_URL_LEN: usize = 512;

/// Maximum length for article descriptions
pub const MAX_ARTICLE_DESCRIPTION_LEN: usize = 1024;

/// Validated article name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleName(String);

impl ArticleName {
    /// Create a new article name.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    /// - Max 512 characters
    ///
    /// # Example
    /// ```
    /// use tagshelf_server::models::ArticleName;
    ///
    /// assert!(ArticleName::new("google").is_ok());
    /// assert!(ArticleName::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        required_text("name", s, MAX_ARTICLE_NAME_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ArticleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Raw article body as submitted by clients (JSON or CSV row)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleInput {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A validated article ready to be written.
///
/// `url` and `description` are `None` when absent or empty. `tags` holds
/// the referenced tag names, trimmed and de-duplicated in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub name: ArticleName,
    pub url: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl NewArticle {
    pub fn new(
        name: &str,
        url: Option<&str>,
        description: Option<&str>,
        tags: &[String],
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: ArticleName::new(name)?,
            url: optional_text("url", url, MAX_ARTICLE_URL_LEN)?,
            description: optional_text(
                "description",
                description,
                MAX_ARTICLE_DESCRIPTION_LEN,
            )?,
            tags: normalize_tag_list(tags.iter().map(String::as_str)),
        })
    }
}

impl TryFrom<ArticleInput> for NewArticle {
    type Error = ValidationError;

    fn try_from(input: ArticleInput) -> Result<Self, Self::Error> {
        Self::new(
            &input.name,
            input.url.as_deref(),
            input.description.as_deref(),
            &input.tags,
        )
    }
}

/// Trim names, drop empties and repeats, keep first-seen order.
pub fn normalize_tag_list<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names.into_iter().map(str::trim).filter(|n| !n.is_empty()) {
        if !out.iter().any(|seen| seen == name) {
            out.push(name.to_owned());
        }
    }
    out
}
