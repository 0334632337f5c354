//! Search criteria for articles and tags
//!
//! Raw query parameters (`tags`, `lookslike`, `orderby`, `reverse`,
//! `limit`, `offset`) are parsed into typed criteria here; the query
//! builder only ever sees these types.

use serde::Deserialize;

use super::article::normalize_tag_list;
use super::{Pagination, ValidationError};

/// Sort key for search results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderBy {
    #[default]
    Id,
    Name,
    Description,
}

impl OrderBy {
    /// Parse a sort key. Unrecognized or empty values fall back to `Id`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Self::Name,
            "description" => Self::Description,
            _ => Self::Id,
        }
    }

    /// Column name in both the `articles` and `tags` tables.
    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Name => "Name",
            Self::Description => "Description",
        }
    }
}

/// Ordering, substring and window shared by both search kinds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    /// Matches when Name OR Description contains this text
    pub substring: Option<String>,
    pub order_by: OrderBy,
    pub descending: bool,
    pub page: Pagination,
}

/// Article search: tag intersection plus shared criteria
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleSearch {
    /// Every one of these tags must be linked to a matching article.
    /// Empty means no tag filter.
    pub required_tags: Vec<String>,
    pub criteria: Criteria,
}

impl ArticleSearch {
    pub fn with_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            required_tags: normalize_tag_list(tags),
            ..Self::default()
        }
    }
}

/// Tag search: name IN-list plus shared criteria
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSearch {
    /// Tag names to select. Empty means every tag.
    pub names: Vec<String>,
    pub criteria: Criteria,
}

/// Raw search query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub tags: Option<String>,
    pub lookslike: Option<String>,
    pub orderby: Option<String>,
    pub reverse: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl SearchParams {
    pub fn into_article_search(self) -> Result<ArticleSearch, ValidationError> {
        let required_tags = split_tags(self.tags.as_deref());
        Ok(ArticleSearch {
            required_tags,
            criteria: self.criteria()?,
        })
    }

    pub fn into_tag_search(self) -> Result<TagSearch, ValidationError> {
        let names = split_tags(self.tags.as_deref());
        Ok(TagSearch {
            names,
            criteria: self.criteria()?,
        })
    }

    fn criteria(&self) -> Result<Criteria, ValidationError> {
        let limit = parse_count("limit", self.limit.as_deref())?;
        let offset = parse_count("offset", self.offset.as_deref())?;
        Ok(Criteria {
            substring: self
                .lookslike
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
            order_by: self.orderby.as_deref().map(OrderBy::parse).unwrap_or_default(),
            descending: parse_flag("reverse", self.reverse.as_deref())?,
            page: Pagination::new(limit, offset),
        })
    }
}

/// Split a comma-separated tag list.
fn split_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| normalize_tag_list(s.split(',')))
        .unwrap_or_default()
}

fn parse_count(field: &'static str, raw: Option<&str>) -> Result<Option<u32>, ValidationError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<u32>()
            .map(Some)
            .map_err(|_| ValidationError::Malformed {
                field,
                value: s.to_owned(),
            }),
    }
}

fn parse_flag(field: &'static str, raw: Option<&str>) -> Result<bool, ValidationError> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("0") | Some("false") | Some("no") => Ok(false),
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some(other) => Err(ValidationError::Malformed {
            field,
            value: other.to_owned(),
        }),
    }
}
