//! Tag name validation
//!
//! Tag lists travel as comma-separated query values, so a tag name can
//! never contain a comma or start/end with whitespace.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::validation::{char_len, optional_text};
use super::ValidationError;

/// Maximum length for tag names
pub const MAX_TAG_NAME_LEN: usize = 16;

/// Maximum length for tag descriptions
pub const MAX_TAG_DESCRIPTION_LEN: usize = 256;

/// No commas anywhere, no whitespace at either end.
static TAG_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^,\s](?:[^,]*[^,\s])?$").expect("invalid tag name regex"));

/// Validated tag name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagName(String);

impl TagName {
    /// Create a new tag name.
    ///
    /// # Rules
    /// - Non-empty (surrounding whitespace is trimmed first)
    /// - Max 16 characters
    /// - No commas
    ///
    /// # Example
    /// ```
    /// use tagshelf_server::models::TagName;
    ///
    /// assert!(TagName::new("search_engine").is_ok());
    /// assert!(TagName::new("a,b").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "tag name" });
        }

        if char_len(trimmed) > MAX_TAG_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "tag name",
                max: MAX_TAG_NAME_LEN,
            });
        }

        if !TAG_NAME_RE.is_match(trimmed) {
            return Err(ValidationError::InvalidFormat {
                field: "tag name",
                reason: "must not contain commas",
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for TagName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Raw tag body as submitted by clients
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A validated tag ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub name: TagName,
    pub description: Option<String>,
}

impl NewTag {
    pub fn new(name: &str, description: Option<&str>) -> Result<Self, ValidationError> {
        Ok(Self {
            name: TagName::new(name)?,
            description: optional_text("description", description, MAX_TAG_DESCRIPTION_LEN)?,
        })
    }
}

impl TryFrom<TagInput> for NewTag {
    type Error = ValidationError;

    fn try_from(input: TagInput) -> Result<Self, Self::Error> {
        Self::new(&input.name, input.description.as_deref())
    }
}
