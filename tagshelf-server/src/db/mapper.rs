//! Row to record mapping
//!
//! Records are decoded by column name. A row that fails to decode is
//! logged and skipped so one bad row never sinks a whole result set.
//! Empty optional text reads back as `None`, the same as NULL.

use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

/// Article record with its linked tag names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub id: i64,
    pub name: String,
    pub url: Option<String>,
    pub description: Option<String>,
    /// Linked tag names, sorted. Filled by the tag-population pass.
    pub tags: Vec<String>,
}

/// Tag record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// User record. The stored credential is a PHC hash string.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub(crate) password_hash: String,
}

impl FromRow<'_, SqliteRow> for Article {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("ID")?,
            name: row.try_get("Name")?,
            url: optional(row, "URL")?,
            description: optional(row, "Description")?,
            tags: Vec::new(),
        })
    }
}

impl FromRow<'_, SqliteRow> for Tag {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("ID")?,
            name: row.try_get("Name")?,
            description: optional(row, "Description")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for User {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("ID")?,
            name: row.try_get("Name")?,
            password_hash: row.try_get("Password")?,
        })
    }
}

/// Nullable text column; empty string is treated as absent.
fn optional(row: &SqliteRow, column: &str) -> Result<Option<String>, sqlx::Error> {
    let value: Option<String> = row.try_get(column)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Map every row that decodes, warn about the rest.
pub fn map_rows<T>(rows: &[SqliteRow], kind: &'static str) -> Vec<T>
where
    T: for<'r> FromRow<'r, SqliteRow>,
{
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| match T::from_row(row) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(kind, index, error = %e, "skipping row that failed to map");
                None
            }
        })
        .collect()
}

/// Attach `(ArticleID, Name)` link rows to their articles.
///
/// Rows arrive ordered by article then tag name, so each article's list
/// ends up sorted.
pub fn attach_tags(articles: &mut [Article], rows: &[SqliteRow]) {
    for (index, row) in rows.iter().enumerate() {
        match link_row(row) {
            Ok((article_id, name)) => {
                if let Some(article) = articles.iter_mut().find(|a| a.id == article_id) {
                    article.tags.push(name);
                }
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping tag link that failed to map");
            }
        }
    }
}

fn link_row(row: &SqliteRow) -> Result<(i64, String), sqlx::Error> {
    Ok((row.try_get("ArticleID")?, row.try_get("Name")?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::create_memory_pool;

    #[tokio::test]
    async fn skips_rows_that_fail_to_map() {
        let pool = create_memory_pool().await.unwrap();
        let rows = sqlx::query(
            "SELECT 'one' AS ID, 'broken' AS Name, NULL AS URL, NULL AS Description \
             UNION ALL SELECT 2, 'google', 'google.com', ''",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        let articles: Vec<Article> = map_rows(&rows, "article");
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, 2);
        assert_eq!(articles[0].url.as_deref(), Some("google.com"));
        assert_eq!(articles[0].description, None);
    }

    #[tokio::test]
    async fn maps_tags_with_null_description() {
        let pool = create_memory_pool().await.unwrap();
        let rows = sqlx::query("SELECT 1 AS ID, 'frogs' AS Name, NULL AS Description")
            .fetch_all(&pool)
            .await
            .unwrap();

        let tags: Vec<Tag> = map_rows(&rows, "tag");
        assert_eq!(
            tags,
            vec![Tag {
                id: 1,
                name: "frogs".into(),
                description: None
            }]
        );
    }

    #[tokio::test]
    async fn attaches_tags_to_matching_articles() {
        let pool = create_memory_pool().await.unwrap();
        let rows = sqlx::query(
            "SELECT 1 AS ArticleID, 'frogs' AS Name \
             UNION ALL SELECT 1, 'search_engine' \
             UNION ALL SELECT 9, 'orphan'",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        let mut articles = vec![Article {
            id: 1,
            name: "google".into(),
            url: None,
            description: None,
            tags: Vec::new(),
        }];
        attach_tags(&mut articles, &rows);
        assert_eq!(articles[0].tags, vec!["frogs", "search_engine"]);
    }

    #[test]
    fn article_serializes_with_lowercase_fields() {
        let article = Article {
            id: 3,
            name: "google".into(),
            url: Some("google.com".into()),
            description: None,
            tags: vec!["frogs".into()],
        };
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["name"], "google");
        assert_eq!(json["url"], "google.com");
        assert!(json["description"].is_null());
        assert_eq!(json["tags"][0], "frogs");
    }
}
