//! Article-tag link repository
//!
//! Links are plain `(ArticleID, TagID)` pairs. A pair exists at most once;
//! inserting an existing pair is a no-op. Composite operations in the
//! article and tag repositories call the connection-level helpers below
//! from inside their own transactions.

use sqlx::{SqliteConnection, SqlitePool};

use crate::db::query;
use crate::db::DbError;

/// Link repository
pub struct LinkRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> LinkRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Link one tag to an article. Returns false when the link already existed.
    pub async fn insert(&self, article_id: i64, tag_id: i64) -> Result<bool, DbError> {
        let mut conn = self.pool.acquire().await?;
        Ok(insert_links(&mut conn, article_id, &[tag_id]).await? == 1)
    }

    /// Link several tags to an article in one statement.
    ///
    /// Returns how many new links were written.
    pub async fn insert_many(&self, article_id: i64, tag_ids: &[i64]) -> Result<u64, DbError> {
        let mut conn = self.pool.acquire().await?;
        insert_links(&mut conn, article_id, tag_ids).await
    }

    /// Remove every link of an article. Returns how many were removed.
    pub async fn remove_for_article(&self, article_id: i64) -> Result<u64, DbError> {
        let mut conn = self.pool.acquire().await?;
        clear_article_links(&mut conn, article_id).await
    }

    /// Remove every link to a tag, from all articles.
    pub async fn remove_for_tag(&self, tag_id: i64) -> Result<u64, DbError> {
        let mut conn = self.pool.acquire().await?;
        clear_tag_links(&mut conn, tag_id).await
    }
}

pub(crate) async fn insert_links(
    conn: &mut SqliteConnection,
    article_id: i64,
    tag_ids: &[i64],
) -> Result<u64, DbError> {
    if tag_ids.is_empty() {
        return Ok(0);
    }
    let stmt = query::insert_links(article_id, tag_ids);
    let result = stmt.query().execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

pub(crate) async fn clear_article_links(
    conn: &mut SqliteConnection,
    article_id: i64,
) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM article_to_tag WHERE ArticleID = ?")
        .bind(article_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn clear_tag_links(
    conn: &mut SqliteConnection,
    tag_id: i64,
) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM article_to_tag WHERE TagID = ?")
        .bind(tag_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
