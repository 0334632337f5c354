//! Tag repository
//!
//! Tag names are unique. Creation checks for an existing name first and
//! also maps a UNIQUE violation to `Conflict`, so a racing insert still
//! reports the duplicate instead of a store error.

use sqlx::{Row, SqliteConnection, SqlitePool};

use super::links::clear_tag_links;
use crate::db::error::conflict_on_unique;
use crate::db::mapper::{map_rows, Tag};
use crate::db::pool::begin_write;
use crate::db::{query, DbError};
use crate::models::{NewTag, TagSearch};

/// Tag repository
pub struct TagRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TagRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Run a tag search.
    pub async fn search(&self, search: &TagSearch) -> Result<Vec<Tag>, DbError> {
        let stmt = query::tag_search(search);
        tracing::debug!(sql = stmt.sql(), "tag search");
        let rows = stmt.query().fetch_all(self.pool).await?;
        Ok(map_rows(&rows, "tag"))
    }

    /// Get a single tag by ID.
    pub async fn get(&self, id: i64) -> Result<Tag, DbError> {
        sqlx::query_as("SELECT ID, Name, Description FROM tags WHERE ID = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("tag", id))
    }

    /// ID of the tag with this name, if any.
    pub async fn name_exists(&self, name: &str) -> Result<Option<i64>, DbError> {
        let mut conn = self.pool.acquire().await?;
        tag_id_by_name(&mut conn, name).await
    }

    /// IDs for every name, in the given order, or `None` if any is missing.
    pub async fn names_exist(&self, names: &[String]) -> Result<Option<Vec<i64>>, DbError> {
        let mut conn = self.pool.acquire().await?;
        let resolved = resolve_tag_ids(&mut conn, names).await?;
        Ok(resolved.missing.is_empty().then_some(resolved.ids))
    }

    /// Insert a tag. Returns the new ID.
    pub async fn create(&self, tag: &NewTag) -> Result<i64, DbError> {
        let name = tag.name.as_str();
        let mut conn = self.pool.acquire().await?;

        if tag_id_by_name(&mut conn, name).await?.is_some() {
            return Err(DbError::Conflict {
                resource: "tag",
                name: name.to_owned(),
            });
        }

        let result = sqlx::query("INSERT INTO tags (Name, Description) VALUES (?, ?)")
            .bind(name)
            .bind(tag.description.as_deref())
            .execute(&mut *conn)
            .await
            .map_err(|e| conflict_on_unique(e, "tag", name))?;

        let id = result.last_insert_rowid();
        tracing::info!(id, name, "tag created");
        Ok(id)
    }

    /// Replace every field of a tag. Links are untouched.
    pub async fn update(&self, id: i64, tag: &NewTag) -> Result<(), DbError> {
        let name = tag.name.as_str();
        let result = sqlx::query("UPDATE tags SET Name = ?, Description = ? WHERE ID = ?")
            .bind(name)
            .bind(tag.description.as_deref())
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "tag", name))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("tag", id));
        }
        Ok(())
    }

    /// Delete the tag row only, leaving its links behind.
    pub async fn remove(&self, id: i64) -> Result<(), DbError> {
        let mut conn = self.pool.acquire().await?;
        remove_tag_row(&mut conn, id).await
    }

    /// Delete a tag and every link to it. Linked articles stay.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let mut tx = begin_write(self.pool).await?;

        remove_tag_row(&mut tx, id).await?;
        let unlinked = clear_tag_links(&mut tx, id).await?;

        tx.commit().await?;
        tracing::info!(id, unlinked, "tag deleted");
        Ok(())
    }
}

/// Tag names resolved against the store
#[derive(Debug, Default)]
pub(crate) struct ResolvedTags {
    /// IDs of the names that exist, in input order
    pub ids: Vec<i64>,
    /// Names with no matching tag, in input order
    pub missing: Vec<String>,
}

pub(crate) async fn resolve_tag_ids(
    conn: &mut SqliteConnection,
    names: &[String],
) -> Result<ResolvedTags, DbError> {
    if names.is_empty() {
        return Ok(ResolvedTags::default());
    }

    let stmt = query::tag_ids_by_name(names);
    let rows = stmt.query().fetch_all(&mut *conn).await?;
    let mut found = Vec::with_capacity(rows.len());
    for row in &rows {
        let id: i64 = row.try_get("ID")?;
        let name: String = row.try_get("Name")?;
        found.push((name, id));
    }

    let mut resolved = ResolvedTags::default();
    for name in names {
        match found.iter().find(|(n, _)| n == name) {
            Some((_, id)) => resolved.ids.push(*id),
            None => resolved.missing.push(name.clone()),
        }
    }
    Ok(resolved)
}

async fn tag_id_by_name(conn: &mut SqliteConnection, name: &str) -> Result<Option<i64>, DbError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT ID FROM tags WHERE Name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(|(id,)| id))
}

async fn remove_tag_row(conn: &mut SqliteConnection, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM tags WHERE ID = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::not_found("tag", id));
    }
    Ok(())
}
