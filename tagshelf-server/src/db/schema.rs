//! Catalog schema: create-if-missing for every table
//!
//! Safe to run on every startup. A failure here is fatal for the caller:
//! the server must not serve traffic against a store missing tables.

use sqlx::{SqliteConnection, SqlitePool};

use crate::db::pool::begin_write;

/// Tables the catalog needs, with their DDL.
const TABLES: &[(&str, &str)] = &[
    (
        "articles",
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            ID INTEGER PRIMARY KEY AUTOINCREMENT,
            Name VARCHAR(512) NOT NULL CHECK (length(Name) BETWEEN 1 AND 512),
            URL VARCHAR(512) CHECK (length(URL) <= 512),
            Description VARCHAR(1024) CHECK (length(Description) <= 1024)
        )
        "#,
    ),
    (
        "tags",
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            ID INTEGER PRIMARY KEY AUTOINCREMENT,
            Name VARCHAR(16) NOT NULL UNIQUE CHECK (length(Name) BETWEEN 1 AND 16),
            Description VARCHAR(256) CHECK (length(Description) <= 256)
        )
        "#,
    ),
    (
        "article_to_tag",
        r#"
        CREATE TABLE IF NOT EXISTS article_to_tag (
            ArticleID INTEGER NOT NULL,
            TagID INTEGER NOT NULL,
            PRIMARY KEY (ArticleID, TagID)
        )
        "#,
    ),
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            ID INTEGER PRIMARY KEY AUTOINCREMENT,
            Name VARCHAR(64) NOT NULL UNIQUE,
            Password VARCHAR(256) NOT NULL
        )
        "#,
    ),
];

/// Ensure every catalog table and index exists.
///
/// All DDL runs in one transaction.
pub async fn init(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    tracing::info!("Initializing database...");

    let mut tx = begin_write(pool).await?;

    for (name, ddl) in TABLES {
        if !table_exists(&mut *tx, name).await? {
            tracing::info!(table = name, "creating table");
        }
        sqlx::query(ddl).execute(&mut *tx).await?;
    }

    // Link cleanup by tag and tag-population by article both hit these
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_article_to_tag_tag ON article_to_tag(TagID)")
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("database schema ready");
    Ok(())
}

/// Check whether a table exists.
///
/// The table name is a bound parameter, never spliced into the statement.
pub async fn table_exists(conn: &mut SqliteConnection, name: &str) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
    )
    .bind(name)
    .fetch_one(conn)
    .await?;

    Ok(exists)
}

/// Names of the tables the catalog manages.
pub fn table_names() -> impl Iterator<Item = &'static str> {
    TABLES.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::create_memory_pool;

    async fn table_count(pool: &SqlitePool) -> i64 {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('articles', 'tags', 'article_to_tag', 'users')",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        count
    }

    #[tokio::test]
    async fn creates_all_tables() {
        let pool = create_memory_pool().await.unwrap();
        init(&pool).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        for name in table_names() {
            assert!(table_exists(&mut conn, name).await.unwrap(), "{name} missing");
        }
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        let pool = create_memory_pool().await.unwrap();
        init(&pool).await.unwrap();
        init(&pool).await.unwrap();

        assert_eq!(table_count(&pool).await, 4);
    }

    #[tokio::test]
    async fn init_keeps_existing_rows() {
        let pool = create_memory_pool().await.unwrap();
        init(&pool).await.unwrap();
        sqlx::query("INSERT INTO tags (Name) VALUES ('frogs')")
            .execute(&pool)
            .await
            .unwrap();

        init(&pool).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tags")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn table_exists_treats_name_as_data() {
        let pool = create_memory_pool().await.unwrap();
        init(&pool).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let hostile = "tags; DROP TABLE tags; --";
        assert!(!table_exists(&mut conn, hostile).await.unwrap());
        assert!(table_exists(&mut conn, "tags").await.unwrap());
    }

    #[tokio::test]
    async fn store_rejects_oversized_tag_name() {
        let pool = create_memory_pool().await.unwrap();
        init(&pool).await.unwrap();

        let result = sqlx::query("INSERT INTO tags (Name) VALUES (?)")
            .bind("a".repeat(17))
            .execute(&pool)
            .await;
        assert!(result.is_err());
    }
}
