//! Database connection pool management
//!
//! The pool replaces broken connections on its own (`test_before_acquire`),
//! so there is no shared handle to swap. A background task still pings the
//! store on a fixed interval so outages show up in the logs.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tokio::task::JoinHandle;

/// Default maximum connections for the pool.
/// SQLite is single-writer; a handful of readers is plenty for a catalog.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// How long a request may wait for a pooled connection
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// How long SQLite waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a SQLite connection pool, creating the database file if needed.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool("sqlite://catalog.db").await?;
/// ```
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    create_pool_with_options(database_url, DEFAULT_MAX_CONNECTIONS).await
}

/// Create a SQLite connection pool with custom options.
pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .test_before_acquire(true)
        .connect_with(options)
        .await
}

/// Create a private in-memory database.
///
/// Uses a single long-lived connection: an in-memory database disappears
/// with its last connection.
pub async fn create_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await
}

/// Begin a write transaction holding the RESERVED lock from the start.
///
/// A deferred transaction that reads first fails its lock upgrade with
/// SQLITE_BUSY under a concurrent writer, bypassing `busy_timeout`.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// Run the liveness query.
pub async fn ping(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}

/// Spawn the periodic health check.
///
/// Logs a warning for every failed ping and an info line when the store
/// comes back. Runs until the returned handle is aborted or the runtime
/// shuts down.
pub fn spawn_health_check(pool: SqlitePool, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        let mut healthy = true;
        loop {
            ticker.tick().await;
            match ping(&pool).await {
                Ok(()) => {
                    if !healthy {
                        tracing::info!("database reachable again");
                    }
                    healthy = true;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "database health check failed");
                    healthy = false;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pool_acquires_connection() {
        let pool = create_memory_pool().await.expect("pool creation failed");

        let result: (i64,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query failed");

        assert_eq!(result.0, 1);
    }

    #[tokio::test]
    async fn file_pool_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        let url = format!("sqlite://{}", path.display());

        let pool = create_pool(&url).await.expect("pool creation failed");
        ping(&pool).await.unwrap();

        assert!(path.exists());
    }

    #[tokio::test]
    async fn concurrent_pool_access() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("c.db").display());
        let pool = create_pool(&url).await.unwrap();

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let pool = pool.clone();
                tokio::spawn(async move {
                    let result: (i64,) = sqlx::query_as("SELECT ?")
                        .bind(i as i64)
                        .fetch_one(&pool)
                        .await
                        .expect("concurrent query failed");
                    result.0
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let result = handle.await.expect("task panicked");
            assert_eq!(result, i as i64);
        }
    }

    #[tokio::test]
    async fn health_check_keeps_running() {
        let pool = create_memory_pool().await.unwrap();
        let handle = spawn_health_check(pool, Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!handle.is_finished());

        handle.abort();
    }
}
