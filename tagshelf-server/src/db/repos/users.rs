//! User repository
//!
//! Only the argon2 hash of a credential is ever written.

use sqlx::SqlitePool;

use crate::db::error::conflict_on_unique;
use crate::db::mapper::User;
use crate::db::DbError;
use crate::models::NewUser;
use crate::password::{hash_password, verify_password};

/// User repository
pub struct UserRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Look a user up by name.
    pub async fn by_name(&self, name: &str) -> Result<User, DbError> {
        sqlx::query_as("SELECT ID, Name, Password FROM users WHERE Name = ?")
            .bind(name)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", name))
    }

    /// Hash the password and store a new user. Returns the new ID.
    pub async fn create(&self, user: &NewUser) -> Result<i64, DbError> {
        let name = user.name.as_str();
        let hash = hash_password(user.password())?;

        let result = sqlx::query("INSERT INTO users (Name, Password) VALUES (?, ?)")
            .bind(name)
            .bind(&hash)
            .execute(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "user", name))?;

        let id = result.last_insert_rowid();
        tracing::info!(id, name, "user created");
        Ok(id)
    }

    /// Check a name/password pair.
    ///
    /// An unknown name and a wrong password both yield `Ok(false)`.
    pub async fn verify(&self, name: &str, password: &str) -> Result<bool, DbError> {
        let user = match self.by_name(name).await {
            Ok(user) => user,
            Err(DbError::NotFound { .. }) => return Ok(false),
            Err(e) => return Err(e),
        };
        Ok(verify_password(password, &user.password_hash)?)
    }
}
