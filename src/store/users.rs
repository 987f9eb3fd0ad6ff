//! User repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::corrupt;
use crate::domain::aggregates::{Role, User};
use crate::domain::value_objects::{PasswordDigest, Username};
use crate::{Result, StorefrontError};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_digest: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StorefrontError;

    fn try_from(r: UserRow) -> Result<Self> {
        Ok(User {
            id: r.id,
            username: Username::new(r.username).map_err(|e| corrupt("users.username", e))?,
            password_digest: PasswordDigest::from_stored(r.password_digest),
            role: r.role.parse::<Role>().map_err(|e| corrupt("users.role", e))?,
            created_at: r.created_at,
        })
    }
}

pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a new account.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::DuplicateUsername` when the username is taken; the existing row is untouched.
    pub async fn create(&self, username: &Username, digest: &PasswordDigest, role: Role) -> Result<User> {
        let created_at = Utc::now();
        let result = sqlx::query("INSERT INTO users (username, password_digest, role, created_at) VALUES (?, ?, ?, ?)")
            .bind(username.as_str())
            .bind(digest.as_str())
            .bind(role.as_str())
            .bind(created_at)
            .execute(self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => StorefrontError::DuplicateUsername(username.to_string()),
                other => StorefrontError::Storage(other),
            })?;
        Ok(User { id: result.last_insert_rowid(), username: username.clone(), password_digest: digest.clone(), role, created_at })
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>("SELECT id, username, password_digest, role, created_at FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }
}
