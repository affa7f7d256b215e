use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

impl User {
    /// Fetch a user by username. Missing users are `NotFound`.
    pub async fn get(pool: &PgPool, username: &str) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT username, first_name, last_name, email, is_admin
             FROM users
             WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        user.ok_or_else(|| ApiError::not_found(format!("No user: {}", username)))
    }
}

/// Read-only access to users, as needed by the authorization gate
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn get(&self, username: &str) -> Result<User, ApiError>;
}

/// [`UserLookup`] backed by the `users` table
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserLookup for PgUserStore {
    async fn get(&self, username: &str) -> Result<User, ApiError> {
        User::get(&self.pool, username).await
    }
}
