use crate::auth::{CredentialStore, StoredCredentials};
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{PgPool, Row};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("resource already exists")]
    Conflict,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(ToSchema, Serialize, Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
}

#[derive(ToSchema, Serialize, Debug, Clone)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub body: String,
}

/// User persistence consumed by the registration handler; extends the
/// login-time lookup the authentication core depends on.
#[async_trait]
pub trait UserStore: CredentialStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create_post(&self, user_id: Uuid, body: &str) -> Result<Post>;
    async fn posts(&self) -> Result<Vec<Post>>;
    async fn post(&self, id: Uuid) -> Result<Option<Post>>;
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the tables on first start.
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL cannot be applied.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS posts (
                id UUID PRIMARY KEY,
                user_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
                body TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn credentials_for(&self, email: &str) -> Result<Option<StoredCredentials>> {
        let row = sqlx::query("SELECT id, password_hash FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| StoredCredentials {
            id: row.get("id"),
            password_hash: row.get("password_hash"),
        }))
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let id = Uuid::new_v4();

        match sqlx::query("INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(email)
            .bind(password_hash)
            .execute(&self.pool)
            .await
        {
            Ok(_) => Ok(User {
                id,
                email: email.to_string(),
            }),
            Err(e) => {
                if let sqlx::Error::Database(db) = &e {
                    if db.is_unique_violation() {
                        return Err(StoreError::Conflict);
                    }
                }
                Err(StoreError::Other(e.into()))
            }
        }
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn create_post(&self, user_id: Uuid, body: &str) -> Result<Post> {
        let id = Uuid::new_v4();

        sqlx::query("INSERT INTO posts (id, user_id, body) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(user_id)
            .bind(body)
            .execute(&self.pool)
            .await?;

        Ok(Post {
            id,
            user_id,
            body: body.to_string(),
        })
    }

    async fn posts(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query("SELECT id, user_id, body FROM posts ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Post {
                id: row.get("id"),
                user_id: row.get("user_id"),
                body: row.get("body"),
            })
            .collect())
    }

    async fn post(&self, id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query("SELECT id, user_id, body FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Post {
            id: row.get("id"),
            user_id: row.get("user_id"),
            body: row.get("body"),
        }))
    }
}
