//! Credential store: user accounts and login sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::{session::Session, user::User};
use crate::repositories::StoreError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Inserts a user. `StoreError::Conflict` when the email is taken.
    async fn create_user(&self, user: &User) -> Result<(), StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn create_session(&self, session: &Session) -> Result<(), StoreError>;

    async fn find_session(&self, session_id: &str) -> Result<Option<Session>, StoreError>;

    /// Moves the session expiry to `expires_at` unless it is already later,
    /// returning the stored record. `StoreError::NotFound` if the session is gone.
    async fn extend_session(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, StoreError>;
}

const USER_COLUMNS: &str = "id, email, password_hash, role, created_at";
const SESSION_COLUMNS: &str = "session_id, user_id, role, expires_at";

#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, role, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_session(&self, session: &Session) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO sessions (session_id, user_id, role, expires_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&session.session_id)
        .bind(session.user_id)
        .bind(session.role.as_str())
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_session(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        let query = format!(
            "SELECT {} FROM sessions WHERE session_id = $1",
            SESSION_COLUMNS
        );
        let session = sqlx::query_as::<_, Session>(&query)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(session)
    }

    async fn extend_session(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        let query = format!(
            "UPDATE sessions SET expires_at = GREATEST(expires_at, $2) \
             WHERE session_id = $1 RETURNING {}",
            SESSION_COLUMNS
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(session_id)
            .bind(expires_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }
}
