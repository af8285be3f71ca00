//! Server-side session records referenced by refresh tokens.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::{models::user::UserRole, types::UserId};

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Session {
    /// Random UUID string embedded in refresh tokens.
    pub session_id: String,
    pub user_id: UserId,
    /// Role captured when the session was opened.
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn open(user_id: UserId, role: UserRole, expires_at: DateTime<Utc>) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            user_id,
            role,
            expires_at,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
