//! Users, roles and the authentication payloads exchanged over HTTP.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::types::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRole {
    /// Manages pickup points.
    Moderator,
    /// Runs receptions and scans products at a pickup point.
    Employee,
    /// Placeholder for test flows. Never registered, never granted access.
    Dummy,
}

text_enum!(UserRole, "role", {
    Moderator => "moderator",
    Employee => "employee",
    Dummy => "dummy",
});

impl UserRole {
    /// Roles a real account may be registered with.
    pub fn is_assignable(&self) -> bool {
        matches!(self, UserRole::Moderator | UserRole::Employee)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, password_hash: String, role: UserRole) -> Self {
        Self {
            id: UserId::new(),
            email,
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DummyLoginRequest {
    #[serde(default)]
    pub role: String,
}

/// Token pair handed out by login and dummy login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}
