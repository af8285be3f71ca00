//! Registration, login and the access/refresh token lifecycle.
//!
//! Access tokens are short-lived and stateless. Refresh tokens name a stored
//! [`Session`]; when an access token goes stale the session is consulted for
//! the current role and a new access token is minted. A stale refresh token
//! rotates the session expiry forward instead of ending the session.
//!
//! The codec never checks `exp`, so every decode here is followed by an
//! explicit comparison against the clock.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::{
    config::Config,
    models::{
        session::Session,
        user::{AuthTokens, User, UserRole},
    },
    repositories::{CredentialStore, StoreError},
    types::UserId,
    utils::{
        jwt::{AccessClaims, RefreshClaims, TokenCodec, TokenError},
        password::{hash_password, verify_against_dummy, verify_password},
    },
};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("user already exists")]
    DuplicateUser,
    /// Unknown email or wrong password; the two are not distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("unauthorized")]
    Unauthorized,
    #[error("credential store failure: {0}")]
    Store(#[source] StoreError),
    #[error("token signing failure: {0}")]
    Token(#[source] TokenError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Result of [`AuthService::refresh_if_needed`]: the live token pair plus
/// which halves were reissued and need their cookies rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedTokens {
    pub tokens: AuthTokens,
    pub access_renewed: bool,
    pub refresh_renewed: bool,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    codec: TokenCodec,
    access_ttl: Duration,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, config: &Config) -> Self {
        Self {
            store,
            codec: TokenCodec::new(&config.jwt_secret),
            access_ttl: config.access_token_ttl(),
            session_ttl: config.session_ttl(),
        }
    }

    pub fn access_token_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    pub async fn register(&self, email: &str, password: &str, role: &str) -> Result<User, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() || role.trim().is_empty() {
            return Err(AuthError::Validation(
                "email, password and role are required".to_string(),
            ));
        }
        let role: UserRole = role
            .parse()
            .ok()
            .filter(UserRole::is_assignable)
            .ok_or_else(|| AuthError::Validation(format!("unsupported role `{}`", role.trim())))?;

        let password_hash = hash_password(password.to_string()).await?;
        let user = User::new(email.to_string(), password_hash, role);

        match self.store.create_user(&user).await {
            Ok(()) => {
                tracing::info!(user_id = %user.id, role = %user.role, "registered user");
                Ok(user)
            }
            Err(StoreError::Conflict) => Err(AuthError::DuplicateUser),
            Err(err) => Err(AuthError::Store(err)),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthTokens, AuthError> {
        let Some(user) = self
            .store
            .find_user_by_email(email.trim())
            .await
            .map_err(AuthError::Store)?
        else {
            verify_against_dummy(password.to_string()).await?;
            tracing::debug!("login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            tracing::debug!(user_id = %user.id, "password mismatch on login");
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.open_session(user.id, user.role).await?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(tokens)
    }

    /// Issues a session for the sentinel user without checking credentials.
    pub async fn dummy_login(&self, role: &str) -> Result<AuthTokens, AuthError> {
        let role: UserRole = role
            .parse()
            .map_err(|_| AuthError::Validation(format!("unsupported role `{}`", role.trim())))?;
        let tokens = self.open_session(UserId::sentinel(), role).await?;
        tracing::warn!(role = %role, "issued dummy login session");
        Ok(tokens)
    }

    pub async fn refresh_if_needed(&self, tokens: AuthTokens) -> Result<RefreshedTokens, AuthError> {
        let access: AccessClaims = self.decode(&tokens.access_token)?;
        let refresh: RefreshClaims = self.decode(&tokens.refresh_token)?;
        let now = Utc::now();

        if access.is_live_at(now) {
            return Ok(RefreshedTokens {
                tokens,
                access_renewed: false,
                refresh_renewed: false,
            });
        }

        let mut renewed = RefreshedTokens {
            tokens,
            access_renewed: true,
            refresh_renewed: false,
        };

        if !refresh.is_live_at(now) {
            let session = self
                .store
                .extend_session(&refresh.sid, self.expiry_after(now, self.session_ttl)?)
                .await
                .map_err(|err| match err {
                    StoreError::NotFound => AuthError::Unauthorized,
                    other => AuthError::Store(other),
                })?;
            renewed.tokens.refresh_token =
                self.sign(&RefreshClaims::new(session.session_id.clone(), session.expires_at))?;
            renewed.refresh_renewed = true;
            tracing::debug!(session_id = %session.session_id, expires_at = %session.expires_at, "rotated session");
        }

        let session = self
            .store
            .find_session(&refresh.sid)
            .await
            .map_err(AuthError::Store)?
            .filter(|session| !session.is_expired_at(now))
            .ok_or(AuthError::Unauthorized)?;

        renewed.tokens.access_token = self.sign(&AccessClaims::new(
            session.user_id,
            session.role,
            self.expiry_after(now, self.access_ttl)?,
        ))?;
        tracing::debug!(session_id = %session.session_id, role = %session.role, "renewed access token");

        Ok(renewed)
    }

    pub fn is_authorized_for_roles(
        &self,
        access_token: &str,
        allowed: &[UserRole],
    ) -> Result<bool, AuthError> {
        let claims: AccessClaims = self.decode(access_token)?;
        Ok(allowed.contains(&claims.role))
    }

    async fn open_session(&self, user_id: UserId, role: UserRole) -> Result<AuthTokens, AuthError> {
        let now = Utc::now();
        let session = Session::open(user_id, role, self.expiry_after(now, self.session_ttl)?);
        self.store
            .create_session(&session)
            .await
            .map_err(AuthError::Store)?;

        Ok(AuthTokens {
            access_token: self.sign(&AccessClaims::new(
                user_id,
                role,
                self.expiry_after(now, self.access_ttl)?,
            ))?,
            refresh_token: self.sign(&RefreshClaims::new(session.session_id, session.expires_at))?,
        })
    }

    fn expiry_after(&self, now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, AuthError> {
        now.checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Internal(anyhow::anyhow!("token lifetime overflows the clock")))
    }

    fn decode<C: serde::de::DeserializeOwned>(&self, token: &str) -> Result<C, AuthError> {
        self.codec.decode(token).map_err(|err| {
            tracing::debug!(error = %err, "rejected token");
            AuthError::Unauthorized
        })
    }

    fn sign<C: serde::Serialize>(&self, claims: &C) -> Result<String, AuthError> {
        self.codec.encode(claims).map_err(AuthError::Token)
    }
}
