//! Signed session tokens.
//!
//! [`TokenCodec`] signs and verifies HS256 tokens with the process secret.
//! Decoding does not check `exp`; callers compare the expiry against their
//! own clock.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::{models::user::UserRole, types::UserId};

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signature does not match")]
    InvalidSignature,
    #[error("token is malformed")]
    MalformedToken,
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Claims of the short-lived bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Owning user.
    pub sub: UserId,
    pub role: UserRole,
    /// Expiry as a unix timestamp (seconds).
    pub exp: i64,
}

/// Claims of the long-lived token pointing at a stored session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sid: String,
    pub exp: i64,
}

impl AccessClaims {
    pub fn new(user_id: UserId, role: UserRole, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: user_id,
            role,
            exp: expires_at.timestamp(),
        }
    }

    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.exp > now.timestamp()
    }
}

impl RefreshClaims {
    pub fn new(session_id: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sid: session_id.into(),
            exp: expires_at.timestamp(),
        }
    }

    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.exp > now.timestamp()
    }
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn encode<C: Serialize>(&self, claims: &C) -> Result<String, TokenError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key).map_err(TokenError::Signing)
    }

    pub fn decode<C: DeserializeOwned>(&self, token: &str) -> Result<C, TokenError> {
        decode::<C>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::MalformedToken,
            })
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .finish_non_exhaustive()
    }
}
