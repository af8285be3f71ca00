use anyhow::{anyhow, Context};
use std::{env, str::FromStr};

use crate::utils::cookies::{CookieOptions, SameSite};

pub const MAX_ACCESS_TOKEN_TTL_MINUTES: u64 = 24 * 60;
pub const MAX_SESSION_TTL_DAYS: u64 = 3650;

/// Process-wide settings, loaded once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub access_token_ttl_minutes: u64,
    pub session_ttl_days: u64,
    pub dummy_login_enabled: bool,
    pub cookie: CookieOptions,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server_address = value("SERVER_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let database_url = value("DATABASE_URL")
            .or_else(|| value("DB_URL"))
            .ok_or_else(|| anyhow!("DATABASE_URL (or DB_URL) must be set"))?;

        let jwt_secret =
            value("SECRET_WORD").ok_or_else(|| anyhow!("SECRET_WORD must be set and non-empty"))?;

        let access_token_ttl_minutes =
            parse_or_default(value("ACCESS_TOKEN_TTL_MINUTES"), "ACCESS_TOKEN_TTL_MINUTES", 15)?;
        let session_ttl_days = parse_or_default(value("SESSION_TTL_DAYS"), "SESSION_TTL_DAYS", 30)?;
        if access_token_ttl_minutes == 0 || session_ttl_days == 0 {
            return Err(anyhow!("token lifetimes must be greater than zero"));
        }
        if access_token_ttl_minutes > MAX_ACCESS_TOKEN_TTL_MINUTES {
            return Err(anyhow!(
                "ACCESS_TOKEN_TTL_MINUTES must not exceed {}",
                MAX_ACCESS_TOKEN_TTL_MINUTES
            ));
        }
        if session_ttl_days > MAX_SESSION_TTL_DAYS {
            return Err(anyhow!(
                "SESSION_TTL_DAYS must not exceed {}",
                MAX_SESSION_TTL_DAYS
            ));
        }

        let dummy_login_enabled = parse_flag(value("DUMMY_LOGIN_ENABLED"), "DUMMY_LOGIN_ENABLED")?;
        let secure = parse_flag(value("COOKIE_SECURE"), "COOKIE_SECURE")?;
        let same_site = match value("COOKIE_SAME_SITE") {
            Some(raw) => raw
                .parse::<SameSite>()
                .map_err(|_| anyhow!("Invalid COOKIE_SAME_SITE value: {}", raw))?,
            None => SameSite::Lax,
        };

        Ok(Config {
            server_address,
            database_url,
            jwt_secret,
            access_token_ttl_minutes,
            session_ttl_days,
            dummy_login_enabled,
            cookie: CookieOptions { secure, same_site },
        })
    }

    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.access_token_ttl_minutes as i64)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.session_ttl_days as i64)
    }
}

fn parse_or_default<T>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {} value: {}", key, raw)),
        None => Ok(default),
    }
}

fn parse_flag(raw: Option<String>, key: &str) -> anyhow::Result<bool> {
    match raw.as_deref().map(str::trim) {
        None => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        Some(v) => Err(anyhow!("Invalid {} value: {}", key, v)),
    }
}
