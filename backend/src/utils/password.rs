//! Argon2 password hashing.
//!
//! The async helpers run hashing on the blocking pool.

use std::sync::OnceLock;

use anyhow::{anyhow, Context};
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

pub fn hash_password_blocking(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("Failed to hash password: {}", e))
}

pub fn verify_password_blocking(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| anyhow!("Stored password hash is invalid: {}", e))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("Password verification error: {}", e)),
    }
}

/// Hash of a throwaway password, built once per process.
pub fn dummy_hash() -> anyhow::Result<String> {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();
    if let Some(hash) = DUMMY_HASH.get() {
        return Ok(hash.clone());
    }
    let hash = hash_password_blocking("pvz-unknown-account")?;
    Ok(DUMMY_HASH.get_or_init(|| hash).clone())
}

pub async fn hash_password(password: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password_blocking(&password))
        .await
        .context("password hashing task panicked")?
}

pub async fn verify_password(password: String, hash: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_password_blocking(&password, &hash))
        .await
        .context("password verification task panicked")?
}

/// Spends one verification on [`dummy_hash`] so a login for an unknown
/// account takes as long as one with a wrong password.
pub async fn verify_against_dummy(password: String) -> anyhow::Result<()> {
    tokio::task::spawn_blocking(move || {
        let hash = dummy_hash()?;
        verify_password_blocking(&password, &hash).map(|_| ())
    })
    .await
    .context("password verification task panicked")?
}
