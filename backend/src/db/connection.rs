use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

pub type DbPool = PgPool;

const MAX_CONNECTIONS: u32 = 20;
const MIN_CONNECTIONS: u32 = 1;
const MAX_LIFETIME: Duration = Duration::from_secs(60 * 60);

pub async fn create_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .min_connections(MIN_CONNECTIONS)
        .max_lifetime(MAX_LIFETIME)
        .connect(database_url)
        .await?;
    Ok(pool)
}
