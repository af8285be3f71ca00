use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pvz_backend::{config::Config, db::connection::create_pool, router, state::AppState};

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.chars().count())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pvz_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(
        server_address = %config.server_address,
        jwt_secret = %mask_secret(&config.jwt_secret),
        access_token_ttl_minutes = config.access_token_ttl_minutes,
        session_ttl_days = config.session_ttl_days,
        cookie_secure = config.cookie.secure,
        "Loaded configuration from environment/.env"
    );
    if config.dummy_login_enabled {
        tracing::warn!("DUMMY_LOGIN_ENABLED is set; /dummyLogin issues sessions without credentials");
    }

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let address = config.server_address.clone();
    let app = router::app(AppState::with_pool(pool, config));

    let listener = TcpListener::bind(&address).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
