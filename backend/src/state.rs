use std::sync::Arc;

use crate::{
    config::Config,
    db::connection::DbPool,
    repositories::{
        CredentialStore, PgCredentialStore, PgPickupPointRepository, PgReceptionRepository,
        PickupPointRepository, ReceptionRepository,
    },
    services::{AuthService, PickupPointService, ReceptionService},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: AuthService,
    pub pickup_points: PickupPointService,
    pub receptions: ReceptionService,
}

impl AppState {
    pub fn new(
        config: Config,
        credentials: Arc<dyn CredentialStore>,
        pickup_points: Arc<dyn PickupPointRepository>,
        receptions: Arc<dyn ReceptionRepository>,
    ) -> Self {
        Self {
            auth: AuthService::new(credentials, &config),
            pickup_points: PickupPointService::new(pickup_points),
            receptions: ReceptionService::new(receptions),
            config: Arc::new(config),
        }
    }

    /// Wires every store to the same Postgres pool.
    pub fn with_pool(pool: DbPool, config: Config) -> Self {
        Self::new(
            config,
            Arc::new(PgCredentialStore::new(pool.clone())),
            Arc::new(PgPickupPointRepository::new(pool.clone())),
            Arc::new(PgReceptionRepository::new(pool)),
        )
    }
}
