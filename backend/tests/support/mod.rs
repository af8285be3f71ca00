#![allow(dead_code)]
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, Response},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use pvz_backend::{
    config::Config,
    models::{
        pickup_point::{City, PickupPoint, PickupPointListingRow},
        product::{Product, ProductType},
        reception::{Reception, ReceptionStatus},
        session::Session,
        user::{User, UserRole},
    },
    repositories::{CredentialStore, PickupPointRepository, ReceptionRepository, StoreError},
    router,
    state::AppState,
    types::{PickupPointId, ProductId, ReceptionId},
    utils::cookies::{ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME},
};
use serde_json::Value;

pub mod postgres;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_config() -> Config {
    test_config_with(&[])
}

pub fn test_config_with(overrides: &[(&str, &str)]) -> Config {
    let mut env: HashMap<String, String> = HashMap::from([
        ("DATABASE_URL".to_string(), "postgres://unused/pvz".to_string()),
        ("SECRET_WORD".to_string(), TEST_SECRET.to_string()),
        ("DUMMY_LOGIN_ENABLED".to_string(), "true".to_string()),
    ]);
    for (key, value) in overrides {
        env.insert(key.to_string(), value.to_string());
    }
    Config::from_lookup(|key| env.get(key).cloned()).expect("test config")
}

/// Credentials and sessions kept in memory.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: Mutex<HashMap<String, User>>,
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemoryCredentialStore {
    pub fn session(&self, session_id: &str) -> Option<Session> {
        self.sessions.lock().unwrap().get(session_id).cloned()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn remove_session(&self, session_id: &str) {
        self.sessions.lock().unwrap().remove(session_id);
    }

    pub fn set_session_expiry(&self, session_id: &str, expires_at: DateTime<Utc>) {
        if let Some(session) = self.sessions.lock().unwrap().get_mut(session_id) {
            session.expires_at = expires_at;
        }
    }

    pub fn set_session_role(&self, session_id: &str, role: UserRole) {
        if let Some(session) = self.sessions.lock().unwrap().get_mut(session_id) {
            session.role = role;
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.email) {
            return Err(StoreError::Conflict);
        }
        users.insert(user.email.clone(), user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().unwrap().get(email).cloned())
    }

    async fn create_session(&self, session: &Session) -> Result<(), StoreError> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    async fn find_session(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.session(session_id))
    }

    async fn extend_session(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions.get_mut(session_id).ok_or(StoreError::NotFound)?;
        session.expires_at = session.expires_at.max(expires_at);
        Ok(session.clone())
    }
}

#[derive(Default)]
struct PvzTables {
    pickup_points: Vec<PickupPoint>,
    receptions: Vec<Reception>,
    products: Vec<Product>,
    clock: i64,
}

impl PvzTables {
    /// Strictly increasing timestamps so ordering never ties.
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        Utc::now() + Duration::milliseconds(self.clock)
    }

    fn open_reception(&self, pvz_id: PickupPointId) -> Option<ReceptionId> {
        self.receptions
            .iter()
            .find(|r| r.pvz_id == pvz_id && r.status == ReceptionStatus::InProgress)
            .map(|r| r.id)
    }
}

/// Pickup points, receptions and products kept in memory.
#[derive(Default)]
pub struct MemoryPvzStore {
    tables: Mutex<PvzTables>,
}

impl MemoryPvzStore {
    pub fn product_count(&self) -> usize {
        self.tables.lock().unwrap().products.len()
    }

    /// Inserts a reception with an explicit start time.
    pub fn insert_reception(
        &self,
        pvz_id: PickupPointId,
        date_time: DateTime<Utc>,
        status: ReceptionStatus,
    ) -> ReceptionId {
        let reception = Reception {
            id: ReceptionId::new(),
            date_time,
            pvz_id,
            status,
        };
        let id = reception.id;
        self.tables.lock().unwrap().receptions.push(reception);
        id
    }
}

#[async_trait]
impl PickupPointRepository for MemoryPvzStore {
    async fn create(&self, city: City) -> Result<PickupPoint, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let pickup_point = PickupPoint {
            id: PickupPointId::new(),
            registration_date: tables.tick(),
            city,
        };
        tables.pickup_points.push(pickup_point.clone());
        Ok(pickup_point)
    }

    async fn list_with_receptions(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<PickupPointListingRow>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let mut pickup_points = tables.pickup_points.clone();
        pickup_points.sort_by_key(|p| p.registration_date);

        let mut rows = Vec::new();
        for pvz in pickup_points
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
        {
            let empty_row = PickupPointListingRow {
                pvz_id: pvz.id,
                registration_date: pvz.registration_date,
                city: pvz.city,
                reception_id: None,
                reception_date_time: None,
                reception_status: None,
                product_id: None,
                product_date_time: None,
                product_type: None,
            };

            let mut receptions: Vec<&Reception> = tables
                .receptions
                .iter()
                .filter(|r| r.pvz_id == pvz.id)
                .filter(|r| start.map_or(true, |s| r.date_time >= s))
                .filter(|r| end.map_or(true, |e| r.date_time <= e))
                .collect();
            receptions.sort_by_key(|r| r.date_time);

            if receptions.is_empty() {
                rows.push(empty_row);
                continue;
            }

            for reception in receptions {
                let reception_row = PickupPointListingRow {
                    reception_id: Some(reception.id),
                    reception_date_time: Some(reception.date_time),
                    reception_status: Some(reception.status.as_str().to_string()),
                    ..empty_row.clone()
                };
                let products: Vec<&Product> = tables
                    .products
                    .iter()
                    .filter(|p| p.reception_id == reception.id)
                    .collect();
                if products.is_empty() {
                    rows.push(reception_row);
                    continue;
                }
                for product in products {
                    rows.push(PickupPointListingRow {
                        product_id: Some(product.id),
                        product_date_time: Some(product.date_time),
                        product_type: Some(product.product_type.as_str().to_string()),
                        ..reception_row.clone()
                    });
                }
            }
        }
        Ok(rows)
    }
}

#[async_trait]
impl ReceptionRepository for MemoryPvzStore {
    async fn create_reception(&self, pvz_id: PickupPointId) -> Result<Reception, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.pickup_points.iter().any(|p| p.id == pvz_id) {
            return Err(StoreError::NotFound);
        }
        if tables.open_reception(pvz_id).is_some() {
            return Err(StoreError::Conflict);
        }
        let reception = Reception {
            id: ReceptionId::new(),
            date_time: tables.tick(),
            pvz_id,
            status: ReceptionStatus::InProgress,
        };
        tables.receptions.push(reception.clone());
        Ok(reception)
    }

    async fn add_product(
        &self,
        pvz_id: PickupPointId,
        product_type: ProductType,
    ) -> Result<Product, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let reception_id = tables.open_reception(pvz_id).ok_or(StoreError::NotFound)?;
        let product = Product {
            id: ProductId::new(),
            date_time: tables.tick(),
            product_type,
            reception_id,
        };
        tables.products.push(product.clone());
        Ok(product)
    }

    async fn delete_last_product(&self, pvz_id: PickupPointId) -> Result<Product, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let reception_id = tables.open_reception(pvz_id).ok_or(StoreError::NotFound)?;
        let index = tables
            .products
            .iter()
            .rposition(|p| p.reception_id == reception_id)
            .ok_or(StoreError::NotFound)?;
        Ok(tables.products.remove(index))
    }

    async fn close_reception(&self, pvz_id: PickupPointId) -> Result<Reception, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let reception_id = tables.open_reception(pvz_id).ok_or(StoreError::NotFound)?;
        let reception = tables
            .receptions
            .iter_mut()
            .find(|r| r.id == reception_id)
            .ok_or(StoreError::NotFound)?;
        reception.status = ReceptionStatus::Closed;
        Ok(reception.clone())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub credentials: Arc<MemoryCredentialStore>,
    pub pvz: Arc<MemoryPvzStore>,
}

pub fn test_app() -> TestApp {
    test_app_with_config(test_config())
}

pub fn test_app_with_config(config: Config) -> TestApp {
    let credentials = Arc::new(MemoryCredentialStore::default());
    let pvz = Arc::new(MemoryPvzStore::default());
    let state = AppState::new(config, credentials.clone(), pvz.clone(), pvz.clone());
    TestApp {
        router: router::app(state.clone()),
        state,
        credentials,
        pvz,
    }
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

pub fn with_session(mut request: Request<Body>, access: &str, refresh: &str) -> Request<Body> {
    let cookie = format!(
        "{}={}; {}={}",
        ACCESS_COOKIE_NAME, access, REFRESH_COOKIE_NAME, refresh
    );
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().expect("cookie header"));
    request
}

pub fn extract_set_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .find_map(|value| {
            let value = value.to_str().ok()?;
            let token = value.strip_prefix(&prefix)?.split(';').next()?.trim();
            if token.is_empty() {
                None
            } else {
                Some(token.to_string())
            }
        })
}

pub fn set_cookie_header(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&prefix))
        .map(str::to_string)
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
