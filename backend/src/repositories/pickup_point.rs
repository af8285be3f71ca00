use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::pickup_point::{City, PickupPoint, PickupPointListingRow};
use crate::repositories::StoreError;
use crate::types::PickupPointId;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PickupPointRepository: Send + Sync {
    async fn create(&self, city: City) -> Result<PickupPoint, StoreError>;

    /// Returns one page of pickup points (by registration date) joined with
    /// their receptions started inside the window and those receptions'
    /// products, ordered pickup point, reception, product.
    async fn list_with_receptions(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<PickupPointListingRow>, StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgPickupPointRepository {
    pool: PgPool,
}

impl PgPickupPointRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const LISTING_QUERY: &str = r#"
    WITH page AS (
        SELECT id, registration_date, city
        FROM pickup_points
        ORDER BY registration_date, id
        LIMIT $3 OFFSET $4
    )
    SELECT p.id AS pvz_id,
           p.registration_date,
           p.city,
           r.id AS reception_id,
           r.started_at AS reception_date_time,
           r.status AS reception_status,
           pr.id AS product_id,
           pr.added_at AS product_date_time,
           pr.product_type
    FROM page p
    LEFT JOIN receptions r
           ON r.pvz_id = p.id
          AND ($1::timestamptz IS NULL OR r.started_at >= $1)
          AND ($2::timestamptz IS NULL OR r.started_at <= $2)
    LEFT JOIN products pr ON pr.reception_id = r.id
    ORDER BY p.registration_date, p.id, r.started_at, r.id, pr.added_at, pr.seq
"#;

#[async_trait]
impl PickupPointRepository for PgPickupPointRepository {
    async fn create(&self, city: City) -> Result<PickupPoint, StoreError> {
        let pickup_point = sqlx::query_as::<_, PickupPoint>(
            "INSERT INTO pickup_points (id, city) VALUES ($1, $2) \
             RETURNING id, registration_date, city",
        )
        .bind(PickupPointId::new())
        .bind(city.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(pickup_point)
    }

    async fn list_with_receptions(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<PickupPointListingRow>, StoreError> {
        let rows = sqlx::query_as::<_, PickupPointListingRow>(LISTING_QUERY)
            .bind(start)
            .bind(end)
            .bind(i64::from(limit))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
