//! Receptions and the products scanned into them.
//!
//! A pickup point has at most one reception in progress; every product
//! operation addresses that open reception through the pickup point id.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::{
    product::{Product, ProductType},
    reception::{Reception, ReceptionStatus},
};
use crate::repositories::StoreError;
use crate::types::{PickupPointId, ProductId, ReceptionId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReceptionRepository: Send + Sync {
    /// Opens a reception. `Conflict` if one is already open for the pickup
    /// point, `NotFound` if the pickup point does not exist.
    async fn create_reception(&self, pvz_id: PickupPointId) -> Result<Reception, StoreError>;

    /// `NotFound` when the pickup point has no open reception.
    async fn add_product(
        &self,
        pvz_id: PickupPointId,
        product_type: ProductType,
    ) -> Result<Product, StoreError>;

    /// Removes the most recently added product of the open reception.
    /// `NotFound` when there is no open reception or it is empty.
    async fn delete_last_product(&self, pvz_id: PickupPointId) -> Result<Product, StoreError>;

    /// `NotFound` when the pickup point has no open reception.
    async fn close_reception(&self, pvz_id: PickupPointId) -> Result<Reception, StoreError>;
}

const RECEPTION_COLUMNS: &str = "id, started_at AS date_time, pvz_id, status";
const PRODUCT_COLUMNS: &str = "id, added_at AS date_time, product_type, reception_id";

#[derive(Debug, Clone)]
pub struct PgReceptionRepository {
    pool: PgPool,
}

impl PgReceptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lock_open_reception(
        tx: &mut Transaction<'_, Postgres>,
        pvz_id: PickupPointId,
    ) -> Result<ReceptionId, StoreError> {
        sqlx::query_scalar::<_, ReceptionId>(
            "SELECT id FROM receptions WHERE pvz_id = $1 AND status = $2 FOR UPDATE",
        )
        .bind(pvz_id)
        .bind(ReceptionStatus::InProgress.as_str())
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl ReceptionRepository for PgReceptionRepository {
    async fn create_reception(&self, pvz_id: PickupPointId) -> Result<Reception, StoreError> {
        let query = format!(
            "INSERT INTO receptions (id, pvz_id, status) VALUES ($1, $2, $3) RETURNING {}",
            RECEPTION_COLUMNS
        );
        let reception = sqlx::query_as::<_, Reception>(&query)
            .bind(ReceptionId::new())
            .bind(pvz_id)
            .bind(ReceptionStatus::InProgress.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(reception)
    }

    async fn add_product(
        &self,
        pvz_id: PickupPointId,
        product_type: ProductType,
    ) -> Result<Product, StoreError> {
        let mut tx = self.pool.begin().await?;
        let reception_id = Self::lock_open_reception(&mut tx, pvz_id).await?;

        let query = format!(
            "INSERT INTO products (id, reception_id, product_type) VALUES ($1, $2, $3) \
             RETURNING {}",
            PRODUCT_COLUMNS
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(ProductId::new())
            .bind(reception_id)
            .bind(product_type.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(product)
    }

    async fn delete_last_product(&self, pvz_id: PickupPointId) -> Result<Product, StoreError> {
        let mut tx = self.pool.begin().await?;
        let reception_id = Self::lock_open_reception(&mut tx, pvz_id).await?;

        let query = format!(
            "DELETE FROM products WHERE id = (\
                SELECT id FROM products WHERE reception_id = $1 \
                ORDER BY added_at DESC, seq DESC LIMIT 1\
             ) RETURNING {}",
            PRODUCT_COLUMNS
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(reception_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound)?;

        tx.commit().await?;
        Ok(product)
    }

    async fn close_reception(&self, pvz_id: PickupPointId) -> Result<Reception, StoreError> {
        let query = format!(
            "UPDATE receptions SET status = $3 WHERE pvz_id = $1 AND status = $2 RETURNING {}",
            RECEPTION_COLUMNS
        );
        sqlx::query_as::<_, Reception>(&query)
            .bind(pvz_id)
            .bind(ReceptionStatus::InProgress.as_str())
            .bind(ReceptionStatus::Closed.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }
}
