//! Reception workflow: open, scan products, undo the last scan, close.

use std::sync::Arc;

use crate::{
    error::AppError,
    models::{
        product::{Product, ProductType},
        reception::Reception,
        UnknownVariant,
    },
    repositories::{ReceptionRepository, StoreError},
    types::PickupPointId,
};

#[derive(Clone)]
pub struct ReceptionService {
    repo: Arc<dyn ReceptionRepository>,
}

impl ReceptionService {
    pub fn new(repo: Arc<dyn ReceptionRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_reception(&self, pvz_id: PickupPointId) -> Result<Reception, AppError> {
        let reception = self.repo.create_reception(pvz_id).await.map_err(|err| match err {
            StoreError::Conflict => {
                AppError::BadRequest("pickup point already has a reception in progress".to_string())
            }
            StoreError::NotFound => AppError::BadRequest("pickup point not found".to_string()),
            other => other.into(),
        })?;
        tracing::info!(pvz_id = %pvz_id, reception_id = %reception.id, "opened reception");
        Ok(reception)
    }

    pub async fn add_product(
        &self,
        product_type: &str,
        pvz_id: PickupPointId,
    ) -> Result<Product, AppError> {
        let product_type: ProductType = product_type
            .parse()
            .map_err(|err: UnknownVariant| AppError::BadRequest(err.to_string()))?;
        let product = self
            .repo
            .add_product(pvz_id, product_type)
            .await
            .map_err(no_open_reception)?;
        tracing::debug!(pvz_id = %pvz_id, product_id = %product.id, "added product");
        Ok(product)
    }

    pub async fn delete_last_product(&self, pvz_id: PickupPointId) -> Result<Product, AppError> {
        let product = self
            .repo
            .delete_last_product(pvz_id)
            .await
            .map_err(|err| match err {
                StoreError::NotFound => AppError::BadRequest(
                    "no reception in progress or it has no products".to_string(),
                ),
                other => other.into(),
            })?;
        tracing::debug!(pvz_id = %pvz_id, product_id = %product.id, "removed last product");
        Ok(product)
    }

    pub async fn close_reception(&self, pvz_id: PickupPointId) -> Result<Reception, AppError> {
        let reception = self
            .repo
            .close_reception(pvz_id)
            .await
            .map_err(no_open_reception)?;
        tracing::info!(pvz_id = %pvz_id, reception_id = %reception.id, "closed reception");
        Ok(reception)
    }
}

fn no_open_reception(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound => AppError::BadRequest("no reception in progress".to_string()),
        other => other.into(),
    }
}
