use std::sync::Arc;

use validator::Validate;

use crate::{
    error::AppError,
    models::pickup_point::{group_listing, City, PickupPoint, PickupPointListQuery, PickupPointSummary},
    repositories::PickupPointRepository,
};

#[derive(Clone)]
pub struct PickupPointService {
    repo: Arc<dyn PickupPointRepository>,
}

impl PickupPointService {
    pub fn new(repo: Arc<dyn PickupPointRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, city: &str) -> Result<PickupPoint, AppError> {
        let city: City = city
            .parse()
            .map_err(|err: crate::models::UnknownVariant| AppError::BadRequest(err.to_string()))?;
        let pickup_point = self.repo.create(city).await?;
        tracing::info!(pvz_id = %pickup_point.id, city = %city, "created pickup point");
        Ok(pickup_point)
    }

    pub async fn list(&self, query: &PickupPointListQuery) -> Result<Vec<PickupPointSummary>, AppError> {
        query.validate()?;
        let rows = self
            .repo
            .list_with_receptions(query.start_date, query.end_date, query.limit(), query.offset())
            .await?;
        Ok(group_listing(rows))
    }
}
