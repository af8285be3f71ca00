//! Pickup points and the nested listing returned by `GET /pvz`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::{
    models::{
        product::{Product, ProductType},
        reception::{Reception, ReceptionStatus},
    },
    types::{PickupPointId, ProductId, ReceptionId},
};

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum City {
    Moscow,
    SaintPetersburg,
    Kazan,
}

text_enum!(City, "city", {
    Moscow => "Москва",
    SaintPetersburg => "Санкт-Петербург",
    Kazan => "Казань",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PickupPoint {
    pub id: PickupPointId,
    pub registration_date: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub city: City,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePickupPointRequest {
    #[serde(default)]
    pub city: String,
}

/// Filters and paging for the pickup point listing.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_window"))]
pub struct PickupPointListQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 30))]
    pub limit: Option<u32>,
}

fn validate_window(query: &PickupPointListQuery) -> Result<(), ValidationError> {
    match (query.start_date, query.end_date) {
        (Some(start), Some(end)) if start > end => Err(ValidationError::new("start_after_end")),
        _ => Ok(()),
    }
}

impl PickupPointListQuery {
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
    }

    /// Rows to skip. Widened so the largest accepted `page` cannot overflow.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.unwrap_or(1).max(1) - 1) * u64::from(self.limit())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceptionWithProducts {
    pub reception: Reception,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickupPointSummary {
    pub pvz: PickupPoint,
    pub receptions: Vec<ReceptionWithProducts>,
}

/// One row of the flattened pickup point / reception / product join.
/// Reception and product columns are null for pickup points without them.
#[derive(Debug, Clone, FromRow)]
pub struct PickupPointListingRow {
    pub pvz_id: PickupPointId,
    pub registration_date: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub city: City,
    pub reception_id: Option<ReceptionId>,
    pub reception_date_time: Option<DateTime<Utc>>,
    pub reception_status: Option<String>,
    pub product_id: Option<ProductId>,
    pub product_date_time: Option<DateTime<Utc>>,
    pub product_type: Option<String>,
}

impl PickupPointListingRow {
    pub fn pickup_point(&self) -> PickupPoint {
        PickupPoint {
            id: self.pvz_id,
            registration_date: self.registration_date,
            city: self.city,
        }
    }

    pub fn reception(&self) -> Option<Reception> {
        let status: ReceptionStatus = self.reception_status.as_deref()?.parse().ok()?;
        Some(Reception {
            id: self.reception_id?,
            date_time: self.reception_date_time?,
            pvz_id: self.pvz_id,
            status,
        })
    }

    pub fn product(&self) -> Option<Product> {
        let product_type: ProductType = self.product_type.as_deref()?.parse().ok()?;
        Some(Product {
            id: self.product_id?,
            date_time: self.product_date_time?,
            product_type,
            reception_id: self.reception_id?,
        })
    }
}

/// Folds ordered join rows into the nested listing, keeping row order.
pub fn group_listing(rows: Vec<PickupPointListingRow>) -> Vec<PickupPointSummary> {
    let mut summaries: Vec<PickupPointSummary> = Vec::new();

    for row in rows {
        let index = match summaries.iter().position(|s| s.pvz.id == row.pvz_id) {
            Some(index) => index,
            None => {
                summaries.push(PickupPointSummary {
                    pvz: row.pickup_point(),
                    receptions: Vec::new(),
                });
                summaries.len() - 1
            }
        };

        let Some(reception) = row.reception() else {
            continue;
        };
        let receptions = &mut summaries[index].receptions;
        let slot = match receptions
            .iter()
            .position(|r| r.reception.id == reception.id)
        {
            Some(slot) => slot,
            None => {
                receptions.push(ReceptionWithProducts {
                    reception,
                    products: Vec::new(),
                });
                receptions.len() - 1
            }
        };

        if let Some(product) = row.product() {
            receptions[slot].products.push(product);
        }
    }

    summaries
}
