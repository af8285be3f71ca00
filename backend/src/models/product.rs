use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::{PickupPointId, ProductId, ReceptionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductType {
    Electronics,
    Clothes,
    Shoes,
}

text_enum!(ProductType, "product type", {
    Electronics => "электроника",
    Clothes => "одежда",
    Shoes => "обувь",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub date_time: DateTime<Utc>,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub product_type: ProductType,
    pub reception_id: ReceptionId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProductRequest {
    #[serde(rename = "type", default)]
    pub product_type: String,
    pub pvz_id: PickupPointId,
}
