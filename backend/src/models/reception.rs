use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::{PickupPointId, ReceptionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceptionStatus {
    InProgress,
    Closed,
}

text_enum!(ReceptionStatus, "reception status", {
    InProgress => "in_progress",
    Closed => "close",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reception {
    pub id: ReceptionId,
    pub date_time: DateTime<Utc>,
    #[serde(rename = "pvzId")]
    pub pvz_id: PickupPointId,
    #[sqlx(try_from = "String")]
    pub status: ReceptionStatus,
}

impl Reception {
    pub fn is_open(&self) -> bool {
        self.status == ReceptionStatus::InProgress
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceptionRequest {
    pub pvz_id: PickupPointId,
}
