use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};

use crate::{
    error::AppError,
    handlers::{json_body, query_params},
    models::pickup_point::{
        CreatePickupPointRequest, PickupPoint, PickupPointListQuery, PickupPointSummary,
    },
    state::AppState,
};

pub async fn create_pickup_point(
    State(state): State<AppState>,
    payload: Result<Json<CreatePickupPointRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PickupPoint>), AppError> {
    let payload = json_body(payload)?;
    let pickup_point = state.pickup_points.create(&payload.city).await?;
    Ok((StatusCode::CREATED, Json(pickup_point)))
}

pub async fn list_pickup_points(
    State(state): State<AppState>,
    query: Result<Query<PickupPointListQuery>, QueryRejection>,
) -> Result<Json<Vec<PickupPointSummary>>, AppError> {
    let query = query_params(query)?;
    let listing = state.pickup_points.list(&query).await?;
    Ok(Json(listing))
}
