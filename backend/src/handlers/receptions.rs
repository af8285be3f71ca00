use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};

use crate::{
    error::AppError,
    handlers::{json_body, path_param},
    models::{
        product::{AddProductRequest, Product},
        reception::{CreateReceptionRequest, Reception},
    },
    state::AppState,
    types::PickupPointId,
};

pub async fn create_reception(
    State(state): State<AppState>,
    payload: Result<Json<CreateReceptionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Reception>), AppError> {
    let payload = json_body(payload)?;
    let reception = state.receptions.create_reception(payload.pvz_id).await?;
    Ok((StatusCode::CREATED, Json(reception)))
}

pub async fn add_product(
    State(state): State<AppState>,
    payload: Result<Json<AddProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let payload = json_body(payload)?;
    let product = state
        .receptions
        .add_product(&payload.product_type, payload.pvz_id)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn delete_last_product(
    State(state): State<AppState>,
    pvz_id: Result<Path<PickupPointId>, PathRejection>,
) -> Result<Json<Product>, AppError> {
    let pvz_id = path_param(pvz_id)?;
    let product = state.receptions.delete_last_product(pvz_id).await?;
    Ok(Json(product))
}

pub async fn close_last_reception(
    State(state): State<AppState>,
    pvz_id: Result<Path<PickupPointId>, PathRejection>,
) -> Result<Json<Reception>, AppError> {
    let pvz_id = path_param(pvz_id)?;
    let reception = state.receptions.close_reception(pvz_id).await?;
    Ok(Json(reception))
}
