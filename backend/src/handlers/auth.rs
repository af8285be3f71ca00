use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    error::AppError,
    handlers::json_body,
    middleware::auth::append_cookie,
    models::user::{AuthTokens, DummyLoginRequest, LoginRequest, RegisterRequest, UserResponse},
    state::AppState,
    utils::cookies::{build_auth_cookie, ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME},
};

pub async fn dummy_login(
    State(state): State<AppState>,
    payload: Result<Json<DummyLoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let payload = json_body(payload)?;
    let tokens = state.auth.dummy_login(&payload.role).await?;
    Ok((StatusCode::OK, session_cookies(&state, &tokens), Json(tokens)))
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let payload = json_body(payload)?;
    payload.validate()?;

    let user = state
        .auth
        .register(&payload.email, &payload.password, &payload.role)
        .await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let payload = json_body(payload)?;
    let tokens = state.auth.login(&payload.email, &payload.password).await?;
    Ok((StatusCode::OK, session_cookies(&state, &tokens), Json(tokens)))
}

fn session_cookies(state: &AppState, tokens: &AuthTokens) -> HeaderMap {
    let mut headers = HeaderMap::new();
    append_cookie(
        &mut headers,
        build_auth_cookie(
            ACCESS_COOKIE_NAME,
            &tokens.access_token,
            state.auth.access_token_ttl(),
            state.config.cookie,
        ),
    );
    append_cookie(
        &mut headers,
        build_auth_cookie(
            REFRESH_COOKIE_NAME,
            &tokens.refresh_token,
            state.auth.session_ttl(),
            state.config.cookie,
        ),
    );
    headers
}
