use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::{
    models::user::{AuthTokens, UserRole},
    services::{AuthError, AuthService},
    state::AppState,
    utils::cookies::{build_auth_cookie, find_cookie, ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME},
};

/// Allow-list for [`require_roles`]; one per guarded route.
#[derive(Clone)]
pub struct RoleGate {
    pub auth: AuthService,
    pub allowed: &'static [UserRole],
}

impl RoleGate {
    pub fn new(auth: AuthService, allowed: &'static [UserRole]) -> Self {
        Self { auth, allowed }
    }
}

/// Requires both token cookies and keeps them fresh. Renewed tokens are
/// stored in the request extensions for downstream gates and written back
/// as cookies on the response.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let tokens = tokens_from_headers(request.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    let refreshed = state.auth.refresh_if_needed(tokens).await.map_err(|err| {
        match &err {
            AuthError::Unauthorized => tracing::debug!("session rejected"),
            other => tracing::warn!(error = %other, "token refresh failed"),
        }
        StatusCode::UNAUTHORIZED
    })?;

    request.extensions_mut().insert(refreshed.tokens.clone());
    let mut response = next.run(request).await;

    let cookie = state.config.cookie;
    if refreshed.access_renewed {
        append_cookie(
            response.headers_mut(),
            build_auth_cookie(
                ACCESS_COOKIE_NAME,
                &refreshed.tokens.access_token,
                state.auth.access_token_ttl(),
                cookie,
            ),
        );
    }
    if refreshed.refresh_renewed {
        append_cookie(
            response.headers_mut(),
            build_auth_cookie(
                REFRESH_COOKIE_NAME,
                &refreshed.tokens.refresh_token,
                state.auth.session_ttl(),
                cookie,
            ),
        );
    }

    Ok(response)
}

pub async fn require_roles(
    State(gate): State<RoleGate>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let access_token = request
        .extensions()
        .get::<AuthTokens>()
        .map(|tokens| tokens.access_token.clone())
        .or_else(|| find_cookie(request.headers(), ACCESS_COOKIE_NAME))
        .ok_or(StatusCode::FORBIDDEN)?;

    match gate.auth.is_authorized_for_roles(&access_token, gate.allowed) {
        Ok(true) => Ok(next.run(request).await),
        Ok(false) => {
            tracing::debug!(allowed = ?gate.allowed, "role not permitted");
            Err(StatusCode::FORBIDDEN)
        }
        Err(_) => Err(StatusCode::FORBIDDEN),
    }
}

fn tokens_from_headers(headers: &HeaderMap) -> Option<AuthTokens> {
    Some(AuthTokens {
        access_token: find_cookie(headers, ACCESS_COOKIE_NAME)?,
        refresh_token: find_cookie(headers, REFRESH_COOKIE_NAME)?,
    })
}

pub(crate) fn append_cookie(headers: &mut HeaderMap, cookie: String) {
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(err) => tracing::error!(error = %err, "failed to encode auth cookie"),
    }
}
