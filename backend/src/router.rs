//! HTTP surface. Guarded routes authenticate first, then check the role.

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, MethodRouter},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{
    handlers,
    middleware::auth::{authenticate, require_roles, RoleGate},
    models::user::UserRole,
    state::AppState,
};

const MODERATOR: &[UserRole] = &[UserRole::Moderator];
const EMPLOYEE: &[UserRole] = &[UserRole::Employee];
const STAFF: &[UserRole] = &[UserRole::Moderator, UserRole::Employee];

pub fn app(state: AppState) -> Router {
    let mut public = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));
    if state.config.dummy_login_enabled {
        public = public.route("/dummyLogin", post(handlers::auth::dummy_login));
    }

    let guarded = Router::new()
        .route(
            "/pvz",
            guard(&state, MODERATOR, post(handlers::pickup_points::create_pickup_point)),
        )
        .route(
            "/pvz",
            guard(&state, STAFF, get(handlers::pickup_points::list_pickup_points)),
        )
        .route(
            "/receptions",
            guard(&state, EMPLOYEE, post(handlers::receptions::create_reception)),
        )
        .route(
            "/products",
            guard(&state, EMPLOYEE, post(handlers::receptions::add_product)),
        )
        .route(
            "/pvz/{pvzId}/close_last_reception",
            guard(&state, EMPLOYEE, post(handlers::receptions::close_last_reception)),
        )
        .route(
            "/pvz/{pvzId}/delete_last_product",
            guard(&state, EMPLOYEE, post(handlers::receptions::delete_last_product)),
        );

    Router::new()
        .merge(public)
        .merge(guarded)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn guard(
    state: &AppState,
    allowed: &'static [UserRole],
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    route.route_layer(
        ServiceBuilder::new()
            .layer(from_fn_with_state(state.clone(), authenticate))
            .layer(from_fn_with_state(
                RoleGate::new(state.auth.clone(), allowed),
                require_roles,
            )),
    )
}
