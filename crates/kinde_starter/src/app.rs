use std::{sync::Arc, time::Duration};

use axum::{http::StatusCode, middleware, routing::get, Router};
use kinde_auth::{auth_routes, require_auth};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handlers::{
        health::health,
        pages::{api_user, dashboard, home, profile},
        setup::setup_required,
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // Routes behind the auth gate
    let protected = Router::new()
        .route("/dashboard", get(dashboard))
        .route("/profile", get(profile))
        .route("/api/user", get(api_user))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_auth,
        ));

    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .merge(protected)
        .merge(auth_routes().with_state(state.auth.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .with_state(state)
}

/// Router for a server started without its Kinde settings. Every route but
/// `/health` answers with the list of missing settings.
pub fn create_setup_app(missing: Vec<&'static str>) -> Router {
    Router::new()
        .route("/health", get(health))
        .fallback(setup_required)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(missing))
}
