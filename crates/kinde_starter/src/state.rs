//! Shared application state.

use axum::extract::FromRef;
use kinde_auth::AuthState;

/// Shared application state.
///
/// Cloned for each request; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
}

impl AppState {
    pub fn new(auth: AuthState) -> Self {
        Self { auth }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
