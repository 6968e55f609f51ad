//! Kinde sign-in for axum applications.
//!
//! This crate provides:
//! - The OAuth2 authorization code flow with PKCE against Kinde
//! - Encrypted cookie sessions (or an in-memory keyed store)
//! - An auth gate middleware and axum extractors for the signed-in user

mod config;
mod error;
mod extractors;
mod gate;
mod handlers;
mod providers;
mod sessions;
mod state;

pub use config::{cookie_key_from_secret, AuthConfig, ProviderConfig, DEFAULT_SCOPES};
pub use error::{AuthError, SessionError};
pub use extractors::{CurrentUser, OptionalUser, StaleSessionCookie};
pub use gate::require_auth;
pub use handlers::auth_routes;
pub use providers::KindeProvider;
#[cfg(any(test, feature = "mock"))]
pub use providers::MockProvider;
pub use sessions::{
    CookieSessionStore, CookieSettings, MemorySessionStore, SessionStore, DEFAULT_MAX_RECORDS,
};
pub use state::AuthState;

pub use axum_extra::extract::cookie::Key;
