//! Application state for auth.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use kinde_core::auth::IdentityProvider;

use crate::config::AuthConfig;
use crate::sessions::SessionStore;

/// Shared state for auth handlers, the gate and the extractors.
#[derive(Clone)]
pub struct AuthState {
    pub config: Arc<AuthConfig>,
    pub provider: Arc<dyn IdentityProvider>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AuthState {
    pub fn new(
        config: AuthConfig,
        provider: Arc<dyn IdentityProvider>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            provider,
            sessions,
        }
    }
}

/// Lets `PrivateCookieJar` find the encryption key.
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.config.cookie_key.clone()
    }
}
