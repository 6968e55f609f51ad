//! Session storage implementations.
//!
//! Provides `SessionStore` implementations for:
//! - Encrypted cookie (the whole session lives in the browser)
//! - In-memory (the cookie carries only a random record id)

mod cookie;
mod memory;

use std::time::Duration;

use async_trait::async_trait;
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    PrivateCookieJar,
};
use kinde_core::auth::Session;

use crate::config::AuthConfig;
use crate::error::SessionError;

pub use cookie::CookieSessionStore;
pub use memory::{MemorySessionStore, DEFAULT_MAX_RECORDS};

/// Loads and persists the per-browser session through the private cookie jar.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the session for this request.
    ///
    /// A request without a session cookie yields an empty session. A cookie
    /// that fails to decrypt is indistinguishable from no cookie.
    async fn load(&self, jar: &PrivateCookieJar) -> Result<Session, SessionError>;

    /// Persist the session, returning the jar to send back.
    ///
    /// An expired session becomes a removal cookie.
    async fn save(
        &self,
        jar: PrivateCookieJar,
        session: &Session,
    ) -> Result<PrivateCookieJar, SessionError>;
}

/// Attributes shared by every session cookie.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
    pub ttl: Duration,
}

impl CookieSettings {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            secure: config.cookie_secure,
            ttl: config.session_ttl,
        }
    }

    fn build(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(self.ttl.as_secs() as i64))
            .build()
    }

    pub(crate) fn removal(&self) -> Cookie<'static> {
        Cookie::build(self.name.clone()).path("/").build()
    }

    fn chrono_ttl(&self) -> Result<chrono::Duration, SessionError> {
        chrono::Duration::from_std(self.ttl).map_err(|e| SessionError::Storage(e.to_string()))
    }
}
