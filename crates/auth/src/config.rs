use std::fmt;
use std::time::Duration;

use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use url::Url;

use crate::error::AuthError;

/// Scopes requested on every authorization.
pub const DEFAULT_SCOPES: [&str; 4] = ["openid", "profile", "email", "offline"];

/// Identity provider settings. Endpoints default to the Kinde layout under
/// `domain` and may be overridden afterwards.
#[derive(Clone)]
pub struct ProviderConfig {
    pub domain: Url,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: Url,
    /// Sent to the logout endpoint exactly as configured; the provider
    /// matches it against the registered value.
    pub logout_redirect_uri: String,
    pub scopes: Vec<String>,
    pub authorization_endpoint: Url,
    pub token_endpoint: Url,
    pub userinfo_endpoint: Url,
    pub logout_endpoint: Url,
}

impl ProviderConfig {
    /// Derive the endpoint set from the provider domain.
    ///
    /// # Errors
    ///
    /// Returns `Config` if an endpoint cannot be joined onto `domain`
    /// (for example a `data:` URL) or `logout_redirect_uri` is not a URL.
    pub fn new(
        domain: Url,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: Url,
        logout_redirect_uri: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let logout_redirect_uri = logout_redirect_uri.into();
        Url::parse(&logout_redirect_uri)
            .map_err(|e| AuthError::Config(format!("invalid logout redirect URI: {e}")))?;

        let endpoint = |path: &str| {
            domain
                .join(path)
                .map_err(|e| AuthError::Config(format!("invalid provider domain: {e}")))
        };

        Ok(Self {
            authorization_endpoint: endpoint("/oauth2/auth")?,
            token_endpoint: endpoint("/oauth2/token")?,
            userinfo_endpoint: endpoint("/oauth2/user_profile")?,
            logout_endpoint: endpoint("/logout")?,
            domain,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri,
            logout_redirect_uri,
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("domain", &self.domain.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("redirect_uri", &self.redirect_uri.as_str())
            .field("logout_redirect_uri", &self.logout_redirect_uri)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

/// Complete auth configuration, built once at startup and shared.
#[derive(Clone)]
pub struct AuthConfig {
    pub provider: ProviderConfig,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub cookie_key: Key,
    pub session_ttl: Duration,
    pub provider_timeout: Duration,
    pub login_path: String,
    pub landing_path: String,
}

impl AuthConfig {
    /// Configuration with the default cookie name (`kinde_session`), a 7 day
    /// session TTL, a 10 second provider deadline and `/dashboard` as the
    /// landing page.
    pub fn new(provider: ProviderConfig, cookie_key: Key) -> Self {
        Self {
            provider,
            cookie_name: "kinde_session".to_string(),
            cookie_secure: true,
            cookie_key,
            session_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            provider_timeout: Duration::from_secs(10),
            login_path: "/login".to_string(),
            landing_path: "/dashboard".to_string(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("provider", &self.provider)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("session_ttl", &self.session_ttl)
            .field("provider_timeout", &self.provider_timeout)
            .field("login_path", &self.login_path)
            .field("landing_path", &self.landing_path)
            .finish_non_exhaustive()
    }
}

/// Stretch an arbitrary-length secret into the 64-byte cookie key.
///
/// # Errors
///
/// Returns `Config` for an empty secret.
pub fn cookie_key_from_secret(secret: &str) -> Result<Key, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::Config("session secret must not be empty".into()));
    }

    let digest = Sha512::digest(secret.as_bytes());
    Key::try_from(digest.as_slice()).map_err(|e| AuthError::Config(e.to_string()))
}
