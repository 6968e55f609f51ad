use async_trait::async_trait;
use url::Url;

use super::{AccessToken, AuthError, AuthorizationRequest, UserProfile};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Abstraction over the OAuth2 identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Build the authorization endpoint URL for a login or registration.
    fn authorization_url(&self, request: &AuthorizationRequest) -> Result<Url>;

    /// Exchange an authorization code and its PKCE verifier for an access token.
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<AccessToken>;

    /// Fetch the signed-in user's profile.
    async fn fetch_profile(&self, token: &AccessToken) -> Result<UserProfile>;

    /// Provider-side logout URL, including the post-logout redirect.
    fn logout_url(&self) -> Result<Url>;
}
