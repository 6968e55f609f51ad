//! Kinde OAuth2 provider implementation.

use async_trait::async_trait;
use kinde_core::auth::{
    AccessToken, AuthError, AuthorizationRequest, IdentityProvider, Prompt, Result, UserProfile,
};
use oauth2::{
    basic::BasicClient, reqwest::async_http_client, AuthType, AuthUrl, AuthorizationCode,
    ClientId, ClientSecret, CsrfToken, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse,
    TokenUrl,
};
use url::Url;

use crate::config::ProviderConfig;

/// Kinde identity provider.
///
/// Client credentials are sent in the token request body, not as HTTP
/// basic auth.
pub struct KindeProvider {
    client: BasicClient,
    http_client: reqwest::Client,
    scopes: Vec<String>,
    userinfo_endpoint: Url,
    logout_url: Url,
}

impl KindeProvider {
    /// # Errors
    ///
    /// Returns `Provider` if an endpoint is not a valid URL or the HTTP
    /// client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let auth_url = AuthUrl::new(config.authorization_endpoint.to_string())
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        let token_url = TokenUrl::new(config.token_endpoint.to_string())
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        let redirect_url = RedirectUrl::new(config.redirect_uri.to_string())
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        let client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            auth_url,
            Some(token_url),
        )
        .set_auth_type(AuthType::RequestBody)
        .set_redirect_uri(redirect_url);

        // Build HTTP client without redirect following
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthError::Provider(format!("Failed to build HTTP client: {e}")))?;

        let mut logout_url = config.logout_endpoint.clone();
        logout_url
            .query_pairs_mut()
            .append_pair("redirect", &config.logout_redirect_uri);

        Ok(Self {
            client,
            http_client,
            scopes: config.scopes.clone(),
            userinfo_endpoint: config.userinfo_endpoint.clone(),
            logout_url,
        })
    }
}

#[async_trait]
impl IdentityProvider for KindeProvider {
    fn authorization_url(&self, request: &AuthorizationRequest) -> Result<Url> {
        let state = request.state.clone();

        // The challenge is computed by the caller, so it is passed as plain
        // parameters rather than through the client's PKCE helper.
        let mut builder = self
            .client
            .authorize_url(move || CsrfToken::new(state))
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .add_extra_param("code_challenge", request.code_challenge.clone())
            .add_extra_param("code_challenge_method", "S256");

        if request.prompt == Prompt::Registration {
            builder = builder.add_extra_param("screen_hint", "registration");
        }

        let (url, _csrf) = builder.url();
        Ok(url)
    }

    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<AccessToken> {
        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(code_verifier.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| AuthError::CodeExchange(e.to_string()))?;

        Ok(AccessToken::new(
            token_response.access_token().secret().clone(),
        ))
    }

    async fn fetch_profile(&self, token: &AccessToken) -> Result<UserProfile> {
        let response = self
            .http_client
            .get(self.userinfo_endpoint.clone())
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| AuthError::UserInfo(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::UserInfo(format!(
                "userinfo endpoint returned {status}"
            )));
        }

        response
            .json::<UserProfile>()
            .await
            .map_err(|e| AuthError::UserInfo(e.without_url().to_string()))
    }

    fn logout_url(&self) -> Result<Url> {
        Ok(self.logout_url.clone())
    }
}
