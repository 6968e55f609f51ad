//! Mock identity provider for tests and local development.
//!
//! Behaves like a real authorization server where it matters to the flow:
//! it remembers the PKCE challenge of the last authorization URL and only
//! accepts a verifier that hashes to it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use kinde_core::auth::{
    compute_challenge, AccessToken, AuthError, AuthorizationRequest, IdentityProvider, Prompt,
    Result, UserProfile,
};
use url::Url;

const MOCK_IDP_URL: &str = "https://mock-idp.test";
const MOCK_ACCESS_TOKEN: &str = "mock-access-token";

/// Scriptable in-process provider that counts outbound calls.
pub struct MockProvider {
    profile: UserProfile,
    fail_exchange: bool,
    fail_profile: bool,
    fail_logout: bool,
    delay: Option<Duration>,
    last_challenge: Mutex<Option<String>>,
    exchange_calls: AtomicUsize,
    profile_calls: AtomicUsize,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// A provider that signs everyone in as Ada Lovelace.
    pub fn new() -> Self {
        Self::with_profile(UserProfile {
            id: Some("kp_ada".to_string()),
            preferred_email: Some("ada@example.com".to_string()),
            given_name: Some("Ada".to_string()),
            family_name: Some("Lovelace".to_string()),
            ..UserProfile::default()
        })
    }

    pub fn with_profile(profile: UserProfile) -> Self {
        Self {
            profile,
            fail_exchange: false,
            fail_profile: false,
            fail_logout: false,
            delay: None,
            last_challenge: Mutex::new(None),
            exchange_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
        }
    }

    /// Make every token exchange fail.
    pub fn failing_exchange(mut self) -> Self {
        self.fail_exchange = true;
        self
    }

    /// Make every userinfo request fail.
    pub fn failing_profile(mut self) -> Self {
        self.fail_profile = true;
        self
    }

    /// Make the logout URL unavailable.
    pub fn failing_logout(mut self) -> Self {
        self.fail_logout = true;
        self
    }

    /// Delay every outbound call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl IdentityProvider for MockProvider {
    fn authorization_url(&self, request: &AuthorizationRequest) -> Result<Url> {
        let mut url = Url::parse(MOCK_IDP_URL)
            .and_then(|base| base.join("/oauth2/auth"))
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("state", &request.state)
            .append_pair("code_challenge", &request.code_challenge)
            .append_pair("code_challenge_method", "S256");
        if request.prompt == Prompt::Registration {
            url.query_pairs_mut()
                .append_pair("screen_hint", "registration");
        }

        if let Ok(mut last) = self.last_challenge.lock() {
            *last = Some(request.code_challenge.clone());
        }

        Ok(url)
    }

    async fn exchange_code(&self, _code: &str, code_verifier: &str) -> Result<AccessToken> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await;

        if self.fail_exchange {
            return Err(AuthError::CodeExchange("invalid_grant".to_string()));
        }

        let expected = self
            .last_challenge
            .lock()
            .ok()
            .and_then(|last| last.clone());
        if expected.as_deref() != Some(compute_challenge(code_verifier).as_str()) {
            return Err(AuthError::CodeExchange(
                "invalid_grant: PKCE verification failed".to_string(),
            ));
        }

        Ok(AccessToken::new(MOCK_ACCESS_TOKEN))
    }

    async fn fetch_profile(&self, token: &AccessToken) -> Result<UserProfile> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await;

        if self.fail_profile || token.secret() != MOCK_ACCESS_TOKEN {
            return Err(AuthError::UserInfo("401 Unauthorized".to_string()));
        }

        Ok(self.profile.clone())
    }

    fn logout_url(&self) -> Result<Url> {
        if self.fail_logout {
            return Err(AuthError::Provider("logout endpoint unavailable".to_string()));
        }
        let mut url = Url::parse(MOCK_IDP_URL)
            .and_then(|base| base.join("/logout"))
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("redirect", "http://localhost:3000");
        Ok(url)
    }
}
