use std::fmt;

use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::serde::{deserialize_optional_string, deserialize_string_claim};

/// Where a browser is in the sign-in cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No flow in progress and no user.
    Anonymous,
    /// Login or Register issued a state and verifier; waiting for the callback.
    PendingAuth,
    /// Callback completed; a user id is present.
    Authenticated,
}

/// Profile fields copied into the session after a successful callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub initials: String,
    pub picture: Option<String>,
}

/// Per-browser authentication state.
///
/// Fields are private: the transition methods are the only way to change
/// them, which keeps the flow transients and the user mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    oauth_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code_verifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<SessionUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    redirect_after_login: Option<String>,
    #[serde(skip)]
    expired: bool,
}

impl Session {
    /// An empty, anonymous session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        if self.user.is_some() {
            SessionState::Authenticated
        } else if self.oauth_state.is_some() || self.code_verifier.is_some() {
            SessionState::PendingAuth
        } else {
            SessionState::Anonymous
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Start a login or registration round trip.
    ///
    /// Replaces any previous transients. A user, if present, is dropped so
    /// the session never holds both.
    pub fn begin_flow(&mut self, oauth_state: String, code_verifier: String) {
        self.user = None;
        self.oauth_state = Some(oauth_state);
        self.code_verifier = Some(code_verifier);
    }

    /// Finish the round trip: store the user and discard the transients.
    pub fn complete_flow(&mut self, user: SessionUser) {
        self.oauth_state = None;
        self.code_verifier = None;
        self.user = Some(user);
    }

    /// Remember the path an anonymous request was trying to reach.
    pub fn record_redirect(&mut self, path: impl Into<String>) {
        self.redirect_after_login = Some(path.into());
    }

    /// Consume the remembered path.
    pub fn take_redirect_after_login(&mut self) -> Option<String> {
        self.redirect_after_login.take()
    }

    /// Clear everything and mark the session for removal on the next save.
    pub fn expire(&mut self) {
        *self = Self {
            expired: true,
            ..Self::default()
        };
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn oauth_state(&self) -> Option<&str> {
        self.oauth_state.as_deref()
    }

    pub fn code_verifier(&self) -> Option<&str> {
        self.code_verifier.as_deref()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn redirect_after_login(&self) -> Option<&str> {
        self.redirect_after_login.as_deref()
    }
}

/// Userinfo document returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "deserialize_string_claim")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_claim")]
    pub preferred_email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub given_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub family_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_claim")]
    pub picture: Option<String>,
}

impl UserProfile {
    /// Normalize the profile into the fields kept in the session.
    ///
    /// `given_name` wins over `first_name` and `family_name` over
    /// `last_name`; empty values count as absent.
    pub fn into_session_user(self) -> Result<SessionUser, AuthError> {
        let id = self
            .id
            .filter(|id| !id.is_empty())
            .ok_or(AuthError::MissingClaim("id"))?;

        let first_name = self.given_name.or(self.first_name).unwrap_or_default();
        let last_name = self.family_name.or(self.last_name).unwrap_or_default();

        let name = match (first_name.is_empty(), last_name.is_empty()) {
            (false, false) => format!("{first_name} {last_name}"),
            (false, true) => first_name.clone(),
            (true, false) => last_name.clone(),
            (true, true) => String::new(),
        };

        let initials: String = first_name
            .chars()
            .next()
            .into_iter()
            .chain(last_name.chars().next())
            .collect();

        Ok(SessionUser {
            id,
            email: self.preferred_email,
            name,
            first_name,
            last_name,
            initials,
            picture: self.picture,
        })
    }
}

/// Query parameters of the redirect back from the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// What the callback handler should do after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// The session is already signed in; skip the exchange.
    AlreadyAuthenticated,
    /// Exchange `code` using the stored verifier.
    Exchange { code: String, code_verifier: String },
}

/// Which provider screen to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Login,
    Registration,
}

/// Inputs for building an authorization URL.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub state: String,
    pub code_challenge: String,
    pub prompt: Prompt,
}

/// Bearer token from the token endpoint. Held only for the userinfo call.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}
