//! Axum extractors for authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::Redirect,
};
use axum_extra::extract::{CookieJar, PrivateCookieJar};
use kinde_core::auth::{Session, SessionUser};

use crate::handlers::load_session;
use crate::sessions::CookieSettings;
use crate::AuthState;

async fn session_from_parts(state: &AuthState, parts: &Parts) -> Session {
    let jar = PrivateCookieJar::from_headers(&parts.headers, state.config.cookie_key.clone());
    load_session(state, &jar).await
}

/// Extractor for the signed-in user. Redirects to the login path otherwise.
pub struct CurrentUser(pub SessionUser);

impl<S> FromRequestParts<S> for CurrentUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        match session_from_parts(&auth_state, parts).await.user() {
            Some(user) => Ok(CurrentUser(user.clone())),
            None => Err(Redirect::temporary(&auth_state.config.login_path)),
        }
    }
}

/// Extractor for an optionally signed-in user. Never rejects.
pub struct OptionalUser(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let session = session_from_parts(&auth_state, parts).await;
        Ok(OptionalUser(session.user().cloned()))
    }
}

/// Removal cookie for a session cookie that is present but unreadable:
/// tampered, encrypted under another key, expired or unknown to the store.
///
/// Place it first in a response tuple. It adds nothing when the cookie is
/// absent or valid.
pub struct StaleSessionCookie(pub Option<CookieJar>);

impl<S> FromRequestParts<S> for StaleSessionCookie
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let name = &auth_state.config.cookie_name;

        let raw = CookieJar::from_headers(&parts.headers);
        if raw.get(name).is_none() {
            return Ok(StaleSessionCookie(None));
        }

        let jar =
            PrivateCookieJar::from_headers(&parts.headers, auth_state.config.cookie_key.clone());
        let readable = jar.get(name).is_some() && auth_state.sessions.load(&jar).await.is_ok();
        if readable {
            return Ok(StaleSessionCookie(None));
        }

        tracing::debug!("Clearing unreadable session cookie");
        let removal = CookieSettings::from_config(&auth_state.config).removal();
        Ok(StaleSessionCookie(Some(raw.remove(removal))))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request},
        response::IntoResponse,
        Router,
    };
    use axum_extra::extract::cookie::Key;
    use kinde_core::auth::Session;
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::config::{AuthConfig, ProviderConfig};
    use crate::providers::MockProvider;
    use crate::sessions::test_support::{set_cookie_header, set_cookie_pair};
    use crate::sessions::{CookieSessionStore, SessionStore};

    fn auth_state(key: &Key) -> AuthState {
        let provider = ProviderConfig::new(
            Url::parse("https://acme.kinde.com").unwrap(),
            "client-id",
            "client-secret",
            Url::parse("http://localhost:3000/callback").unwrap(),
            "http://localhost:3000",
        )
        .unwrap();
        let config = AuthConfig::new(provider, key.clone());
        let sessions = CookieSessionStore::new(CookieSettings::from_config(&config));
        AuthState::new(config, Arc::new(MockProvider::new()), Arc::new(sessions))
    }

    async fn page(StaleSessionCookie(stale): StaleSessionCookie) -> impl IntoResponse {
        (stale, "home")
    }

    async fn get(state: AuthState, cookie: Option<&str>) -> axum::response::Response {
        let mut request = Request::builder().uri("/");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        Router::new()
            .route("/", axum::routing::get(page))
            .with_state(state)
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn pending_cookie(state: &AuthState) -> String {
        let mut session = Session::new();
        session.begin_flow("state-abc".into(), "verifier-xyz".into());
        let jar = state
            .sessions
            .save(PrivateCookieJar::new(state.config.cookie_key.clone()), &session)
            .await
            .unwrap();
        set_cookie_pair(&jar.into_response(), "kinde_session").unwrap()
    }

    #[tokio::test]
    async fn tampered_cookie_is_cleared() {
        let state = auth_state(&Key::generate());
        let response = get(state, Some("kinde_session=garbage")).await;

        let header = set_cookie_header(&response, "kinde_session").unwrap();
        assert!(header.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn cookie_from_another_key_is_cleared() {
        let other = auth_state(&Key::generate());
        let cookie = pending_cookie(&other).await;

        let state = auth_state(&Key::generate());
        let response = get(state, Some(&cookie)).await;
        assert!(set_cookie_header(&response, "kinde_session").is_some());
    }

    #[tokio::test]
    async fn valid_cookie_is_left_alone() {
        let state = auth_state(&Key::generate());
        let cookie = pending_cookie(&state).await;

        let response = get(state, Some(&cookie)).await;
        assert!(set_cookie_header(&response, "kinde_session").is_none());
    }

    #[tokio::test]
    async fn missing_cookie_adds_nothing() {
        let state = auth_state(&Key::generate());
        let response = get(state, None).await;
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }
}
