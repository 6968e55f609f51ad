//! Stateless store: the session is serialized into the encrypted cookie.

use async_trait::async_trait;
use axum_extra::extract::PrivateCookieJar;
use chrono::{DateTime, Utc};
use kinde_core::auth::{calculate_expiry, is_expired, Session};
use serde::{Deserialize, Serialize};

use super::{CookieSettings, SessionStore};
use crate::error::SessionError;

/// Cookie payload. The expiry travels inside the ciphertext so an old
/// cookie replayed past its TTL is rejected even if the browser kept it.
#[derive(Serialize, Deserialize)]
struct Envelope {
    session: Session,
    expires_at: DateTime<Utc>,
}

/// Keeps the whole session in an AES-GCM encrypted cookie.
#[derive(Debug, Clone)]
pub struct CookieSessionStore {
    settings: CookieSettings,
}

impl CookieSessionStore {
    pub fn new(settings: CookieSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl SessionStore for CookieSessionStore {
    async fn load(&self, jar: &PrivateCookieJar) -> Result<Session, SessionError> {
        let Some(cookie) = jar.get(&self.settings.name) else {
            return Ok(Session::new());
        };

        let envelope: Envelope = serde_json::from_str(cookie.value())
            .map_err(|e| SessionError::Corrupt(e.to_string()))?;

        if is_expired(envelope.expires_at, Utc::now()) {
            return Err(SessionError::Expired);
        }

        Ok(envelope.session)
    }

    async fn save(
        &self,
        jar: PrivateCookieJar,
        session: &Session,
    ) -> Result<PrivateCookieJar, SessionError> {
        if session.is_expired() {
            return Ok(jar.remove(self.settings.removal()));
        }

        let envelope = Envelope {
            session: session.clone(),
            expires_at: calculate_expiry(Utc::now(), self.settings.chrono_ttl()?),
        };
        let value =
            serde_json::to_string(&envelope).map_err(|e| SessionError::Storage(e.to_string()))?;

        Ok(jar.add(self.settings.build(value)))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::response::IntoResponse;
    use axum_extra::extract::cookie::{Cookie, Key};

    use super::*;
    use crate::sessions::test_support::{jar_with_cookie, set_cookie_header, set_cookie_pair};

    fn store() -> CookieSessionStore {
        CookieSessionStore::new(CookieSettings {
            name: "kinde_session".to_string(),
            secure: true,
            ttl: Duration::from_secs(604_800),
        })
    }

    fn pending() -> Session {
        let mut session = Session::new();
        session.begin_flow("state-abc".into(), "verifier-xyz".into());
        session
    }

    #[tokio::test]
    async fn missing_cookie_is_anonymous() {
        let jar = PrivateCookieJar::new(Key::generate());
        let session = store().load(&jar).await.unwrap();
        assert_eq!(session, Session::new());
    }

    #[tokio::test]
    async fn save_then_load_roundtrips_through_headers() {
        let key = Key::generate();
        let store = store();

        let jar = store
            .save(PrivateCookieJar::new(key.clone()), &pending())
            .await
            .unwrap();
        let response = jar.into_response();
        let pair = set_cookie_pair(&response, "kinde_session").unwrap();

        let loaded = store.load(&jar_with_cookie(&pair, &key)).await.unwrap();
        assert_eq!(loaded.oauth_state(), Some("state-abc"));
        assert_eq!(loaded.code_verifier(), Some("verifier-xyz"));
    }

    #[tokio::test]
    async fn cookie_value_is_opaque() {
        let jar = store()
            .save(PrivateCookieJar::new(Key::generate()), &pending())
            .await
            .unwrap();
        let response = jar.into_response();
        let pair = set_cookie_pair(&response, "kinde_session").unwrap();
        assert!(!pair.contains("state-abc"));
        assert!(!pair.contains("verifier-xyz"));
    }

    #[tokio::test]
    async fn cookie_attributes() {
        let jar = store()
            .save(PrivateCookieJar::new(Key::generate()), &pending())
            .await
            .unwrap();
        let header = set_cookie_header(&jar.into_response(), "kinde_session").unwrap();
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Lax"));
        assert!(header.contains("Path=/"));
        assert!(header.contains("Max-Age=604800"));
        assert!(header.contains("Secure"));
    }

    #[tokio::test]
    async fn cookie_from_another_key_is_ignored() {
        let store = store();
        let jar = store
            .save(PrivateCookieJar::new(Key::generate()), &pending())
            .await
            .unwrap();
        let pair = set_cookie_pair(&jar.into_response(), "kinde_session").unwrap();

        let loaded = store
            .load(&jar_with_cookie(&pair, &Key::generate()))
            .await
            .unwrap();
        assert_eq!(loaded, Session::new());
    }

    #[tokio::test]
    async fn tampered_cookie_is_ignored() {
        let key = Key::generate();
        let loaded = store()
            .load(&jar_with_cookie("kinde_session=not-a-ciphertext", &key))
            .await
            .unwrap();
        assert_eq!(loaded, Session::new());
    }

    #[tokio::test]
    async fn payload_past_its_expiry_is_rejected() {
        let key = Key::generate();
        let stale = serde_json::json!({
            "session": {"oauth_state": "old"},
            "expires_at": "2020-01-01T00:00:00Z",
        })
        .to_string();
        let jar = PrivateCookieJar::new(key.clone()).add(Cookie::new("kinde_session", stale));
        let pair = set_cookie_pair(&jar.into_response(), "kinde_session").unwrap();

        let result = store().load(&jar_with_cookie(&pair, &key)).await;
        assert!(matches!(result, Err(SessionError::Expired)));
    }

    #[tokio::test]
    async fn undecodable_payload_is_corrupt() {
        let key = Key::generate();
        let jar = PrivateCookieJar::new(key.clone()).add(Cookie::new("kinde_session", "{"));
        let pair = set_cookie_pair(&jar.into_response(), "kinde_session").unwrap();

        let result = store().load(&jar_with_cookie(&pair, &key)).await;
        assert!(matches!(result, Err(SessionError::Corrupt(_))));
    }

    #[tokio::test]
    async fn expired_session_becomes_removal_cookie() {
        let key = Key::generate();
        let store = store();
        let jar = store
            .save(PrivateCookieJar::new(key.clone()), &pending())
            .await
            .unwrap();
        let pair = set_cookie_pair(&jar.into_response(), "kinde_session").unwrap();

        let mut session = store.load(&jar_with_cookie(&pair, &key)).await.unwrap();
        session.expire();
        let jar = store
            .save(jar_with_cookie(&pair, &key), &session)
            .await
            .unwrap();

        let header = set_cookie_header(&jar.into_response(), "kinde_session").unwrap();
        assert!(header.starts_with("kinde_session=;"));
        assert!(header.contains("Max-Age=0"));
    }
}
