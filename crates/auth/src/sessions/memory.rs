//! In-memory session storage. The cookie carries only a random record id.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum_extra::extract::PrivateCookieJar;
use chrono::{DateTime, Utc};
use kinde_core::auth::{calculate_expiry, generate_session_id, is_expired, Session};
use tokio::sync::RwLock;

use super::{CookieSettings, SessionStore};
use crate::error::SessionError;

/// Default cap on live records.
pub const DEFAULT_MAX_RECORDS: usize = 10_000;

/// Lifetime of a record that is not signed in (a remembered redirect or a
/// pending authorization).
const ANONYMOUS_TTL_SECS: i64 = 10 * 60;

#[derive(Debug, Clone)]
struct Record {
    session: Session,
    expires_at: DateTime<Utc>,
}

/// Server-side session store for single-instance deployments and tests.
///
/// Records live in a HashMap wrapped in `Arc<RwLock<_>>` and are lost when
/// the process exits. Every save issues a fresh record id.
///
/// Records that are not signed in live for ten minutes at most. When the
/// store is full, the record closest to expiry is evicted.
#[derive(Debug, Clone)]
pub struct MemorySessionStore {
    settings: CookieSettings,
    max_records: usize,
    records: Arc<RwLock<HashMap<String, Record>>>,
}

impl MemorySessionStore {
    pub fn new(settings: CookieSettings) -> Self {
        Self::with_limit(settings, DEFAULT_MAX_RECORDS)
    }

    /// Store holding at most `max_records` records (at least one).
    pub fn with_limit(settings: CookieSettings, max_records: usize) -> Self {
        Self {
            settings,
            max_records: max_records.max(1),
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn ttl_for(&self, session: &Session) -> Result<chrono::Duration, SessionError> {
        let ttl = self.settings.chrono_ttl()?;
        if session.is_authenticated() {
            Ok(ttl)
        } else {
            Ok(ttl.min(chrono::Duration::seconds(ANONYMOUS_TTL_SECS)))
        }
    }

    /// Number of live records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, jar: &PrivateCookieJar) -> Result<Session, SessionError> {
        let Some(cookie) = jar.get(&self.settings.name) else {
            return Ok(Session::new());
        };
        let id = cookie.value();

        let record = self
            .records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(SessionError::NotFound)?;

        if is_expired(record.expires_at, Utc::now()) {
            self.records.write().await.remove(id);
            return Err(SessionError::Expired);
        }

        Ok(record.session)
    }

    async fn save(
        &self,
        jar: PrivateCookieJar,
        session: &Session,
    ) -> Result<PrivateCookieJar, SessionError> {
        let previous = jar.get(&self.settings.name);
        let now = Utc::now();

        let mut records = self.records.write().await;
        if let Some(previous) = previous {
            records.remove(previous.value());
        }
        records.retain(|_, record| !is_expired(record.expires_at, now));

        if session.is_expired() {
            return Ok(jar.remove(self.settings.removal()));
        }

        let expires_at = calculate_expiry(now, self.ttl_for(session)?);
        while records.len() >= self.max_records {
            let Some(oldest) = records
                .iter()
                .min_by_key(|(_, record)| record.expires_at)
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            records.remove(&oldest);
            tracing::debug!("Session store full, evicted the record closest to expiry");
        }

        let id = generate_session_id();
        records.insert(
            id.clone(),
            Record {
                session: session.clone(),
                expires_at,
            },
        );

        Ok(jar.add(self.settings.build(id)))
    }
}
