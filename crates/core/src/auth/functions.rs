use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::{distr::Alphanumeric, Rng};
use sha2::{Digest, Sha256};

/// Length of the CSRF `state` parameter.
pub const STATE_LENGTH: usize = 32;

/// Length of the PKCE `code_verifier` (RFC 7636 allows 43-128).
pub const CODE_VERIFIER_LENGTH: usize = 64;

/// Length of server-side session identifiers.
pub const SESSION_ID_LENGTH: usize = 32;

/// Generate a URL-safe random token of exactly `length` characters.
///
/// Draws from the thread-local CSPRNG, which is seeded from the operating
/// system. If the OS entropy source is unavailable this panics: there is
/// nothing a request handler could do to recover.
pub fn generate_token(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Generate a random state parameter for CSRF protection.
pub fn generate_state() -> String {
    generate_token(STATE_LENGTH)
}

/// Generate a PKCE code verifier.
pub fn generate_code_verifier() -> String {
    generate_token(CODE_VERIFIER_LENGTH)
}

/// Generate a random identifier for server-side session records.
pub fn generate_session_id() -> String {
    generate_token(SESSION_ID_LENGTH)
}

/// Computes the S256 code challenge from a code verifier.
///
/// `challenge = BASE64URL(SHA256(verifier))`, unpadded.
///
/// Total over any input, unlike the oauth2 crate's helper, which asserts
/// the RFC length bounds.
pub fn compute_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Calculate session expiry from the time of the last save and the TTL.
pub fn calculate_expiry(saved_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    saved_at + ttl
}

/// Check if a session expiry timestamp has passed.
pub fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at <= now
}
