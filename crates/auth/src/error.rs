use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failures of a session store backend.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The cookie decrypted but its payload is not a session.
    #[error("session payload is corrupt: {0}")]
    Corrupt(String),

    /// The session outlived its TTL.
    #[error("session expired")]
    Expired,

    /// The cookie points at a record the server no longer has.
    #[error("session record not found")]
    NotFound,

    #[error("session storage error: {0}")]
    Storage(String),
}

/// Auth errors for the kinde_auth crate.
///
/// This wraps the core `AuthError` and adds the failures of the I/O shell.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (callback validation, provider calls).
    #[error(transparent)]
    Core(#[from] kinde_core::auth::AuthError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::Core(core_err) if core_err.is_protocol_violation() => {
                tracing::warn!(error = %core_err, "Rejected auth request");
                (StatusCode::BAD_REQUEST, core_err.user_message())
            }
            AuthError::Core(core_err) => {
                tracing::error!(error = %core_err, "Identity provider call failed");
                (StatusCode::BAD_GATEWAY, core_err.user_message())
            }
            AuthError::Session(_) => {
                tracing::error!(error = %self, "Session store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Could not save your session. Please try again.".to_string(),
                )
            }
            AuthError::Config(_) => {
                tracing::error!(error = %self, "Config error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use kinde_core::auth::AuthError as CoreError;

    async fn render(error: AuthError) -> (StatusCode, String) {
        let response = error.into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn protocol_violation_is_bad_request() {
        let (status, body) = render(CoreError::StateMismatch.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("CSRF"));
    }

    #[tokio::test]
    async fn provider_failure_is_bad_gateway_without_detail() {
        let (status, body) =
            render(CoreError::CodeExchange("invalid_client: bad secret".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body.contains("invalid_client"));
    }

    #[tokio::test]
    async fn session_error_is_internal() {
        let (status, body) = render(SessionError::Storage("disk full".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("disk full"));
    }
}
