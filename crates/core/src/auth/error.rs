use thiserror::Error;

/// Failures of the login/callback flow.
///
/// Protocol violations carry a message safe to show to the user.
/// Environment faults carry internal detail that must only be logged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("OAuth state not found in session")]
    StateNotFound,

    #[error("no state parameter received from the identity provider")]
    MissingState,

    #[error("OAuth state mismatch")]
    StateMismatch,

    #[error("identity provider returned an error: {0}")]
    ProviderDenied(String),

    #[error("no authorization code received")]
    MissingCode,

    #[error("PKCE code verifier not found in session")]
    VerifierNotFound,

    #[error("missing required profile claim: {0}")]
    MissingClaim(&'static str),

    #[error("failed to exchange authorization code: {0}")]
    CodeExchange(String),

    #[error("failed to fetch user profile: {0}")]
    UserInfo(String),

    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("provider error: {0}")]
    Provider(String),
}

impl AuthError {
    /// True for errors caused by the request itself (bad or replayed
    /// callback), false for failures talking to the identity provider.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::StateNotFound
                | Self::MissingState
                | Self::StateMismatch
                | Self::ProviderDenied(_)
                | Self::MissingCode
                | Self::VerifierNotFound
                | Self::MissingClaim(_)
        )
    }

    /// Human-readable message for the end user. Never includes transport
    /// or provider internals.
    pub fn user_message(&self) -> String {
        match self {
            Self::StateNotFound => "State not found in session. Your session may have expired. \
                                    Please try logging in again."
                .to_string(),
            Self::MissingState => {
                "No state parameter received from the identity provider.".to_string()
            }
            Self::StateMismatch => {
                "Invalid state parameter (CSRF check failed). Please try logging in again."
                    .to_string()
            }
            Self::ProviderDenied(description) => {
                format!("The identity provider could not sign you in: {description}")
            }
            Self::MissingCode => "No authorization code received.".to_string(),
            Self::VerifierNotFound => {
                "Code verifier not found in session. Please try logging in again.".to_string()
            }
            Self::MissingClaim(_) => {
                "The identity provider returned an incomplete profile.".to_string()
            }
            Self::CodeExchange(_) | Self::UserInfo(_) | Self::Timeout(_) | Self::Provider(_) => {
                "Could not complete sign-in with the identity provider. Please try again."
                    .to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_violations_are_classified() {
        assert!(AuthError::StateMismatch.is_protocol_violation());
        assert!(AuthError::MissingCode.is_protocol_violation());
        assert!(AuthError::MissingClaim("id").is_protocol_violation());
        assert!(!AuthError::CodeExchange("connection refused".into()).is_protocol_violation());
        assert!(!AuthError::Timeout("token exchange").is_protocol_violation());
    }

    #[test]
    fn environment_faults_hide_detail_from_users() {
        let error = AuthError::CodeExchange("invalid_client: secret=hunter2".into());
        assert!(!error.user_message().contains("hunter2"));
        assert!(error.to_string().contains("invalid_client"));
    }

    #[test]
    fn csrf_failure_message_is_specific() {
        assert!(AuthError::StateMismatch.user_message().contains("CSRF"));
    }

    #[test]
    fn timeout_display_names_the_operation() {
        assert_eq!(
            AuthError::Timeout("userinfo request").to_string(),
            "userinfo request timed out"
        );
    }
}
