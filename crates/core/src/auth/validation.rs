use super::{AuthError, CallbackAction, CallbackParams, Session};

/// Checks that a remembered path is safe to redirect to after login.
///
/// Returns `Some(path)` only for same-origin relative paths. Rejected:
/// - anything not starting with `/`
/// - protocol-relative forms (`//host`, and `/\host` which browsers
///   normalize to `//host`)
/// - control characters
/// - embedded schemes (`://`)
///
/// ```
/// use kinde_core::auth::validate_return_to;
///
/// assert_eq!(validate_return_to("/dashboard"), Some("/dashboard"));
/// assert_eq!(validate_return_to("//evil.com"), None);
/// assert_eq!(validate_return_to("https://evil.com"), None);
/// ```
pub fn validate_return_to(path: &str) -> Option<&str> {
    if !path.starts_with('/') || path.starts_with("//") || path.starts_with("/\\") {
        return None;
    }

    if path.chars().any(char::is_control) || path.contains("://") {
        return None;
    }

    Some(path)
}

/// Decide what a callback request may do, without touching the session.
///
/// Checks run in a fixed order and the first failure wins:
/// 1. an already signed-in session short-circuits (no exchange),
/// 2. a stored state must exist, the query state must be non-empty and
///    both must match byte-for-byte,
/// 3. a provider-reported `error` is surfaced,
/// 4. a non-empty code must be present,
/// 5. a stored verifier must exist.
pub fn validate_callback(
    session: &Session,
    params: &CallbackParams,
) -> Result<CallbackAction, AuthError> {
    if session.is_authenticated() {
        return Ok(CallbackAction::AlreadyAuthenticated);
    }

    let stored_state = session.oauth_state().ok_or(AuthError::StateNotFound)?;

    let received_state = params
        .state
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(AuthError::MissingState)?;

    if stored_state.as_bytes() != received_state.as_bytes() {
        return Err(AuthError::StateMismatch);
    }

    if let Some(error) = params.error.as_deref().filter(|e| !e.is_empty()) {
        let description = params
            .error_description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(error);
        return Err(AuthError::ProviderDenied(description.to_string()));
    }

    let code = params
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or(AuthError::MissingCode)?;

    let code_verifier = session.code_verifier().ok_or(AuthError::VerifierNotFound)?;

    Ok(CallbackAction::Exchange {
        code: code.to_string(),
        code_verifier: code_verifier.to_string(),
    })
}
