//! HTTP handlers for auth routes.

use std::future::Future;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::PrivateCookieJar;
use kinde_core::auth::{
    compute_challenge, generate_code_verifier, generate_state, validate_callback,
    validate_return_to, AuthError as CoreError, AuthorizationRequest, CallbackAction,
    CallbackParams, Prompt, Session,
};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::AuthState;

/// Creates the auth router.
///
/// Routes:
/// - `GET /login` - Start the authorization code flow
/// - `GET /register` - Same, opening the provider's sign-up screen
/// - `GET /callback` - Handle the provider redirect
/// - `GET|POST /logout` - End the session and sign out at the provider
pub fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route("/login", get(login))
        .route("/register", get(register))
        .route("/callback", get(callback))
        .route("/logout", get(logout).post(logout))
}

/// Load the session, treating any store failure as an anonymous browser.
pub(crate) async fn load_session(state: &AuthState, jar: &PrivateCookieJar) -> Session {
    match state.sessions.load(jar).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable session");
            Session::new()
        }
    }
}

/// Bound an outbound provider call.
async fn with_deadline<T>(
    limit: Duration,
    operation: &'static str,
    call: impl Future<Output = Result<T, CoreError>>,
) -> Result<T, CoreError> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| CoreError::Timeout(operation))?
}

/// Where to send a browser that has just signed in.
fn landing_target(session: &mut Session, config: &AuthConfig) -> String {
    session
        .take_redirect_after_login()
        .filter(|path| validate_return_to(path).is_some())
        .unwrap_or_else(|| config.landing_path.clone())
}

async fn login(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Redirect), AuthError> {
    begin_flow(&state, jar, Prompt::Login).await
}

async fn register(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Redirect), AuthError> {
    begin_flow(&state, jar, Prompt::Registration).await
}

async fn begin_flow(
    state: &AuthState,
    jar: PrivateCookieJar,
    prompt: Prompt,
) -> Result<(PrivateCookieJar, Redirect), AuthError> {
    let mut session = load_session(state, &jar).await;

    if session.is_authenticated() {
        tracing::debug!("Already signed in, skipping authorization");
        return Ok((jar, Redirect::temporary(&state.config.landing_path)));
    }

    let oauth_state = generate_state();
    let code_verifier = generate_code_verifier();

    let auth_url = state.provider.authorization_url(&AuthorizationRequest {
        state: oauth_state.clone(),
        code_challenge: compute_challenge(&code_verifier),
        prompt,
    })?;

    session.begin_flow(oauth_state, code_verifier);
    let jar = state.sessions.save(jar, &session).await?;

    tracing::info!(?prompt, "Redirecting to identity provider");
    Ok((jar, Redirect::temporary(auth_url.as_str())))
}

async fn callback(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(PrivateCookieJar, Redirect), AuthError> {
    let mut session = load_session(&state, &jar).await;

    let (code, code_verifier) = match validate_callback(&session, &params)? {
        CallbackAction::AlreadyAuthenticated => {
            tracing::debug!("Duplicate callback for a signed-in session");
            return Ok((jar, Redirect::temporary(&state.config.landing_path)));
        }
        CallbackAction::Exchange {
            code,
            code_verifier,
        } => (code, code_verifier),
    };

    let limit = state.config.provider_timeout;
    let token = with_deadline(
        limit,
        "token exchange",
        state.provider.exchange_code(&code, &code_verifier),
    )
    .await?;
    let profile = with_deadline(
        limit,
        "userinfo request",
        state.provider.fetch_profile(&token),
    )
    .await?;
    let user = profile.into_session_user()?;

    tracing::info!(user_id = %user.id, "User signed in");
    session.complete_flow(user);

    let target = landing_target(&mut session, &state.config);
    let jar = state.sessions.save(jar, &session).await?;

    Ok((jar, Redirect::temporary(&target)))
}

async fn logout(State(state): State<AuthState>, jar: PrivateCookieJar) -> Response {
    let mut session = load_session(&state, &jar).await;
    if let Some(user) = session.user() {
        tracing::info!(user_id = %user.id, "User signed out");
    }
    session.expire();

    let jar = match state.sessions.save(jar.clone(), &session).await {
        Ok(jar) => jar,
        Err(e) => {
            tracing::warn!(error = %e, "Could not clear session on logout");
            jar
        }
    };

    // The removal cookie goes out even when the provider step fails.
    match state.provider.logout_url() {
        Ok(url) => (jar, Redirect::temporary(url.as_str())).into_response(),
        Err(e) => (jar, AuthError::from(e)).into_response(),
    }
}
