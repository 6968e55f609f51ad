//! Auth gate middleware for protected routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::handlers::load_session;
use crate::AuthState;

/// Redirects anonymous requests to the login path, remembering where they
/// were going. Signed-in requests pass through untouched.
///
/// ```ignore
/// let protected = Router::new()
///     .route("/dashboard", get(dashboard))
///     .route_layer(middleware::from_fn_with_state(auth.clone(), require_auth));
/// ```
pub async fn require_auth(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    request: Request,
    next: Next,
) -> Response {
    let mut session = load_session(&state, &jar).await;

    if session.is_authenticated() {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    tracing::debug!(%path, "Redirecting anonymous request to login");
    session.record_redirect(path);

    let jar = match state.sessions.save(jar.clone(), &session).await {
        Ok(jar) => jar,
        Err(e) => {
            tracing::warn!(error = %e, "Could not remember redirect target");
            jar
        }
    };

    (jar, Redirect::temporary(&state.config.login_path)).into_response()
}
