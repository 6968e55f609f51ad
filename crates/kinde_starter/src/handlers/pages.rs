//! Minimal JSON pages for the starter.

use axum::Json;
use axum_extra::extract::CookieJar;
use kinde_auth::{CurrentUser, OptionalUser, StaleSessionCookie};
use kinde_core::auth::SessionUser;
use serde::Serialize;

/// Display fields shown on every signed-in page.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub name: String,
    pub email: Option<String>,
    pub initials: String,
    pub picture: Option<String>,
}

impl From<&SessionUser> for UserSummary {
    fn from(user: &SessionUser) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            initials: user.initials.clone(),
            picture: user.picture.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct ProfilePage {
    pub id: String,
    pub email: Option<String>,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub initials: String,
    pub picture: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiUser {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub picture: Option<String>,
}

/// GET / - Public home page. Clears a session cookie that cannot be read.
pub async fn home(
    StaleSessionCookie(stale): StaleSessionCookie,
    OptionalUser(user): OptionalUser,
) -> (Option<CookieJar>, Json<HomePage>) {
    let page = HomePage {
        authenticated: user.is_some(),
        user: user.as_ref().map(UserSummary::from),
    };
    (stale, Json(page))
}

/// GET /dashboard - Landing page after sign-in.
pub async fn dashboard(CurrentUser(user): CurrentUser) -> Json<UserSummary> {
    Json(UserSummary::from(&user))
}

/// GET /profile
pub async fn profile(CurrentUser(user): CurrentUser) -> Json<ProfilePage> {
    Json(ProfilePage {
        id: user.id,
        email: user.email,
        name: user.name,
        first_name: user.first_name,
        last_name: user.last_name,
        initials: user.initials,
        picture: user.picture,
    })
}

/// GET /api/user
pub async fn api_user(CurrentUser(user): CurrentUser) -> Json<ApiUser> {
    Json(ApiUser {
        id: user.id,
        name: user.name,
        email: user.email,
        picture: user.picture,
    })
}
