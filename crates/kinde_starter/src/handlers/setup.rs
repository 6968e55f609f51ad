//! Setup instructions served while the Kinde settings are incomplete.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SetupPage {
    pub status: &'static str,
    pub message: &'static str,
    pub missing: Vec<&'static str>,
}

/// Any route - 503 with the settings that still need to be provided.
pub async fn setup_required(
    State(missing): State<Arc<Vec<&'static str>>>,
) -> (StatusCode, Json<SetupPage>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(SetupPage {
            status: "setup_required",
            message: "Set the missing environment variables from your Kinde application and restart the server",
            missing: missing.as_ref().clone(),
        }),
    )
}
