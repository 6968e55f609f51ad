//! Health check endpoint.

use axum::Json;
use serde_json::{json, Value};

/// GET /health - Liveness probe.
///
/// Returns 200 immediately. Does not contact the identity provider.
#[axum::debug_handler]
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
