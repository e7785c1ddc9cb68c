// crates/edge/src/handlers/newsletter.rs

use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{error, warn};

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// `POST /api/newsletter` with `{"email": "..."}`.
///
/// Validation happens before the provider is contacted. Without a configured
/// provider the signup is acknowledged and dropped.
#[tracing::instrument(skip_all)]
pub async fn subscribe(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(%rejection, "newsletter body rejected");
            return failure(StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    let email = body
        .get("email")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|e| e.contains('@'));
    let Some(email) = email else {
        return failure(StatusCode::BAD_REQUEST, "Valid email is required");
    };

    if let Some(list) = &state.backends.newsletter {
        if let Err(e) = list.subscribe(email).await {
            error!(error = %e, "newsletter signup failed");
            return failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to subscribe");
        }
    }

    Json(json!({ "success": true })).into_response()
}
