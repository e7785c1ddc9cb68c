// crates/edge/src/handlers/revalidate.rs

use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use serve::backend::{RevalidateOutcome, RevalidateRequest};

pub const TOPIC_HEADER: &str = "x-shopify-topic";

#[derive(Debug, Default, Deserialize)]
pub struct RevalidateQuery {
    pub secret: Option<String>,
}

/// Commerce webhook: drops cached reads for the resource named by the topic.
#[tracing::instrument(skip_all)]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RevalidateQuery>,
) -> Response {
    let request = RevalidateRequest {
        topic: headers
            .get(TOPIC_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        secret: query.secret,
    };

    match state.backends.commerce.revalidate(request) {
        RevalidateOutcome::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "status": 401, "message": "Invalid revalidation secret" })),
        )
            .into_response(),
        RevalidateOutcome::Ignored => Json(json!({ "status": 200 })).into_response(),
        RevalidateOutcome::Revalidated { now, .. } => {
            Json(json!({ "status": 200, "revalidated": true, "now": now })).into_response()
        }
    }
}
