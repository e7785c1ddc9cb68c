// crates/edge/src/handlers/preview.rs

use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use domain::{cms::Version, content::PREVIEW_PARAM};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{error, warn};

#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    pub secret: Option<String>,
    pub slug: Option<String>,
}

/// Entry point for the CMS editor: checks the secret, confirms the draft
/// exists and redirects into preview mode.
#[tracing::instrument(skip_all)]
pub async fn enter(State(state): State<AppState>, Query(query): Query<PreviewQuery>) -> Response {
    let authorized = match (&state.preview_secret, query.secret.as_deref()) {
        (Some(expected), Some(given)) => expected.expose_secret() == given,
        _ => false,
    };
    if !authorized {
        warn!("preview rejected: bad or missing secret");
        return (StatusCode::UNAUTHORIZED, "Invalid token").into_response();
    }

    let Some(slug) = query.slug.filter(|s| !s.trim().is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing slug").into_response();
    };
    let slug = slug.trim_matches('/').to_owned();

    match state.backends.stories.get_story(&slug, Version::Draft).await {
        Ok(Some(_)) => {
            let target = format!("/{slug}?{PREVIEW_PARAM}={}", Utc::now().timestamp_millis());
            Redirect::temporary(&target).into_response()
        }
        Ok(None) => (StatusCode::NOT_FOUND, "Story not found").into_response(),
        Err(e) => {
            error!(source = "cms", slug = %slug, error = %e, "preview lookup failed");
            (StatusCode::NOT_FOUND, "Story not found").into_response()
        }
    }
}
