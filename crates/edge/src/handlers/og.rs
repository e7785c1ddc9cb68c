// crates/edge/src/handlers/og.rs

use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::IntoResponse,
};
use serve::{og::render_social_image, resolver::BLOG_PREFIX};

async fn social_image(state: &AppState, slug: &str) -> impl IntoResponse {
    let title = state.resolver.resolve_title(slug).await;
    let svg = render_social_image(&title, &state.layout.site().name);
    (
        [
            (CONTENT_TYPE, "image/svg+xml"),
            (CACHE_CONTROL, "public, max-age=3600"),
        ],
        svg,
    )
}

#[tracing::instrument(skip_all, fields(slug = %slug))]
pub async fn image(State(state): State<AppState>, Path(slug): Path<String>) -> impl IntoResponse {
    social_image(&state, &slug).await
}

#[tracing::instrument(skip_all, fields(post = %post))]
pub async fn blog_post_image(
    State(state): State<AppState>,
    Path(post): Path<String>,
) -> impl IntoResponse {
    social_image(&state, &format!("{BLOG_PREFIX}{post}")).await
}
