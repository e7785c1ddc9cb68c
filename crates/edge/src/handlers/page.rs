// crates/edge/src/handlers/page.rs

use super::render;
use crate::{error::Error, state::AppState};
use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use domain::content::PageRequest;
use serve::resolver::BLOG_PREFIX;

type RawQuery = Query<Vec<(String, String)>>;

fn page_request(slug: String, query: &[(String, String)]) -> PageRequest {
    PageRequest::from_query(slug, query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

#[tracing::instrument(skip_all)]
pub async fn home(State(state): State<AppState>, Query(query): RawQuery) -> Result<Response, Error> {
    let preview = page_request(String::new(), &query).preview;
    let resolution = state.resolver.resolve_home(preview).await?;
    render(&state, &resolution)
}

#[tracing::instrument(skip_all, fields(slug = %slug))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): RawQuery,
) -> Result<Response, Error> {
    let request = page_request(slug, &query);
    let resolution = state.resolver.resolve(&request).await?;
    render(&state, &resolution)
}

/// `/blog/{post}` resolves the CMS story `blog/{post}`.
#[tracing::instrument(skip_all, fields(post = %post))]
pub async fn blog_post(
    State(state): State<AppState>,
    Path(post): Path<String>,
    Query(query): RawQuery,
) -> Result<Response, Error> {
    let request = page_request(format!("{BLOG_PREFIX}{post}"), &query);
    let resolution = state.resolver.resolve(&request).await?;
    render(&state, &resolution)
}
