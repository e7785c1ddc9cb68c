// crates/edge/src/handlers/blog.rs

use super::render;
use crate::{error::Error, state::AppState};
use axum::{
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct BlogQuery {
    pub page: Option<u32>,
}

#[tracing::instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<BlogQuery>,
) -> Result<Response, Error> {
    let resolution = state.resolver.blog_index(query.page.unwrap_or(1)).await?;
    render(&state, &resolution)
}
