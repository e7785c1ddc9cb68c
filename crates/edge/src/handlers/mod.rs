// crates/edge/src/handlers/mod.rs

pub mod blog;
pub mod cart;
pub mod newsletter;
pub mod og;
pub mod page;
pub mod preview;
pub mod revalidate;

use crate::{error::Error, state::AppState};
use axum::{
    http::{header::CACHE_CONTROL, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serve::resolver::Resolution;

/// Drafts and failures are never cached; found pages use the page type's
/// lifetime.
pub fn cache_control(resolution: &Resolution) -> HeaderValue {
    if resolution.preview || resolution.status != StatusCode::OK {
        return HeaderValue::from_static("no-store");
    }
    let seconds = resolution.page_type.config().default_cache_seconds;
    HeaderValue::from_str(&format!(
        "public, s-maxage={seconds}, stale-while-revalidate"
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("no-store"))
}

/// Wrap a resolution in the document layout.
pub fn render(state: &AppState, resolution: &Resolution) -> Result<Response, Error> {
    let html = state.layout.page(&resolution.view())?;
    Ok((
        resolution.status,
        [(CACHE_CONTROL, cache_control(resolution))],
        Html(html),
    )
        .into_response())
}
