// crates/edge/src/error.rs

use adapt::{MailchimpError, ShopifyError, StoryblokError};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serve::{backend::BackendError, render::RenderError, Error as ServeError};
use std::io;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serve error: {0}")]
    Serve(#[from] ServeError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("commerce client: {0}")]
    Shopify(#[from] ShopifyError),

    #[error("cms client: {0}")]
    Storyblok(#[from] StoryblokError),

    #[error("newsletter client: {0}")]
    Mailchimp(#[from] MailchimpError),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Serve(e) => e.to_status(),
            Error::Backend(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        error!(%status, error = %self, "request failed");
        let reason = status.canonical_reason().unwrap_or("Error");
        (
            status,
            Html(format!(
                "<!DOCTYPE html><html><head><title>{reason}</title></head><body><h1>{reason}</h1></body></html>"
            )),
        )
            .into_response()
    }
}
