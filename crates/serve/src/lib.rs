pub mod backend;
pub mod blocks;
pub mod markup;
pub mod metadata;
pub mod og;
pub mod preview;
pub mod render;
pub mod resolver;
pub mod richtext;

use backend::BackendError;
use domain::content::Source;
use http::StatusCode;
use render::error::RenderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// A source failed (transport or upstream error) and the fallback policy
    /// does not allow trying the next one.
    #[error("{} source failed: {error}", origin.as_str())]
    Upstream { origin: Source, error: BackendError },
}

impl Error {
    pub fn to_status(&self) -> StatusCode {
        match self {
            Error::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}
