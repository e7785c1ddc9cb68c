pub mod error;
pub mod html_rewriter;
pub mod template;

pub use error::RenderError;
pub use template::{long_date, BlogEntry, Layout, PageView};
