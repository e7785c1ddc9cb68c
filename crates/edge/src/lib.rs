pub mod cli;
pub mod error;
pub mod handlers;
pub mod router;
pub mod settings;
pub mod state;

pub use error::Error;
pub use state::{AppState, Backends, Services, StateConfig};
