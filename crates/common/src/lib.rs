use thiserror::Error;

pub mod types;
pub mod utils;
pub mod env;

/// Errors raised by the shared helpers before any service is constructed.
#[derive(Debug, Error)]
pub enum CommonError {
    #[error("unknown route: {0}")]
    UnknownRoute(String),
    #[error("environment error: {0}")]
    Env(String),
}
