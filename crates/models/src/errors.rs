use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("incomplete auth response: missing {0}")]
    IncompleteAuth(&'static str),
}
