use thiserror::Error;

/// Errors raised while assembling a charter from configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CharterError {
    #[error("invariant id must not be empty")]
    EmptyInvariantId,

    #[error("duplicate invariant id: {0}")]
    DuplicateInvariant(String),
}

pub type CharterResult<T> = Result<T, CharterError>;
