use thiserror::Error;

/// Errors raised while parsing boundary tokens or advancing a clock.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid {kind}: {value:?}")]
    InvalidEnum { kind: &'static str, value: String },

    #[error("invalid logical time token: {0:?} (expected g<N>)")]
    InvalidLogicalTime(String),

    #[error("logical clock exhausted at generation {0}")]
    ClockExhausted(u64),
}

pub type TokenResult<T> = Result<T, TokenError>;
