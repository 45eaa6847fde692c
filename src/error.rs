//! Crate-level error type.

use thiserror::Error;

use crate::alloc::AllocError;

#[derive(Error, Debug)]
pub enum LsbError {
    #[error(transparent)]
    Alloc(#[from] AllocError),

    /// A sequence contained something other than `A`, `C`, `G` or `T`.
    #[error("invalid symbol {symbol:?} at position {position}")]
    InvalidSymbol { symbol: char, position: usize },

    #[error("sequence of length {length} exceeds the {max} symbols a k-mer can hold")]
    SequenceTooLong { length: usize, max: usize },

    #[error("invalid configuration: {message}")]
    Configuration { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LsbError {
    pub fn configuration(message: impl Into<String>) -> Self {
        LsbError::Configuration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_errors_convert_transparently() {
        let err: LsbError = AllocError::Exhausted {
            bytes: 64,
            attempts: 2,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "allocation of 64 bytes failed after 2 attempt(s)"
        );
    }

    #[test]
    fn configuration_message_is_displayed() {
        let err = LsbError::configuration("k must be at most 31");
        assert_eq!(err.to_string(), "invalid configuration: k must be at most 31");
    }
}
