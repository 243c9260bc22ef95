//! Error types for Trellis operations.
//!
//! This module provides the main error type [`TrellisError`] which wraps
//! the error conditions of diagram processing.

use std::io;

use thiserror::Error;

use trellis_parser::error::{ErrorKind, ParseError};

/// The main error type for Trellis operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text next to the structured
/// diagnostics so callers can render labeled spans.
#[derive(Debug, Error)]
pub enum TrellisError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },
}

impl TrellisError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }

    /// Whether a parse failure is a syntax or a reference error.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Parse { err, .. } => Some(err.kind()),
            Self::Io(_) => None,
        }
    }

    /// 1-based line and column of the primary diagnostic of a parse failure.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            Self::Parse { err, src } => err
                .primary()
                .map(|diagnostic| diagnostic.span().location(src)),
            Self::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_location() {
        let source = "[A]\n  ]";
        let err = trellis_parser::parse(source).unwrap_err();
        let err = TrellisError::new_parse_error(err, source);

        assert_eq!(err.kind(), Some(ErrorKind::Syntax));
        assert_eq!(err.location(), Some((2, 3)));
    }

    #[test]
    fn test_io_error_has_no_location() {
        let err = TrellisError::from(io::Error::other("disk full"));
        assert_eq!(err.kind(), None);
        assert_eq!(err.location(), None);
        assert_eq!(err.to_string(), "I/O error: disk full");
    }
}
