//! Errors raised while interpreting directive values.

use thiserror::Error;

/// A directive value that could not be interpreted.
///
/// Diagrams degrade gracefully: callers log this error and fall back to the
/// directive's default instead of failing the render.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("invalid value `{value}` for directive `{key}`, expected one of: {expected}")]
    UnknownVariant {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("invalid number `{value}` for directive `{key}`")]
    InvalidNumber { key: &'static str, value: String },

    #[error("value {value} for directive `{key}` is outside {min}..={max}")]
    OutOfRange {
        key: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("invalid boolean `{value}` for directive `{key}`, expected `true` or `false`")]
    InvalidBool { key: &'static str, value: String },

    #[error("invalid color for directive `{key}`: {reason}")]
    InvalidColor { key: &'static str, reason: String },
}
