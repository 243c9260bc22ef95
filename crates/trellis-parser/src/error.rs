//! Diagnostics produced while parsing a diagram.
//!
//! Each problem is a [`Diagnostic`] tagged with an [`ErrorCode`]. The code
//! supplies the span label and the help text, so every report of one code
//! reads the same way. A failing phase returns all of its diagnostics in a
//! [`ParseError`].
//!
//! ```
//! # use trellis_parser::error::{Diagnostic, ErrorCode, ErrorKind};
//! # use trellis_parser::Span;
//! let message = "relation `->` has no target node";
//! let diag = Diagnostic::new(ErrorCode::E200, Span::new(3..5), message);
//! assert_eq!(diag.code().kind(), ErrorKind::Reference);
//! assert_eq!(diag.help(), ErrorCode::E200.help());
//! ```

mod code;
mod diagnostic;
mod parse_error;

pub(crate) use parse_error::{DiagnosticCollector, Result};

pub use code::{ErrorCode, ErrorKind};
pub use diagnostic::{Diagnostic, Note};
pub use parse_error::ParseError;
