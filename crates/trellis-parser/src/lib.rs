//! Parser for the Trellis diagram language.
//!
//! Parsing runs in four phases, each reporting every problem it finds:
//!
//! 1. lexing: source text to positioned tokens.
//! 2. parsing: tokens to a syntax tree.
//! 3. validation: structural checks on the tree.
//! 4. building: the tree to a [`Graph`](trellis_core::model::Graph) plus
//!    the directives declared in the source.
//!
//! ```
//! let document = trellis_parser::parse("#direction: right\n[A] -> [B]").unwrap();
//! assert_eq!(document.graph.node_count(), 2);
//! assert_eq!(document.graph.edge_count(), 1);
//! assert_eq!(document.directives.len(), 1);
//! ```

mod ast;
mod build;
mod lexer;
mod parser;
mod span;
mod tokens;
mod validate;

pub mod error;

pub use build::Document;
pub use span::{Span, Spanned};

use log::{debug, trace};

use error::ParseError;

/// Parse diagram source into its graph and declared directives.
///
/// # Errors
///
/// Returns a [`ParseError`] holding every diagnostic of the first failing
/// phase: syntax errors (`E0xx`, `E1xx`) or reference errors (`E200`).
pub fn parse(source: &str) -> Result<Document, ParseError> {
    let tokens = lexer::tokenize(source)?;
    trace!(tokens = tokens.len(); "Tokenized source");

    let document = parser::build_document(&tokens)?;
    validate::validate(&document)?;

    let document = build::build(&document)?;
    debug!(
        nodes = document.graph.node_count(),
        edges = document.graph.edge_count(),
        directives = document.directives.len();
        "Parsed diagram"
    );
    Ok(document)
}
