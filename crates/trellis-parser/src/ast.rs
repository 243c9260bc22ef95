//! Syntax tree produced by the parser.
//!
//! The tree mirrors the text closely: it keeps free text and incomplete
//! relations so the validation and building phases can report them with
//! precise spans.

use crate::span::{Span, Spanned};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A `#key: value` line.
    Directive {
        key: Spanned<String>,
        value: Spanned<String>,
    },
    /// A top-level part, separated from its neighbours by newlines or `;`.
    Part(Part),
}

/// One line (or `;`-separated piece) of a compartment or of the document.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Text without any node literal.
    Text(Spanned<String>),
    /// Node literals joined by relations.
    Chain(Chain),
}

impl Part {
    pub fn span(&self) -> Span {
        match self {
            Part::Text(text) => text.span(),
            Part::Chain(chain) => chain.span,
        }
    }
}

/// `head (relation target)*`.
///
/// `head` is `None` when the chain starts with a relation (`-> [B]`), and a
/// link's `target` is `None` when the chain ends with one (`[A] ->`).
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub head: Option<NodeLiteral>,
    pub links: Vec<Link>,
    pub span: Span,
}

/// The text between two node literals, and the node that follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    /// The chosen relation operator; `None` when the text holds none.
    pub relation: Option<Spanned<String>>,
    pub start_label: String,
    pub end_label: String,
    pub target: Option<NodeLiteral>,
    /// Span of the text between the nodes.
    pub span: Span,
}

/// `[<classifier> title | compartment | ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLiteral {
    pub classifier: Option<Spanned<String>>,
    pub compartments: Vec<CompartmentLiteral>,
    pub span: Span,
}

impl NodeLiteral {
    /// Text lines of the title compartment.
    pub fn title_lines(&self) -> Vec<&str> {
        self.compartments
            .first()
            .map(|title| {
                title
                    .parts
                    .iter()
                    .filter_map(|part| match part {
                        Part::Text(text) => Some(text.as_str()),
                        Part::Chain(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Identifier of the node: title lines joined by a space.
    pub fn identifier(&self) -> String {
        self.title_lines().join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompartmentLiteral {
    pub parts: Vec<Part>,
    pub span: Span,
}

impl CompartmentLiteral {
    pub fn has_text(&self) -> bool {
        self.parts.iter().any(|part| matches!(part, Part::Text(_)))
    }

    pub fn has_chains(&self) -> bool {
        self.parts.iter().any(|part| matches!(part, Part::Chain(_)))
    }
}
