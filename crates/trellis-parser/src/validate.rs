//! Structural checks on the syntax tree.
//!
//! The parser accepts anything it can split into text and node literals;
//! this pass rejects the shapes that carry no meaning, collecting every
//! problem before failing.

use crate::{
    ast::{Chain, CompartmentLiteral, Document, Link, NodeLiteral, Part, Statement},
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
};

struct Validator {
    diagnostics: DiagnosticCollector,
}

impl Validator {
    fn document(&mut self, document: &Document) {
        for statement in &document.statements {
            match statement {
                Statement::Directive { .. } => {}
                Statement::Part(Part::Text(text)) => self.diagnostics.emit(Diagnostic::new(
                    ErrorCode::E102,
                    text.span(),
                    format!("free text `{}` outside of a node", text.inner()),
                )),
                Statement::Part(Part::Chain(chain)) => self.chain(chain),
            }
        }
    }

    fn chain(&mut self, chain: &Chain) {
        if let Some(head) = &chain.head {
            self.node(head);
        }

        let last = chain.links.len().saturating_sub(1);
        for (index, link) in chain.links.iter().enumerate() {
            let dangling = (index == 0 && chain.head.is_none())
                || (index == last && link.target.is_none());
            self.link(link, dangling);
            if let Some(target) = &link.target {
                self.node(target);
            }
        }
    }

    fn link(&mut self, link: &Link, dangling: bool) {
        if link.relation.is_some() {
            return;
        }
        let diagnostic = if dangling {
            Diagnostic::new(
                ErrorCode::E102,
                link.span,
                format!("text `{}` is not attached to a relation", link.start_label),
            )
        } else {
            Diagnostic::new(
                ErrorCode::E105,
                link.span,
                "nodes on one line need a relation between them",
            )
        };
        self.diagnostics.emit(diagnostic);
    }

    fn node(&mut self, node: &NodeLiteral) {
        if node.identifier().trim().is_empty() {
            self.diagnostics
                .emit(Diagnostic::new(ErrorCode::E106, node.span, "node has no name"));
        }

        for (index, compartment) in node.compartments.iter().enumerate() {
            if index == 0 && compartment.has_chains() {
                self.diagnostics.emit(Diagnostic::new(
                    ErrorCode::E104,
                    compartment.span,
                    "nodes are not allowed in the title compartment",
                ));
                continue;
            } else if compartment.has_text() && compartment.has_chains() {
                self.mixed_compartment(compartment);
            }

            for part in &compartment.parts {
                if let Part::Chain(chain) = part {
                    self.chain(chain);
                }
            }
        }
    }

    fn mixed_compartment(&mut self, compartment: &CompartmentLiteral) {
        let mut diagnostic = Diagnostic::new(
            ErrorCode::E103,
            compartment.span,
            "compartment mixes text and nodes",
        );
        for part in &compartment.parts {
            if let Part::Text(text) = part {
                diagnostic = diagnostic.with_note(text.span(), "text line here");
            }
        }
        self.diagnostics.emit(diagnostic);
    }
}

/// Check the tree for structural errors, reporting all of them together.
pub fn validate(document: &Document) -> Result<(), ParseError> {
    let mut validator = Validator {
        diagnostics: DiagnosticCollector::new(),
    };
    validator.document(document);
    validator.diagnostics.finish()
}
