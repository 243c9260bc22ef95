//! Graph building from the validated syntax tree.
//!
//! Node literals are resolved by identifier: the first mention creates the
//! node in the scope where it appears and later declarations enrich it.
//! Relations between node literals become edges.

use log::{debug, warn};

use trellis_core::{
    directive::Directive,
    model::{Compartment, Edge, Graph, Node, NodeIndex, NodeKind, Relation, ScopeId},
};

use crate::{
    ast::{self, Chain, Link, NodeLiteral, Part, Statement},
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
};

/// The graph of one diagram and the directives declared in its source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub graph: Graph,
    /// In-document directives, in declaration order.
    pub directives: Vec<Directive>,
}

struct Builder {
    graph: Graph,
    directives: Vec<Directive>,
    diagnostics: DiagnosticCollector,
}

impl Builder {
    fn new() -> Self {
        Self {
            graph: Graph::new(),
            directives: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn document(&mut self, document: &ast::Document) {
        for statement in &document.statements {
            match statement {
                Statement::Directive { key, value } => {
                    self.directives.push(Directive::new(key.inner(), value.inner()));
                }
                Statement::Part(Part::Chain(chain)) => self.chain(chain, ScopeId::Root),
                Statement::Part(Part::Text(_)) => {}
            }
        }
    }

    fn chain(&mut self, chain: &Chain, scope: ScopeId) {
        let standalone = chain.links.is_empty();
        let mut previous = chain
            .head
            .as_ref()
            .map(|head| self.node(head, scope, standalone));

        for link in &chain.links {
            let target = link
                .target
                .as_ref()
                .map(|target| self.node(target, scope, false));
            self.edge(link, previous, target);
            previous = target;
        }
    }

    fn edge(&mut self, link: &Link, source: Option<NodeIndex>, target: Option<NodeIndex>) {
        let Some(relation) = &link.relation else {
            return;
        };

        let (source, target) = match (source, target) {
            (Some(source), Some(target)) => (source, target),
            (source, _) => {
                let missing = if source.is_none() { "source" } else { "target" };
                self.diagnostics.emit(Diagnostic::new(
                    ErrorCode::E200,
                    relation.span(),
                    format!("relation `{}` has no {missing} node", relation.inner()),
                ));
                return;
            }
        };

        let relation = Relation::from_token(relation.inner()).unwrap_or_else(|| {
            warn!(token = relation.inner().as_str(); "Unknown relation, using association");
            Relation::default()
        });
        self.graph.add_edge(
            Edge::new(source, target, relation).with_labels(&link.start_label, &link.end_label),
        );
    }

    /// Resolve a node literal, creating or enriching the node.
    fn node(&mut self, literal: &NodeLiteral, scope: ScopeId, standalone: bool) -> NodeIndex {
        let identifier = literal.identifier();
        let index = match self.graph.find(&identifier) {
            Some(index) => index,
            None => {
                debug!(id = identifier.as_str(), scope:?; "Creating node");
                self.graph.add_node(Node::new(identifier.as_str(), scope))
            }
        };

        let declared =
            standalone || literal.classifier.is_some() || literal.compartments.len() > 1;
        if declared {
            self.declare(index, literal);
        }
        index
    }

    fn declare(&mut self, index: NodeIndex, literal: &NodeLiteral) {
        let node = self.graph.node_mut(index);
        if node.label().is_empty() {
            node.set_label(literal.title_lines().join("\n"));
        }

        let classifier = literal
            .classifier
            .as_ref()
            .filter(|_| node.kind() == NodeKind::Class);
        if let Some(classifier) = classifier {
            let kind = classifier.inner().parse().unwrap_or_else(|()| {
                warn!(classifier = classifier.inner().as_str(); "Unknown classifier, using class");
                NodeKind::Class
            });
            node.set_kind(kind);
        }

        for compartment in literal.compartments.iter().skip(1) {
            if compartment.has_chains() {
                let slot = self
                    .graph
                    .node_mut(index)
                    .push_compartment(Compartment::Nested(Vec::new()));
                let scope = ScopeId::Compartment { node: index, index: slot };
                for part in &compartment.parts {
                    if let Part::Chain(chain) = part {
                        self.chain(chain, scope);
                    }
                }
            } else {
                let lines = compartment
                    .parts
                    .iter()
                    .filter_map(|part| match part {
                        Part::Text(text) => Some(text.inner().clone()),
                        Part::Chain(_) => None,
                    })
                    .collect();
                self.graph
                    .node_mut(index)
                    .push_compartment(Compartment::Text(lines));
            }
        }
    }

    fn finish(self) -> Result<Document, ParseError> {
        self.diagnostics.finish()?;
        Ok(Document {
            graph: self.graph,
            directives: self.directives,
        })
    }
}

/// Build the diagram graph from a validated syntax tree.
pub fn build(document: &ast::Document) -> Result<Document, ParseError> {
    let mut builder = Builder::new();
    builder.document(document);
    builder.finish()
}
