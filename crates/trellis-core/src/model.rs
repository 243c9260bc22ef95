//! Graph model produced by the builder and consumed by layout and rendering.
//!
//! # Pipeline Position
//!
//! ```text
//! Source Text
//!     ↓ lexer + parser
//! AST (statements, chains, node literals)
//!     ↓ builder
//! Graph (these types) - merged nodes, typed relations
//!     ↓ layout
//! LayoutResult
//!     ↓ export
//! SVG
//! ```
//!
//! Nodes live in an arena owned by [`Graph`] and are addressed by
//! [`NodeIndex`]. A node's nested compartments store child indices and every
//! child stores its parent [`ScopeId`], so the containment tree can be walked
//! in both directions without owning pointers.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;

use self::{ArrowHead as Head, AssociationKind as Kind, LineStyle as Line};

/// Position of a node in the [`Graph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Position of an edge in the [`Graph`] edge list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeIndex(usize);

impl EdgeIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A container of nodes: the diagram root or one compartment of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeId {
    Root,
    Compartment { node: NodeIndex, index: usize },
}

impl ScopeId {
    /// The node owning this scope, `None` for the root.
    pub fn owner(self) -> Option<NodeIndex> {
        match self {
            ScopeId::Root => None,
            ScopeId::Compartment { node, .. } => Some(node),
        }
    }
}

/// Visual kind of a node, selected with a `<classifier>` prefix.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    #[default]
    Class,
    Abstract,
    Instance,
    Record,
    Note,
    Reference,
    Package,
    Frame,
    Database,
    Start,
    End,
    State,
    Choice,
    Actor,
    UseCase,
    Label,
    Hidden,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Class => "class",
            NodeKind::Abstract => "abstract",
            NodeKind::Instance => "instance",
            NodeKind::Record => "record",
            NodeKind::Note => "note",
            NodeKind::Reference => "reference",
            NodeKind::Package => "package",
            NodeKind::Frame => "frame",
            NodeKind::Database => "database",
            NodeKind::Start => "start",
            NodeKind::End => "end",
            NodeKind::State => "state",
            NodeKind::Choice => "choice",
            NodeKind::Actor => "actor",
            NodeKind::UseCase => "usecase",
            NodeKind::Label => "label",
            NodeKind::Hidden => "hidden",
        }
    }

    /// Kinds drawn as a fixed-size marker with no text.
    pub fn is_marker(self) -> bool {
        matches!(self, NodeKind::Start | NodeKind::End | NodeKind::Choice)
    }

    pub fn is_visible(self) -> bool {
        self != NodeKind::Hidden
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "class" => NodeKind::Class,
            "abstract" => NodeKind::Abstract,
            "instance" => NodeKind::Instance,
            "record" => NodeKind::Record,
            "note" => NodeKind::Note,
            "reference" => NodeKind::Reference,
            "package" => NodeKind::Package,
            "frame" => NodeKind::Frame,
            "database" => NodeKind::Database,
            "start" => NodeKind::Start,
            "end" => NodeKind::End,
            "state" => NodeKind::State,
            "choice" => NodeKind::Choice,
            "actor" => NodeKind::Actor,
            "usecase" => NodeKind::UseCase,
            "label" => NodeKind::Label,
            "hidden" => NodeKind::Hidden,
            _ => return Err(()),
        })
    }
}

/// One section of a node box below its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compartment {
    Text(Vec<String>),
    Nested(Vec<NodeIndex>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: String,
    label: String,
    kind: NodeKind,
    compartments: Vec<Compartment>,
    parent: ScopeId,
}

impl Node {
    /// Creates an unlabeled `class` node without compartments.
    pub fn new(id: impl Into<String>, parent: ScopeId) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
            kind: NodeKind::default(),
            compartments: Vec::new(),
            parent,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The declared title; empty for nodes only referenced by edges.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Title lines to draw: the label, or the identifier when unlabeled.
    pub fn title_lines(&self) -> Vec<&str> {
        let title = if self.label.is_empty() {
            &self.id
        } else {
            &self.label
        };
        title.lines().collect()
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn compartments(&self) -> &[Compartment] {
        &self.compartments
    }

    pub fn parent(&self) -> ScopeId {
        self.parent
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn set_kind(&mut self, kind: NodeKind) {
        self.kind = kind;
    }

    /// Appends a compartment and returns its index.
    pub fn push_compartment(&mut self, compartment: Compartment) -> usize {
        self.compartments.push(compartment);
        self.compartments.len() - 1
    }
}

/// Semantic family of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationKind {
    Association,
    Dependency,
    Inheritance,
    Implementation,
    Composition,
    Aggregation,
    Note,
    Hidden,
}

/// Marker drawn at one end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrowHead {
    None,
    Arrow,
    Triangle,
    Diamond,
    HollowDiamond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineStyle {
    Solid,
    Dashed,
    Hidden,
}

/// Fully resolved meaning of a relation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Relation {
    kind: AssociationKind,
    start: ArrowHead,
    end: ArrowHead,
    line: LineStyle,
}

/// Every relation token with its meaning, longest tokens first.
const RELATIONS: &[(&str, Relation)] = &[
    ("<-->", Relation::new(Kind::Dependency, Head::Arrow, Head::Arrow, Line::Dashed)),
    ("--:>", Relation::new(Kind::Implementation, Head::None, Head::Triangle, Line::Dashed)),
    ("<:--", Relation::new(Kind::Implementation, Head::Triangle, Head::None, Line::Dashed)),
    ("<->", Relation::new(Kind::Association, Head::Arrow, Head::Arrow, Line::Solid)),
    ("-->", Relation::new(Kind::Dependency, Head::None, Head::Arrow, Line::Dashed)),
    ("<--", Relation::new(Kind::Dependency, Head::Arrow, Head::None, Line::Dashed)),
    ("-:>", Relation::new(Kind::Inheritance, Head::None, Head::Triangle, Line::Solid)),
    ("<:-", Relation::new(Kind::Inheritance, Head::Triangle, Head::None, Line::Solid)),
    ("+->", Relation::new(Kind::Composition, Head::Diamond, Head::Arrow, Line::Solid)),
    ("o->", Relation::new(Kind::Aggregation, Head::HollowDiamond, Head::Arrow, Line::Solid)),
    ("-/-", Relation::new(Kind::Hidden, Head::None, Head::None, Line::Hidden)),
    ("->", Relation::new(Kind::Association, Head::None, Head::Arrow, Line::Solid)),
    ("<-", Relation::new(Kind::Association, Head::Arrow, Head::None, Line::Solid)),
    ("--", Relation::new(Kind::Note, Head::None, Head::None, Line::Dashed)),
    ("+-", Relation::new(Kind::Composition, Head::Diamond, Head::None, Line::Solid)),
    ("-+", Relation::new(Kind::Composition, Head::None, Head::Diamond, Line::Solid)),
    ("o-", Relation::new(Kind::Aggregation, Head::HollowDiamond, Head::None, Line::Solid)),
    ("-o", Relation::new(Kind::Aggregation, Head::None, Head::HollowDiamond, Line::Solid)),
    ("-", Relation::new(Kind::Association, Head::None, Head::None, Line::Solid)),
];

impl Relation {
    pub const fn new(
        kind: AssociationKind,
        start: ArrowHead,
        end: ArrowHead,
        line: LineStyle,
    ) -> Self {
        Self {
            kind,
            start,
            end,
            line,
        }
    }

    /// All relation tokens, longest first, so a prefix scan finds the longest match.
    pub fn tokens() -> impl Iterator<Item = &'static str> {
        RELATIONS.iter().map(|(token, _)| *token)
    }

    /// Looks up the meaning of a relation token.
    ///
    /// ```
    /// use trellis_core::model::{ArrowHead, AssociationKind, Relation};
    ///
    /// let relation = Relation::from_token("<:-").unwrap();
    /// assert_eq!(relation.kind(), AssociationKind::Inheritance);
    /// assert_eq!(relation.start(), ArrowHead::Triangle);
    /// assert!(Relation::from_token("=>").is_none());
    /// ```
    pub fn from_token(token: &str) -> Option<Self> {
        RELATIONS
            .iter()
            .find(|(candidate, _)| *candidate == token)
            .map(|(_, relation)| *relation)
    }

    pub fn kind(&self) -> AssociationKind {
        self.kind
    }

    pub fn start(&self) -> ArrowHead {
        self.start
    }

    pub fn end(&self) -> ArrowHead {
        self.end
    }

    pub fn line(&self) -> LineStyle {
        self.line
    }

    pub fn is_visible(&self) -> bool {
        self.line != LineStyle::Hidden
    }
}

impl Default for Relation {
    fn default() -> Self {
        Self::new(
            AssociationKind::Association,
            ArrowHead::None,
            ArrowHead::None,
            LineStyle::Solid,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    source: NodeIndex,
    target: NodeIndex,
    relation: Relation,
    start_label: String,
    end_label: String,
}

impl Edge {
    pub fn new(source: NodeIndex, target: NodeIndex, relation: Relation) -> Self {
        Self {
            source,
            target,
            relation,
            start_label: String::new(),
            end_label: String::new(),
        }
    }

    pub fn with_labels(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_label = start.into();
        self.end_label = end.into();
        self
    }

    pub fn source(&self) -> NodeIndex {
        self.source
    }

    pub fn target(&self) -> NodeIndex {
        self.target
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn start_label(&self) -> &str {
        &self.start_label
    }

    pub fn end_label(&self) -> &str {
        &self.end_label
    }
}

/// Arena of nodes and edges for one diagram.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    roots: Vec<NodeIndex>,
    ids: IndexMap<String, NodeIndex>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node to the arena and attaches it to its parent scope.
    ///
    /// Attaching to a compartment that does not exist yet creates it; a text
    /// compartment receiving a child becomes a nested one.
    pub fn add_node(&mut self, node: Node) -> NodeIndex {
        let index = NodeIndex(self.nodes.len());
        let parent = node.parent;
        self.ids.insert(node.id.clone(), index);
        self.nodes.push(node);
        self.attach(index, parent);
        index
    }

    fn attach(&mut self, child: NodeIndex, scope: ScopeId) {
        let ScopeId::Compartment { node, index } = scope else {
            self.roots.push(child);
            return;
        };
        let compartments = &mut self.nodes[node.0].compartments;
        if compartments.len() <= index {
            compartments.resize_with(index + 1, || Compartment::Nested(Vec::new()));
        }
        match &mut compartments[index] {
            Compartment::Nested(children) => children.push(child),
            slot @ Compartment::Text(_) => *slot = Compartment::Nested(vec![child]),
        }
    }

    pub fn add_edge(&mut self, edge: Edge) -> EdgeIndex {
        self.edges.push(edge);
        EdgeIndex(self.edges.len() - 1)
    }

    pub fn find(&self, id: &str) -> Option<NodeIndex> {
        self.ids.get(id).copied()
    }

    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index.0]
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> &mut Node {
        &mut self.nodes[index.0]
    }

    pub fn edge(&self, index: EdgeIndex) -> &Edge {
        &self.edges[index.0]
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeIndex(index), node))
    }

    /// Edges in declaration order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeIndex, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .map(|(index, edge)| (EdgeIndex(index), edge))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Direct children of a scope, in declaration order.
    pub fn scope_children(&self, scope: ScopeId) -> &[NodeIndex] {
        match scope {
            ScopeId::Root => &self.roots,
            ScopeId::Compartment { node, index } => {
                match self.nodes[node.0].compartments.get(index) {
                    Some(Compartment::Nested(children)) => children,
                    _ => &[],
                }
            }
        }
    }

    /// Every scope holding nodes, innermost first and the root last.
    ///
    /// A scope is always listed before the scope that contains its owner, so
    /// layouts can be computed bottom-up in this order.
    pub fn scopes(&self) -> Vec<ScopeId> {
        let mut order = Vec::new();
        self.collect_scopes(ScopeId::Root, &mut order);
        order
    }

    fn collect_scopes(&self, scope: ScopeId, order: &mut Vec<ScopeId>) {
        for &child in self.scope_children(scope) {
            for (index, compartment) in self.nodes[child.0].compartments.iter().enumerate() {
                if matches!(compartment, Compartment::Nested(_)) {
                    self.collect_scopes(ScopeId::Compartment { node: child, index }, order);
                }
            }
        }
        order.push(scope);
    }

    /// Enclosing scopes of a node, from its parent up to the root.
    pub fn ancestors(&self, node: NodeIndex) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(self.nodes[node.0].parent), move |scope| {
            scope.owner().map(|owner| self.nodes[owner.0].parent)
        })
    }

    /// Number of nodes enclosing `node`; root-level nodes have depth 0.
    pub fn depth(&self, node: NodeIndex) -> usize {
        self.ancestors(node).count() - 1
    }

    /// The innermost scope containing both nodes.
    pub fn common_scope(&self, a: NodeIndex, b: NodeIndex) -> ScopeId {
        let of_b: Vec<ScopeId> = self.ancestors(b).collect();
        self.ancestors(a)
            .find(|scope| of_b.contains(scope))
            .unwrap_or(ScopeId::Root)
    }

    /// The child of `scope` that is `node` or encloses it.
    pub fn lift(&self, node: NodeIndex, scope: ScopeId) -> Option<NodeIndex> {
        let mut current = node;
        loop {
            let parent = self.nodes[current.0].parent;
            if parent == scope {
                return Some(current);
            }
            current = parent.owner()?;
        }
    }
}
