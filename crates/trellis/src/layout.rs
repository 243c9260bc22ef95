//! Layered layout of a diagram graph.
//!
//! Every scope (the root and each nested compartment) is laid out on its
//! own, innermost first, so a node knows the size of the scopes it holds
//! before its own scope is ranked:
//!
//! 1. each edge goes to the innermost scope holding both endpoints, with the
//!    endpoints lifted to children of that scope;
//! 2. back edges are reversed and the scope is ranked;
//! 3. long edges get virtual vertices and layers are reordered to reduce
//!    crossings;
//! 4. vertices get coordinates, then nested scopes are translated into the
//!    compartments holding them and edges are routed in absolute space.

mod order;
mod position;
mod rank;
mod route;
mod size;

use indexmap::IndexMap;
use log::{debug, trace, warn};

use trellis_core::{
    geometry::{Bounds, Point, Size},
    model::{Compartment, EdgeIndex, Graph, NodeIndex, ScopeId},
    style::{Direction, Style},
};
use order::{Layering, Vertex};
use position::Spacing;
use size::NodeShape;

/// Absolute placement of one node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeLayout {
    bounds: Bounds,
    sections: Vec<Bounds>,
}

impl NodeLayout {
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// The title section followed by one section per compartment.
    pub fn sections(&self) -> &[Bounds] {
        &self.sections
    }
}

/// Route of one edge, from its source end to its target end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeLayout {
    points: Vec<Point>,
}

impl EdgeLayout {
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

/// Absolute geometry of a laid out diagram.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    nodes: Vec<NodeLayout>,
    edges: Vec<EdgeLayout>,
    size: Size,
}

impl LayoutResult {
    pub fn node(&self, index: NodeIndex) -> &NodeLayout {
        &self.nodes[index.index()]
    }

    pub fn edge(&self, index: EdgeIndex) -> &EdgeLayout {
        &self.edges[index.index()]
    }

    /// Canvas size, including the outer gutter.
    pub fn size(&self) -> Size {
        self.size
    }
}

#[derive(Debug, Clone, Copy)]
enum Route {
    /// Between two distinct children of the scope, possibly lifted.
    Ranked { source: NodeIndex, target: NodeIndex },
    SelfLoop,
    /// Between nodes that lift to the same child, such as a node and one it contains.
    Direct,
}

#[derive(Debug, Clone, Copy)]
struct ScopedEdge {
    edge: EdgeIndex,
    route: Route,
}

/// Layout of one scope relative to its own top-left corner.
#[derive(Debug, Clone, Default)]
struct ScopeLayout {
    size: Size,
    /// Per child of the scope, in declaration order.
    shapes: Vec<NodeShape>,
    centers: Vec<Point>,
    /// Bend points of ranked edges, in edge direction.
    bends: IndexMap<EdgeIndex, Vec<Point>>,
}

/// Computes a [`LayoutResult`] for a graph under a style.
pub struct LayoutEngine<'a> {
    graph: &'a Graph,
    style: &'a Style,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(graph: &'a Graph, style: &'a Style) -> Self {
        Self { graph, style }
    }

    /// Lays out the whole graph. Never fails: the style bounds every numeric
    /// directive, and a canvas that still overflows is capped.
    pub fn layout(&self) -> LayoutResult {
        let scoped_edges = self.scoped_edges();

        let mut layouts: IndexMap<ScopeId, ScopeLayout> = IndexMap::new();
        for scope in self.graph.scopes() {
            let edges = scoped_edges.get(&scope).map_or(&[][..], Vec::as_slice);
            let layout = self.layout_scope(scope, edges, &layouts);
            trace!(
                scope:?,
                width = layout.size.width(),
                height = layout.size.height();
                "Laid out scope"
            );
            layouts.insert(scope, layout);
        }

        let gutter = self.style.gutter();
        let mut nodes = vec![NodeLayout::default(); self.graph.node_count()];
        let mut offsets = IndexMap::new();
        self.place(
            ScopeId::Root,
            Point::new(gutter, gutter),
            &layouts,
            &mut nodes,
            &mut offsets,
        );

        let mut edges = vec![EdgeLayout::default(); self.graph.edge_count()];
        for (scope, scoped) in &scoped_edges {
            let offset = offsets.get(scope).copied().unwrap_or_default();
            let bends = layouts.get(scope).map(|layout| &layout.bends);
            for scoped_edge in scoped {
                let bends = bends
                    .and_then(|bends| bends.get(&scoped_edge.edge))
                    .map_or(&[][..], Vec::as_slice);
                edges[scoped_edge.edge.index()] = self.route(*scoped_edge, bends, offset, &nodes);
            }
        }

        let root = layouts.get(&ScopeId::Root).map(|layout| layout.size).unwrap_or_default();
        let mut size = canvas_size(root, gutter, &nodes, &edges);
        if !size.width().is_finite() || !size.height().is_finite() {
            warn!(width = size.width(), height = size.height(); "Capping non-finite canvas size");
            size = Size::new(size.width().min(f32::MAX), size.height().min(f32::MAX));
        }

        debug!(width = size.width(), height = size.height(); "Layout complete");
        LayoutResult { nodes, edges, size }
    }

    /// Assigns every edge to the innermost scope holding both endpoints.
    fn scoped_edges(&self) -> IndexMap<ScopeId, Vec<ScopedEdge>> {
        let mut scoped: IndexMap<ScopeId, Vec<ScopedEdge>> = IndexMap::new();
        for (edge, data) in self.graph.edges() {
            let (source, target) = (data.source(), data.target());
            let (scope, route) = if source == target {
                (self.graph.node(source).parent(), Route::SelfLoop)
            } else {
                let scope = self.graph.common_scope(source, target);
                let route = match (self.graph.lift(source, scope), self.graph.lift(target, scope)) {
                    (Some(source), Some(target)) if source != target => {
                        Route::Ranked { source, target }
                    }
                    _ => Route::Direct,
                };
                (scope, route)
            };
            scoped.entry(scope).or_default().push(ScopedEdge { edge, route });
        }
        scoped
    }

    fn layout_scope(
        &self,
        scope: ScopeId,
        edges: &[ScopedEdge],
        layouts: &IndexMap<ScopeId, ScopeLayout>,
    ) -> ScopeLayout {
        let children = self.graph.scope_children(scope);
        let local: IndexMap<NodeIndex, usize> = children
            .iter()
            .enumerate()
            .map(|(position, &child)| (child, position))
            .collect();

        let shapes: Vec<NodeShape> = children
            .iter()
            .map(|&child| {
                size::node_shape(self.graph.node(child), self.style, |index| {
                    layouts
                        .get(&ScopeId::Compartment { node: child, index })
                        .map(|layout| layout.size)
                        .unwrap_or_default()
                })
            })
            .collect();

        let ranked: Vec<(EdgeIndex, (usize, usize))> = edges
            .iter()
            .filter_map(|scoped_edge| match scoped_edge.route {
                Route::Ranked { source, target } => Some((
                    scoped_edge.edge,
                    (*local.get(&source)?, *local.get(&target)?),
                )),
                Route::SelfLoop | Route::Direct => None,
            })
            .collect();
        let pairs: Vec<(usize, usize)> = ranked.iter().map(|(_, pair)| *pair).collect();

        let reversed = rank::reversed_edges(children.len(), &pairs);
        let oriented: Vec<(usize, usize)> = pairs
            .iter()
            .zip(&reversed)
            .map(|(&(source, target), &flip)| {
                if flip { (target, source) } else { (source, target) }
            })
            .collect();
        let ranks = rank::assign_ranks(self.style.ranker(), children.len(), &oriented);

        let mut layering = Layering::new(&ranks, &oriented);
        layering.minimize_crossings();

        let transpose = self.style.direction() == Direction::Right;
        let sizes: Vec<Size> = layering
            .vertices
            .iter()
            .map(|vertex| match vertex {
                Vertex::Node(position) if transpose => shapes[*position].size.transpose(),
                Vertex::Node(position) => shapes[*position].size,
                Vertex::Virtual => Size::new(2.0 * self.style.edge_margin(), 0.0),
            })
            .collect();

        let placement = position::place(
            &layering,
            &sizes,
            Spacing {
                gutter: self.style.gutter(),
                spacing: self.style.spacing(),
                gravity: self.style.gravity(),
            },
        );
        let oriented_point = |point: Point| if transpose { point.transpose() } else { point };

        let bends = ranked
            .iter()
            .zip(&reversed)
            .zip(&layering.chains)
            .map(|(((edge, _), &flip), chain)| {
                let mut points: Vec<Point> = chain[1..chain.len() - 1]
                    .iter()
                    .map(|&vertex| oriented_point(placement.centers[vertex]))
                    .collect();
                if flip {
                    points.reverse();
                }
                (*edge, points)
            })
            .collect();

        ScopeLayout {
            size: if transpose {
                placement.size.transpose()
            } else {
                placement.size
            },
            shapes,
            centers: placement.centers[..children.len()]
                .iter()
                .map(|&center| oriented_point(center))
                .collect(),
            bends,
        }
    }

    /// Places the children of `scope` with its top-left corner at `offset`,
    /// then recurses into their nested compartments.
    fn place(
        &self,
        scope: ScopeId,
        offset: Point,
        layouts: &IndexMap<ScopeId, ScopeLayout>,
        nodes: &mut [NodeLayout],
        offsets: &mut IndexMap<ScopeId, Point>,
    ) {
        let Some(layout) = layouts.get(&scope) else {
            return;
        };
        offsets.insert(scope, offset);

        for (position, &child) in self.graph.scope_children(scope).iter().enumerate() {
            let shape = &layout.shapes[position];
            let center = offset.add_point(layout.centers[position]);
            let bounds = Bounds::new_from_center(center, shape.size);

            let mut top = bounds.min_y();
            let sections: Vec<Bounds> = shape
                .sections
                .iter()
                .map(|&height| {
                    let section = Bounds::new_from_top_left(
                        Point::new(bounds.min_x(), top),
                        Size::new(bounds.width(), height),
                    );
                    top += height;
                    section
                })
                .collect();

            for (index, compartment) in self.graph.node(child).compartments().iter().enumerate() {
                if !matches!(compartment, Compartment::Nested(_)) {
                    continue;
                }
                let Some(section) = sections.get(index + 1) else {
                    continue;
                };
                let inner = ScopeId::Compartment { node: child, index };
                let inner_size = layouts.get(&inner).map(|layout| layout.size).unwrap_or_default();
                let nested_offset = Point::new(
                    section.min_x() + (section.width() - inner_size.width()) / 2.0,
                    section.min_y() + self.style.padding(),
                );
                self.place(inner, nested_offset, layouts, nodes, offsets);
            }

            nodes[child.index()] = NodeLayout { bounds, sections };
        }
    }

    fn route(
        &self,
        scoped_edge: ScopedEdge,
        bends: &[Point],
        offset: Point,
        nodes: &[NodeLayout],
    ) -> EdgeLayout {
        let edge = self.graph.edge(scoped_edge.edge);
        let source = nodes[edge.source().index()].bounds;
        let target = nodes[edge.target().index()].bounds;
        let margin = self.style.edge_margin();

        let points = match scoped_edge.route {
            Route::SelfLoop => route::self_loop(source, self.style.spacing() / 2.0),
            Route::Direct if source.contains(&target) => route::containment(source, target),
            Route::Direct if target.contains(&source) => {
                let mut points = route::containment(target, source);
                points.reverse();
                points
            }
            Route::Ranked { .. } | Route::Direct => {
                let mut points = Vec::with_capacity(bends.len() + 2);
                points.push(source.center());
                points.extend(bends.iter().map(|bend| bend.add_point(offset)));
                points.push(target.center());
                route::clip(&mut points, source, target, margin);
                points
            }
        };
        EdgeLayout { points }
    }
}

/// Canvas covering every node and edge, plus the gutter on each side.
fn canvas_size(root: Size, gutter: f32, nodes: &[NodeLayout], edges: &[EdgeLayout]) -> Size {
    let node_extent = nodes
        .iter()
        .map(|node| Point::new(node.bounds.max_x(), node.bounds.max_y()));
    let edge_extent = edges.iter().flat_map(|edge| edge.points.iter().copied());

    let (width, height) = node_extent
        .chain(edge_extent)
        .fold((root.width() + gutter, root.height() + gutter), |(width, height), point| {
            (width.max(point.x()), height.max(point.y()))
        });
    Size::new(width + gutter, height + gutter)
}
