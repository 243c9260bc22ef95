//! SVG rendering of a laid out diagram.
//!
//! The document carries explicit `width`, `height` and `viewBox`. Nodes are
//! drawn in arena order, which puts every container below its nested
//! nodes, and edges are drawn last so they stay visible over containers.

mod edge;
mod node;

use log::debug;
use svg::{Document, node::Text as SvgText, node::element as svg_element};

use trellis_core::{
    draw::StrokeDefinition,
    geometry::Point,
    model::Graph,
    style::Style,
};

use crate::layout::LayoutResult;

/// Horizontal anchoring of a text line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Start,
    Middle,
}

impl Anchor {
    fn to_svg_value(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
        }
    }
}

/// Renders one diagram to an SVG [`Document`].
pub struct SvgRenderer<'a> {
    graph: &'a Graph,
    style: &'a Style,
    layout: &'a LayoutResult,
}

impl<'a> SvgRenderer<'a> {
    pub fn new(graph: &'a Graph, style: &'a Style, layout: &'a LayoutResult) -> Self {
        Self {
            graph,
            style,
            layout,
        }
    }

    /// Builds the complete SVG document.
    pub fn render(&self) -> Document {
        let size = self.layout.size();
        let mut document = Document::new()
            .set("width", size.width())
            .set("height", size.height())
            .set("viewBox", format!("0 0 {} {}", size.width(), size.height()));

        if let Some(background) = self.style.background() {
            document = document.add(
                svg_element::Rectangle::new()
                    .set("x", 0)
                    .set("y", 0)
                    .set("width", size.width())
                    .set("height", size.height())
                    .set("fill", background.to_string())
                    .set("fill-opacity", background.alpha()),
            );
        }

        for (index, node) in self.graph.nodes() {
            if node.kind().is_visible() {
                document = self.render_node(document, index, node);
            }
        }

        for (index, edge) in self.graph.edges() {
            if edge.relation().is_visible() {
                document = self.render_edge(document, index, edge);
            }
        }

        debug!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count();
            "SVG document rendered"
        );
        document
    }

    fn stroke(&self) -> StrokeDefinition {
        StrokeDefinition::solid(self.style.stroke(), self.style.line_width())
    }

    /// Background color used inside hollow arrowheads.
    fn canvas_fill(&self) -> String {
        self.style
            .background()
            .map_or_else(|| "white".to_string(), |color| color.to_string())
    }

    /// A single text line whose vertical center sits at `position`.
    fn text_line(&self, line: &str, position: Point, anchor: Anchor) -> svg_element::Text {
        let font = self.style.font();
        svg_element::Text::new("")
            .set("x", position.x())
            .set("y", position.y())
            .set("text-anchor", anchor.to_svg_value())
            .set("dominant-baseline", "central")
            .set("font-family", font.family())
            .set("font-size", font.size())
            .set("fill", self.style.stroke().to_string())
            .add(SvgText::new(line))
    }
}
