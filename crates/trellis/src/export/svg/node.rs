//! Node shapes, labels and compartment separators.

use svg::{Document, node::element as svg_element};

use trellis_core::{
    apply_stroke,
    color::Color,
    draw::StrokeDefinition,
    geometry::{Bounds, Point},
    model::{Compartment, Node, NodeIndex, NodeKind},
    style::Corners,
};

use super::{Anchor, SvgRenderer};

/// Width of the folded corner of notes, relative to the padding.
const NOTE_FOLD: f32 = 1.5;

fn points_attribute(points: &[Point]) -> String {
    points
        .iter()
        .map(|point| format!("{},{}", point.x(), point.y()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn rectangle(bounds: Bounds) -> svg_element::Rectangle {
    svg_element::Rectangle::new()
        .set("x", bounds.min_x())
        .set("y", bounds.min_y())
        .set("width", bounds.width())
        .set("height", bounds.height())
}

impl SvgRenderer<'_> {
    pub(super) fn render_node(
        &self,
        document: Document,
        index: NodeIndex,
        node: &Node,
    ) -> Document {
        let layout = self.layout.node(index);
        let bounds = layout.bounds();
        let fill = self.style.fill_for_depth(self.graph.depth(index));
        let stroke = match node.kind() {
            NodeKind::Reference => {
                StrokeDefinition::dashed(self.style.stroke(), self.style.line_width())
            }
            _ => self.stroke(),
        };

        let document = match node.kind() {
            NodeKind::Start => document.add(apply_stroke!(
                svg_element::Circle::new()
                    .set("class", "node")
                    .set("cx", bounds.center().x())
                    .set("cy", bounds.center().y())
                    .set("r", bounds.width() / 2.0)
                    .set("fill", self.style.stroke().to_string()),
                &stroke
            )),
            NodeKind::End => document
                .add(apply_stroke!(
                    svg_element::Circle::new()
                        .set("class", "node")
                        .set("cx", bounds.center().x())
                        .set("cy", bounds.center().y())
                        .set("r", bounds.width() / 2.0)
                        .set("fill", fill.to_string()),
                    &stroke
                ))
                .add(
                    svg_element::Circle::new()
                        .set("cx", bounds.center().x())
                        .set("cy", bounds.center().y())
                        .set("r", bounds.width() / 4.0)
                        .set("fill", self.style.stroke().to_string()),
                ),
            NodeKind::Choice => {
                let center = bounds.center();
                let diamond = [
                    Point::new(center.x(), bounds.min_y()),
                    Point::new(bounds.max_x(), center.y()),
                    Point::new(center.x(), bounds.max_y()),
                    Point::new(bounds.min_x(), center.y()),
                ];
                document.add(self.shape_polygon(&diamond, fill, &stroke))
            }
            NodeKind::Actor => self.render_actor(document, bounds, &stroke),
            NodeKind::UseCase => document.add(apply_stroke!(
                svg_element::Ellipse::new()
                    .set("class", "node")
                    .set("cx", bounds.center().x())
                    .set("cy", bounds.center().y())
                    .set("rx", bounds.width() / 2.0)
                    .set("ry", bounds.height() / 2.0)
                    .set("fill", fill.to_string()),
                &stroke
            )),
            NodeKind::Note => {
                let fold = self.style.padding() * NOTE_FOLD;
                let outline = [
                    Point::new(bounds.min_x(), bounds.min_y()),
                    Point::new(bounds.max_x() - fold, bounds.min_y()),
                    Point::new(bounds.max_x(), bounds.min_y() + fold),
                    Point::new(bounds.max_x(), bounds.max_y()),
                    Point::new(bounds.min_x(), bounds.max_y()),
                ];
                document.add(self.shape_polygon(&outline, fill, &stroke))
            }
            NodeKind::Label => document.add(
                rectangle(bounds)
                    .set("class", "node")
                    .set("fill", "none")
                    .set("stroke", "none"),
            ),
            NodeKind::Database => {
                let cap = self.style.padding();
                document
                    .add(self.box_shape(node.kind(), bounds, fill, &stroke))
                    .add(apply_stroke!(
                        svg_element::Ellipse::new()
                            .set("cx", bounds.center().x())
                            .set("cy", bounds.min_y() + cap)
                            .set("rx", bounds.width() / 2.0)
                            .set("ry", cap)
                            .set("fill", fill.to_string()),
                        &stroke
                    ))
            }
            _ => document.add(self.box_shape(node.kind(), bounds, fill, &stroke)),
        };

        if node.kind().is_marker() {
            return document;
        }
        let document = self.render_separators(document, layout.sections(), node, &stroke);
        self.render_labels(document, layout.sections(), node)
    }

    /// The rectangle of class-like kinds; states are always rounded.
    fn box_shape(
        &self,
        kind: NodeKind,
        bounds: Bounds,
        fill: Color,
        stroke: &StrokeDefinition,
    ) -> svg_element::Rectangle {
        let radius = match (kind, self.style.corners()) {
            (NodeKind::State, _) => bounds.height().min(bounds.width()) / 4.0,
            (_, Corners::Rounded) => self.style.padding() / 2.0,
            (_, Corners::Hard) => 0.0,
        };
        let mut rect = rectangle(bounds)
            .set("class", "node")
            .set("fill", fill.to_string())
            .set("fill-opacity", fill.alpha());
        if radius > 0.0 {
            rect = rect.set("rx", radius).set("ry", radius);
        }
        apply_stroke!(rect, stroke)
    }

    fn shape_polygon(
        &self,
        points: &[Point],
        fill: Color,
        stroke: &StrokeDefinition,
    ) -> svg_element::Polygon {
        apply_stroke!(
            svg_element::Polygon::new()
                .set("class", "node")
                .set("points", points_attribute(points))
                .set("fill", fill.to_string())
                .set("fill-opacity", fill.alpha()),
            stroke
        )
    }

    /// A stick figure in the upper part of the box, the label below it.
    fn render_actor(
        &self,
        document: Document,
        bounds: Bounds,
        stroke: &StrokeDefinition,
    ) -> Document {
        let unit = self.style.font().line_height();
        let x = bounds.center().x();
        let head = bounds.min_y() + unit / 2.0;
        let shoulders = bounds.min_y() + unit * 1.25;
        let hips = bounds.min_y() + unit * 2.0;
        let feet = bounds.min_y() + unit * 3.0;

        let line = |from: Point, to: Point| {
            apply_stroke!(
                svg_element::Line::new()
                    .set("x1", from.x())
                    .set("y1", from.y())
                    .set("x2", to.x())
                    .set("y2", to.y()),
                stroke
            )
        };

        let figure = svg_element::Group::new()
            .set("class", "node")
            .add(apply_stroke!(
                svg_element::Circle::new()
                    .set("cx", x)
                    .set("cy", head)
                    .set("r", unit / 2.0)
                    .set("fill", "none"),
                stroke
            ))
            .add(line(Point::new(x, head + unit / 2.0), Point::new(x, hips)))
            .add(line(Point::new(x - unit / 2.0, shoulders), Point::new(x + unit / 2.0, shoulders)))
            .add(line(Point::new(x, hips), Point::new(x - unit / 2.0, feet)))
            .add(line(Point::new(x, hips), Point::new(x + unit / 2.0, feet)));
        document.add(figure)
    }

    fn render_separators(
        &self,
        mut document: Document,
        sections: &[Bounds],
        node: &Node,
        stroke: &StrokeDefinition,
    ) -> Document {
        if matches!(node.kind(), NodeKind::Actor | NodeKind::UseCase | NodeKind::Label) {
            return document;
        }
        for section in sections.iter().skip(1) {
            document = document.add(apply_stroke!(
                svg_element::Line::new()
                    .set("x1", section.min_x())
                    .set("y1", section.min_y())
                    .set("x2", section.max_x())
                    .set("y2", section.min_y()),
                stroke
            ));
        }
        document
    }

    /// Title lines centered in the first section, compartment text left
    /// aligned in the others. Nested compartments draw their own nodes.
    fn render_labels(&self, mut document: Document, sections: &[Bounds], node: &Node) -> Document {
        let line_height = self.style.font().line_height();
        let padding = self.style.padding();

        if let Some(title) = sections.first() {
            let lines = node.title_lines();
            let block = lines.len() as f32 * line_height;
            let top = match node.kind() {
                NodeKind::Actor => title.max_y() - padding - block,
                _ => title.center().y() - block / 2.0,
            };
            for (row, line) in lines.iter().enumerate() {
                let baseline = top + (row as f32 + 0.5) * line_height;
                let position = Point::new(title.center().x(), baseline);
                let mut text = self.text_line(line, position, Anchor::Middle);
                match node.kind() {
                    NodeKind::Class | NodeKind::Abstract | NodeKind::Package | NodeKind::Frame => {
                        text = text.set("font-weight", "bold");
                    }
                    NodeKind::Instance => text = text.set("text-decoration", "underline"),
                    _ => {}
                }
                if node.kind() == NodeKind::Abstract {
                    text = text.set("font-style", "italic");
                }
                document = document.add(text);
            }
        }

        for (compartment, section) in node.compartments().iter().zip(sections.iter().skip(1)) {
            let Compartment::Text(lines) = compartment else {
                continue;
            };
            for (row, line) in lines.iter().enumerate() {
                let position = Point::new(
                    section.min_x() + padding,
                    section.min_y() + padding + (row as f32 + 0.5) * line_height,
                );
                document = document.add(self.text_line(line, position, Anchor::Start));
            }
        }
        document
    }
}
