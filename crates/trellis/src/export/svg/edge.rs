//! Edge paths, arrowheads and end labels.

use svg::{Document, node::element as svg_element, node::element::path::Data};

use trellis_core::{
    apply_stroke,
    draw::StrokeDefinition,
    geometry::Point,
    model::{ArrowHead, Edge, EdgeIndex, LineStyle},
    style::Corners,
};

use super::{Anchor, SvgRenderer};

/// Arrowhead length and half width, in units of `spacing * arrowSize / 30`.
const HEAD_LENGTH: f32 = 10.0;
const HEAD_HALF_WIDTH: f32 = 5.0;

/// Unit vector from `from` toward `to`, or straight down for coincident points.
fn direction(from: Point, to: Point) -> Point {
    let delta = to.sub_point(from);
    let length = delta.hypot();
    if length > f32::EPSILON {
        delta.scale(1.0 / length)
    } else {
        Point::new(0.0, 1.0)
    }
}

/// Path data through `points`, with quadratic corners when `bend` is
/// positive. `bend` is the fraction of each adjacent segment the curve uses.
fn path_data(points: &[Point], bend: f32) -> Data {
    let Some((first, rest)) = points.split_first() else {
        return Data::new();
    };
    let mut data = Data::new().move_to((first.x(), first.y()));

    if bend <= 0.0 || points.len() < 3 {
        for point in rest {
            data = data.line_to((point.x(), point.y()));
        }
        return data;
    }

    for window in points.windows(3) {
        let (prev, corner, next) = (window[0], window[1], window[2]);
        let enter = corner.lerp(prev, bend);
        let exit = corner.lerp(next, bend);
        data = data
            .line_to((enter.x(), enter.y()))
            .quadratic_curve_to((corner.x(), corner.y(), exit.x(), exit.y()));
    }
    if let Some(last) = points.last() {
        data = data.line_to((last.x(), last.y()));
    }
    data
}

impl SvgRenderer<'_> {
    pub(super) fn render_edge(
        &self,
        mut document: Document,
        index: EdgeIndex,
        edge: &Edge,
    ) -> Document {
        let points = self.layout.edge(index).points();
        let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
            return document;
        };
        if points.len() < 2 {
            return document;
        }

        let relation = edge.relation();
        let stroke = match relation.line() {
            LineStyle::Dashed => {
                StrokeDefinition::dashed(self.style.stroke(), self.style.line_width())
            }
            LineStyle::Solid | LineStyle::Hidden => self.stroke(),
        };
        let bend = match self.style.corners() {
            Corners::Rounded => self.style.bend_size() / 2.0,
            Corners::Hard => 0.0,
        };

        document = document.add(apply_stroke!(
            svg_element::Path::new()
                .set("class", "edge")
                .set("fill", "none")
                .set("d", path_data(points, bend)),
            &stroke
        ));

        let solid = self.stroke();
        let toward_start = direction(points[1], first);
        let toward_end = direction(points[points.len() - 2], last);
        if let Some(head) = self.arrowhead(relation.start(), first, toward_start, &solid) {
            document = document.add(head);
        }
        if let Some(head) = self.arrowhead(relation.end(), last, toward_end, &solid) {
            document = document.add(head);
        }

        document = self.end_label(document, edge.start_label(), first, toward_start);
        self.end_label(document, edge.end_label(), last, toward_end)
    }

    /// The polygon of one arrowhead whose tip sits at `tip`, pointing along
    /// `heading`.
    fn arrowhead(
        &self,
        head: ArrowHead,
        tip: Point,
        heading: Point,
        stroke: &StrokeDefinition,
    ) -> Option<svg_element::Polygon> {
        let unit = self.style.spacing() * self.style.arrow_size() / 30.0;
        let back = heading.scale(-HEAD_LENGTH * unit);
        let side = Point::new(-heading.y(), heading.x()).scale(HEAD_HALF_WIDTH * unit);
        let base = tip.add_point(back);

        let (outline, filled) = match head {
            ArrowHead::None => return None,
            ArrowHead::Arrow => (
                vec![
                    tip,
                    base.add_point(side),
                    tip.add_point(back.scale(0.5)),
                    base.sub_point(side),
                ],
                self.style.fill_arrows(),
            ),
            ArrowHead::Triangle => (
                vec![tip, base.add_point(side), base.sub_point(side)],
                self.style.fill_arrows(),
            ),
            ArrowHead::Diamond | ArrowHead::HollowDiamond => (
                vec![
                    tip,
                    base.add_point(side),
                    tip.add_point(back.scale(2.0)),
                    base.sub_point(side),
                ],
                head == ArrowHead::Diamond,
            ),
        };

        let fill = if filled {
            self.style.stroke().to_string()
        } else {
            self.canvas_fill()
        };
        let points = outline
            .iter()
            .map(|point| format!("{},{}", point.x(), point.y()))
            .collect::<Vec<_>>()
            .join(" ");

        Some(apply_stroke!(
            svg_element::Polygon::new().set("points", points).set("fill", fill),
            stroke
        ))
    }

    /// Places an end label just beside the edge, a little way from the node.
    fn end_label(&self, document: Document, label: &str, end: Point, heading: Point) -> Document {
        if label.is_empty() {
            return document;
        }
        let line_height = self.style.font().line_height();
        let padding = self.style.padding();
        let mut document = document;
        let along = heading.scale(-line_height);
        for (row, line) in label.lines().enumerate() {
            let position = end
                .add_point(along)
                .add_point(Point::new(padding / 2.0, row as f32 * line_height));
            document = document.add(self.text_line(line, position, Anchor::Start));
        }
        document
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    #[test]
    fn test_direction_is_unit_length() {
        let heading = direction(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert!(approx_eq!(f32, heading.hypot(), 1.0, epsilon = 1e-5));
        assert!(approx_eq!(f32, heading.x(), 0.6, epsilon = 1e-5));
    }

    #[test]
    fn test_direction_of_coincident_points() {
        let heading = direction(Point::new(5.0, 5.0), Point::new(5.0, 5.0));
        assert_eq!(heading, Point::new(0.0, 1.0));
    }

    #[test]
    fn test_straight_path_has_no_curves() {
        let points = [Point::new(0.0, 0.0), Point::new(0.0, 10.0), Point::new(10.0, 10.0)];
        let data = path_data(&points, 0.0);
        let rendered = svg_element::Path::new().set("d", data).to_string();
        assert!(!rendered.contains('Q') && !rendered.contains('q'));
    }

    #[test]
    fn test_rounded_path_curves_at_corners() {
        let points = [Point::new(0.0, 0.0), Point::new(0.0, 10.0), Point::new(10.0, 10.0)];
        let data = path_data(&points, 0.15);
        let rendered = svg_element::Path::new().set("d", data).to_string();
        assert_eq!(rendered.matches('Q').count(), 1);
    }
}
