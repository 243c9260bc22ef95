//! Edge polylines in absolute coordinates.

use trellis_core::geometry::{Bounds, Point};

/// Unit vector from `from` toward `to`, zero when the points coincide.
fn direction(from: Point, to: Point) -> Point {
    let delta = to.sub_point(from);
    let length = delta.hypot();
    if length == 0.0 {
        Point::default()
    } else {
        delta.scale(1.0 / length)
    }
}

/// Moves both ends of a polyline from the node centers onto the node
/// boundaries, then `margin` further along the line.
pub(super) fn clip(points: &mut [Point], source: Bounds, target: Bounds, margin: f32) {
    let count = points.len();
    if count < 2 {
        return;
    }

    let start = source.boundary_toward(points[1]);
    points[0] = start.add_point(direction(start, points[1]).scale(margin));

    let end = target.boundary_toward(points[count - 2]);
    points[count - 1] = end.add_point(direction(end, points[count - 2]).scale(margin));
}

/// A rectangular loop on the right side of a node.
pub(super) fn self_loop(bounds: Bounds, reach: f32) -> Vec<Point> {
    let center = bounds.center();
    let quarter = bounds.height() / 4.0;
    let right = bounds.max_x();
    vec![
        Point::new(right, center.y() - quarter),
        Point::new(right + reach, center.y() - quarter),
        Point::new(right + reach, center.y() + quarter),
        Point::new(right, center.y() + quarter),
    ]
}

/// A straight segment from the `outer` boundary to the boundary of the
/// enclosed `inner` box, on the line through both centers.
pub(super) fn containment(outer: Bounds, inner: Bounds) -> Vec<Point> {
    let mut away = direction(outer.center(), inner.center());
    if away == Point::default() {
        away = Point::new(0.0, 1.0);
    }

    let reach = |bounds: Bounds| {
        let far = bounds
            .center()
            .add_point(away.scale(bounds.width() + bounds.height()));
        bounds.boundary_toward(far)
    };
    vec![reach(outer), reach(inner)]
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use trellis_core::geometry::Size;

    use super::*;

    fn square(x: f32, y: f32) -> Bounds {
        Bounds::new_from_center(Point::new(x, y), Size::new(20.0, 20.0))
    }

    #[test]
    fn test_clip_to_boundaries() {
        let mut points = [Point::new(0.0, 0.0), Point::new(0.0, 100.0)];
        clip(&mut points, square(0.0, 0.0), square(0.0, 100.0), 0.0);
        assert!(approx_eq!(f32, points[0].y(), 10.0, epsilon = 0.001));
        assert!(approx_eq!(f32, points[1].y(), 90.0, epsilon = 0.001));
    }

    #[test]
    fn test_clip_with_margin() {
        let mut points = [Point::new(0.0, 0.0), Point::new(0.0, 50.0), Point::new(0.0, 100.0)];
        clip(&mut points, square(0.0, 0.0), square(0.0, 100.0), 5.0);
        assert!(approx_eq!(f32, points[0].y(), 15.0, epsilon = 0.001));
        assert!(approx_eq!(f32, points[1].y(), 50.0, epsilon = 0.001));
        assert!(approx_eq!(f32, points[2].y(), 85.0, epsilon = 0.001));
    }

    #[test]
    fn test_self_loop_right_of_node() {
        let points = self_loop(square(0.0, 0.0), 20.0);
        assert_eq!(points.len(), 4);
        assert!(approx_eq!(f32, points[0].x(), 10.0, epsilon = 0.001));
        assert!(approx_eq!(f32, points[1].x(), 30.0, epsilon = 0.001));
        assert!(points.iter().all(|point| point.x() >= 10.0));
    }

    #[test]
    fn test_containment_segment() {
        let outer = Bounds::new_from_center(Point::new(0.0, 0.0), Size::new(100.0, 100.0));
        let inner = square(0.0, 20.0);
        let points = containment(outer, inner);
        assert!(approx_eq!(f32, points[0].y(), 50.0, epsilon = 0.001));
        assert!(approx_eq!(f32, points[1].y(), 30.0, epsilon = 0.001));
    }
}
