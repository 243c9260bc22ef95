//! Points, sizes and boxes in diagram space.
//!
//! Coordinates follow SVG: `x` grows to the right and `y` grows downward.
//! Layout always works top-to-bottom; a `direction: right` diagram is the
//! transposed result.

/// A position on the canvas.
///
/// ```
/// # use trellis_core::geometry::Point;
/// let tail = Point::new(0.0, 0.0);
/// let head = Point::new(30.0, 40.0);
///
/// assert_eq!(head.sub_point(tail).hypot(), 50.0);
/// assert_eq!(tail.lerp(head, 0.5), Point::new(15.0, 20.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }

    /// Swaps the axes, turning a top-to-bottom position into a left-to-right one.
    pub fn transpose(self) -> Self {
        Self::new(self.y, self.x)
    }

    pub fn add_point(self, other: Point) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub_point(self, other: Point) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Length of the vector from the origin.
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Walks `t` of the way toward `other`. Edge corners are rounded by
    /// cutting each leg at `t = bendSize`.
    pub fn lerp(self, other: Point, t: f32) -> Self {
        self.add_point(other.sub_point(self).scale(t))
    }
}

/// Width and height of a node, a section or the whole canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }

    /// Grows both dimensions by `amount` on each side, the way node padding
    /// wraps measured text.
    pub fn inflate(self, amount: f32) -> Self {
        Self::new(self.width + 2.0 * amount, self.height + 2.0 * amount)
    }

    pub fn transpose(self) -> Self {
        Self::new(self.height, self.width)
    }

    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// An axis-aligned box, stored as its two extreme corners.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    pub fn new_from_center(center: Point, size: Size) -> Self {
        Self::new_from_top_left(
            Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0),
            size,
        )
    }

    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    pub fn min_x(self) -> f32 {
        self.min_x
    }

    pub fn min_y(self) -> f32 {
        self.min_y
    }

    pub fn max_x(self) -> f32 {
        self.max_x
    }

    pub fn max_y(self) -> f32 {
        self.max_y
    }

    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Pushes every side outward by `amount`.
    pub fn inflate(self, amount: f32) -> Self {
        Self {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
        }
    }

    /// Whether `other` fits inside, touching sides included.
    ///
    /// ```
    /// # use trellis_core::geometry::{Bounds, Point, Size};
    /// let package = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 100.0));
    /// let class = Bounds::new_from_top_left(Point::new(10.0, 10.0), Size::new(20.0, 20.0));
    /// assert!(package.contains(&class));
    /// assert!(!class.contains(&package));
    /// ```
    pub fn contains(&self, other: &Self) -> bool {
        other.min_x >= self.min_x
            && other.min_y >= self.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }

    /// Point where the ray from the center toward `external` crosses the
    /// border. Edges are clipped here before `edgeMargin` is applied.
    ///
    /// A point already inside the box is returned unchanged.
    pub fn boundary_toward(&self, external: Point) -> Point {
        let center = self.center();
        let delta = external.sub_point(center);
        let half_width = self.width() / 2.0;
        let half_height = self.height() / 2.0;

        if delta.x.abs() <= half_width && delta.y.abs() <= half_height {
            return external;
        }

        let reach = |half: f32, along: f32| {
            if along == 0.0 {
                f32::INFINITY
            } else {
                half / along.abs()
            }
        };

        let factor = reach(half_width, delta.x).min(reach(half_height, delta.y));
        center.add_point(delta.scale(factor))
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn unit_box() -> Bounds {
        Bounds::new_from_center(Point::new(0.0, 0.0), Size::new(20.0, 10.0))
    }

    #[test]
    fn test_right_direction_swaps_axes() {
        let point = Point::new(3.0, 7.0).transpose();
        assert_approx_eq!(f32, point.x(), 7.0);
        assert_approx_eq!(f32, point.y(), 3.0);

        let size = Size::new(120.0, 40.0).transpose();
        assert_approx_eq!(f32, size.width(), 40.0);
        assert_approx_eq!(f32, size.height(), 120.0);
    }

    #[test]
    fn test_padding_wraps_text() {
        let size = Size::new(10.0, 20.0).inflate(8.0);
        assert_approx_eq!(f32, size.width(), 26.0);
        assert_approx_eq!(f32, size.height(), 36.0);
    }

    #[test]
    fn test_clip_to_side() {
        let hit = unit_box().boundary_toward(Point::new(100.0, 0.0));
        assert_approx_eq!(f32, hit.x(), 10.0);
        assert_approx_eq!(f32, hit.y(), 0.0);
    }

    #[test]
    fn test_clip_to_top() {
        let hit = unit_box().boundary_toward(Point::new(0.0, -50.0));
        assert_approx_eq!(f32, hit.x(), 0.0);
        assert_approx_eq!(f32, hit.y(), -5.0);
    }

    #[test]
    fn test_clip_inside_point_is_unchanged() {
        let inside = Point::new(1.0, 1.0);
        assert_eq!(unit_box().boundary_toward(inside), inside);
    }

    fn bounds_strategy() -> impl Strategy<Value = Bounds> {
        (-500.0f32..500.0, -500.0f32..500.0, 1.0f32..200.0, 1.0f32..200.0).prop_map(
            |(x, y, w, h)| Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h)),
        )
    }

    proptest! {
        #[test]
        fn prop_clip_lands_on_border(
            b in bounds_strategy(),
            dx in -1000.0f32..1000.0,
            dy in -1000.0f32..1000.0,
        ) {
            let external = b.center().add_point(Point::new(dx, dy));
            let hit = b.boundary_toward(external);
            let tolerance = 0.01;
            let dot = |point: Point| Bounds::new_from_center(point, Size::default());
            prop_assert!(b.inflate(tolerance).contains(&dot(hit)));

            let near = |value: f32, side: f32| (value - side).abs() < tolerance;
            let on_side = near(hit.x(), b.min_x()) || near(hit.x(), b.max_x());
            let on_cap = near(hit.y(), b.min_y()) || near(hit.y(), b.max_y());
            prop_assert!(b.contains(&dot(external)) || on_side || on_cap);
        }
    }
}
