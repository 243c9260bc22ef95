//! Coordinate assignment for an ordered layering.
//!
//! Works in the top-down frame: layers stack along `y`, neighbours within a
//! layer along `x`. Callers transpose sizes and results for `direction: right`.

use trellis_core::geometry::{Point, Size};

use super::order::{Layering, Vertex};

const ALIGN_ITERATIONS: usize = 8;

/// Spacing parameters of one scope.
#[derive(Debug, Clone, Copy)]
pub(super) struct Spacing {
    /// Gap between layers.
    pub gutter: f32,
    /// Gap between two nodes of one layer; halved next to virtual vertices.
    pub spacing: f32,
    pub gravity: f32,
}

/// Vertex centers and the extent they cover, with the top-left corner at
/// the origin.
#[derive(Debug, Clone)]
pub(super) struct Placement {
    pub centers: Vec<Point>,
    pub size: Size,
}

pub(super) fn place(layering: &Layering, sizes: &[Size], spacing: Spacing) -> Placement {
    if layering.vertices.is_empty() {
        return Placement {
            centers: Vec::new(),
            size: Size::default(),
        };
    }

    let ys = layer_centers(layering, sizes, spacing.gutter);
    let xs = cross_positions(layering, sizes, spacing);

    let left = (0..sizes.len())
        .map(|vertex| xs[vertex] - sizes[vertex].width() / 2.0)
        .fold(f32::INFINITY, f32::min);
    let right = (0..sizes.len())
        .map(|vertex| xs[vertex] + sizes[vertex].width() / 2.0)
        .fold(f32::NEG_INFINITY, f32::max);
    let bottom = (0..sizes.len())
        .map(|vertex| ys[layering.layer_of[vertex]] + sizes[vertex].height() / 2.0)
        .fold(0.0, f32::max);

    let centers = (0..sizes.len())
        .map(|vertex| Point::new(xs[vertex] - left, ys[layering.layer_of[vertex]]))
        .collect();

    Placement {
        centers,
        size: Size::new(right - left, bottom),
    }
}

/// Center line of every layer; each layer is as thick as its tallest member.
fn layer_centers(layering: &Layering, sizes: &[Size], gutter: f32) -> Vec<f32> {
    let mut top = 0.0;
    layering
        .layers
        .iter()
        .map(|layer| {
            let thickness = layer
                .iter()
                .map(|&vertex| sizes[vertex].height())
                .fold(0.0, f32::max);
            let center = top + thickness / 2.0;
            top += thickness + gutter;
            center
        })
        .collect()
}

/// Minimal center distance between two neighbours of one layer.
fn separation(layering: &Layering, sizes: &[Size], spacing: f32, a: usize, b: usize) -> f32 {
    let both_nodes = matches!(layering.vertices[a], Vertex::Node(_))
        && matches!(layering.vertices[b], Vertex::Node(_));
    let gap = if both_nodes { spacing } else { spacing / 2.0 };
    (sizes[a].width() + sizes[b].width()) / 2.0 + gap
}

/// Places every layer left to right, then repeatedly moves vertices toward
/// the mean of their neighbours while a `gravity` share of the move pulls
/// them toward the centerline `x = 0`.
fn cross_positions(layering: &Layering, sizes: &[Size], spacing: Spacing) -> Vec<f32> {
    let mut neighbours = vec![Vec::new(); layering.vertices.len()];
    for (top, bottom) in layering.segments() {
        neighbours[top].push(bottom);
        neighbours[bottom].push(top);
    }

    let mut xs = vec![0.0; layering.vertices.len()];
    for layer in &layering.layers {
        let desired = vec![0.0; layer.len()];
        settle(layering, sizes, spacing.spacing, layer, &desired, &mut xs);
    }

    let pull = (spacing.gravity * 0.05).clamp(0.0, 1.0);
    for iteration in 0..ALIGN_ITERATIONS {
        let order: Vec<&Vec<usize>> = if iteration % 2 == 0 {
            layering.layers.iter().collect()
        } else {
            layering.layers.iter().rev().collect()
        };

        for layer in order {
            let desired: Vec<f32> = layer
                .iter()
                .map(|&vertex| {
                    let adjacent = &neighbours[vertex];
                    let target = if adjacent.is_empty() {
                        xs[vertex]
                    } else {
                        adjacent.iter().map(|&other| xs[other]).sum::<f32>() / adjacent.len() as f32
                    };
                    target * (1.0 - pull)
                })
                .collect();
            settle(layering, sizes, spacing.spacing, layer, &desired, &mut xs);
        }
    }

    xs
}

/// Moves the vertices of `layer` as close to `desired` as the separation
/// constraints allow, keeping their order.
fn settle(
    layering: &Layering,
    sizes: &[Size],
    spacing: f32,
    layer: &[usize],
    desired: &[f32],
    xs: &mut [f32],
) {
    let Some(&first) = layer.first() else {
        return;
    };

    xs[first] = desired[0];
    for i in 1..layer.len() {
        let gap = separation(layering, sizes, spacing, layer[i - 1], layer[i]);
        let minimum = xs[layer[i - 1]] + gap;
        xs[layer[i]] = desired[i].max(minimum);
    }

    let drift = layer
        .iter()
        .zip(desired)
        .map(|(&vertex, &want)| xs[vertex] - want)
        .sum::<f32>()
        / layer.len() as f32;
    for &vertex in layer {
        xs[vertex] -= drift;
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    const SPACING: Spacing = Spacing {
        gutter: 20.0,
        spacing: 40.0,
        gravity: 1.0,
    };

    #[test]
    fn test_single_layer_respects_spacing() {
        let layering = Layering::new(&[0, 0], &[]);
        let sizes = [Size::new(60.0, 30.0), Size::new(40.0, 20.0)];
        let placement = place(&layering, &sizes, SPACING);

        let gap = (placement.centers[1].x() - 20.0) - (placement.centers[0].x() + 30.0);
        assert!(approx_eq!(f32, gap, 40.0, epsilon = 0.001));
        assert!(approx_eq!(f32, placement.size.width(), 140.0, epsilon = 0.001));
        assert!(approx_eq!(f32, placement.size.height(), 30.0, epsilon = 0.001));
    }

    #[test]
    fn test_gravity_pulls_toward_centerline() {
        // v0 sits above v2 only; v1 shares the lower layer.
        let layering = Layering::new(&[0, 1, 1], &[(0, 2)]);
        let sizes = [Size::new(20.0, 20.0); 3];
        let offset = |gravity: f32| {
            let placement = place(&layering, &sizes, Spacing { gravity, ..SPACING });
            (placement.centers[0].x() - placement.centers[2].x()).abs()
        };

        assert!(approx_eq!(f32, offset(0.0), 0.0, epsilon = 0.001));
        assert!(approx_eq!(f32, offset(20.0), 30.0, epsilon = 0.001));
    }

    #[test]
    fn test_layers_are_separated_by_gutter() {
        let layering = Layering::new(&[0, 1], &[(0, 1)]);
        let sizes = [Size::new(50.0, 30.0), Size::new(50.0, 10.0)];
        let placement = place(&layering, &sizes, SPACING);

        assert!(approx_eq!(f32, placement.centers[0].y(), 15.0, epsilon = 0.001));
        assert!(approx_eq!(f32, placement.centers[1].y(), 55.0, epsilon = 0.001));
        assert!(approx_eq!(f32, placement.size.height(), 60.0, epsilon = 0.001));
    }

    #[test]
    fn test_chain_is_aligned() {
        let layering = Layering::new(&[0, 1, 2], &[(0, 1), (1, 2)]);
        let sizes = [Size::new(50.0, 20.0); 3];
        let placement = place(&layering, &sizes, SPACING);

        for center in &placement.centers {
            assert!(approx_eq!(f32, center.x(), 25.0, epsilon = 0.001));
        }
    }

    #[test]
    fn test_empty_scope() {
        let layering = Layering::new(&[], &[]);
        let placement = place(&layering, &[], SPACING);
        assert!(placement.centers.is_empty());
        assert!(placement.size.is_zero());
    }
}
