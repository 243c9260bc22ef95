//! Node box sizing.
//!
//! A node box is a vertical stack of sections: the title, then one section
//! per compartment. Every section spans the full box width.

use trellis_core::{
    geometry::Size,
    model::{Compartment, Node, NodeKind},
    style::Style,
    text::measure_lines,
};

/// Size of a node box and the height of each of its sections.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct NodeShape {
    pub size: Size,
    /// Title first, then one entry per compartment.
    pub sections: Vec<f32>,
}

/// Measures a node. `nested` yields the laid out size of the scope held by
/// the compartment at the given index.
pub(super) fn node_shape(node: &Node, style: &Style, nested: impl Fn(usize) -> Size) -> NodeShape {
    let padding = style.padding();
    let line_height = style.font().line_height();

    if node.compartments().is_empty() {
        if let Some(size) = marker_size(node.kind(), line_height) {
            return NodeShape {
                size,
                sections: vec![size.height()],
            };
        }
    }

    let title = measure_lines(&node.title_lines(), style.font()).inflate(padding);
    let mut sizes = vec![title];
    for (index, compartment) in node.compartments().iter().enumerate() {
        let inner = match compartment {
            Compartment::Text(lines) => measure_lines(lines, style.font()),
            Compartment::Nested(_) => nested(index),
        };
        sizes.push(inner.inflate(padding));
    }

    let width = sizes.iter().map(|size| size.width()).fold(0.0, f32::max);
    let mut sections: Vec<f32> = sizes.iter().map(|size| size.height()).collect();

    if node.compartments().is_empty() {
        match node.kind() {
            NodeKind::Actor => sections[0] += 3.0 * line_height,
            NodeKind::Database => sections[0] += 2.0 * style.padding(),
            NodeKind::UseCase => {
                let width = width * 1.4;
                let height = sections[0] * 1.4;
                return NodeShape {
                    size: Size::new(width, height),
                    sections: vec![height],
                };
            }
            _ => {}
        }
    }

    let width = if node.kind() == NodeKind::Actor {
        width.max(2.0 * line_height)
    } else {
        width
    };

    NodeShape {
        size: Size::new(width, sections.iter().sum()),
        sections,
    }
}

/// Fixed sizes of the kinds drawn as markers.
fn marker_size(kind: NodeKind, line_height: f32) -> Option<Size> {
    match kind {
        NodeKind::Start | NodeKind::End => Some(Size::new(line_height, line_height)),
        NodeKind::Choice => Some(Size::new(2.0 * line_height, 2.0 * line_height)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use trellis_core::model::ScopeId;

    use super::*;

    fn no_nested(_: usize) -> Size {
        Size::default()
    }

    #[test]
    fn test_sections_stack() {
        let style = Style::default();
        let mut node = Node::new("A", ScopeId::Root);
        node.push_compartment(Compartment::Text(vec!["x".to_string(), "y".to_string()]));

        let shape = node_shape(&node, &style, no_nested);
        assert_eq!(shape.sections.len(), 2);
        // One line plus padding, then two lines plus padding.
        assert!(approx_eq!(f32, shape.sections[0], 15.0 + 16.0, epsilon = 0.001));
        assert!(approx_eq!(f32, shape.sections[1], 30.0 + 16.0, epsilon = 0.001));
        assert!(approx_eq!(f32, shape.size.height(), 77.0, epsilon = 0.001));
    }

    #[test]
    fn test_nested_compartment_uses_scope_size() {
        let style = Style::default();
        let mut node = Node::new("P", ScopeId::Root);
        node.push_compartment(Compartment::Nested(Vec::new()));

        let shape = node_shape(&node, &style, |_| Size::new(300.0, 100.0));
        assert!(approx_eq!(f32, shape.size.width(), 316.0, epsilon = 0.001));
        assert!(approx_eq!(f32, shape.sections[1], 116.0, epsilon = 0.001));
    }

    #[test]
    fn test_markers_have_fixed_size() {
        let style = Style::default();
        let mut node = Node::new("go", ScopeId::Root);
        node.set_kind(NodeKind::Start);

        let shape = node_shape(&node, &style, no_nested);
        assert_eq!(shape.size, Size::new(15.0, 15.0));
    }

    #[test]
    fn test_actor_is_taller() {
        let style = Style::default();
        let plain = Node::new("user", ScopeId::Root);
        let mut actor = Node::new("user", ScopeId::Root);
        actor.set_kind(NodeKind::Actor);

        let plain = node_shape(&plain, &style, no_nested);
        let actor = node_shape(&actor, &style, no_nested);
        assert!(approx_eq!(
            f32,
            actor.size.height() - plain.size.height(),
            45.0,
            epsilon = 0.001
        ));
    }
}
