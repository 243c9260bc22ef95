//! Strokes for node outlines, compartment separators and edges.
//!
//! [`apply_stroke!`](crate::apply_stroke!) writes a [`StrokeDefinition`] onto
//! any SVG element:
//!
//! ```
//! use svg::node::element as svg_element;
//! use trellis_core::{color::Color, draw::StrokeDefinition};
//!
//! let stroke = StrokeDefinition::dashed(Color::new("#33322E").unwrap(), 3.0);
//! let dependency = trellis_core::apply_stroke!(svg_element::Path::new(), &stroke);
//! assert!(dependency.to_string().contains("stroke-dasharray"));
//! ```

use crate::color::Color;

/// Solid for associations, dashed for dependencies and realizations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
}

impl StrokeStyle {
    pub fn to_svg_value(self) -> Option<&'static str> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("6,6"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeDefinition {
    color: Color,
    width: f32,
    style: StrokeStyle,
}

impl StrokeDefinition {
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            style: StrokeStyle::Solid,
        }
    }

    pub fn dashed(color: Color, width: f32) -> Self {
        Self {
            style: StrokeStyle::Dashed,
            ..Self::solid(color, width)
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }
}

/// Sets color, opacity, width and dash pattern. Caps and joins are always
/// round so thick `lineWidth` values meet cleanly at bends.
#[macro_export]
macro_rules! apply_stroke {
    ($element:expr, $stroke:expr) => {{
        let mut elem = $element
            .set("stroke", $stroke.color().to_string())
            .set("stroke-opacity", $stroke.color().alpha())
            .set("stroke-width", $stroke.width())
            .set("stroke-linecap", "round")
            .set("stroke-linejoin", "round");

        if let Some(dasharray) = $stroke.style().to_svg_value() {
            elem = elem.set("stroke-dasharray", dasharray);
        }

        elem
    }};
}

#[cfg(test)]
mod tests {
    use svg::node::element as svg_element;

    use super::*;

    fn ink() -> Color {
        Color::new("#33322E").unwrap()
    }

    #[test]
    fn test_dashed_stroke() {
        let stroke = StrokeDefinition::dashed(ink(), 3.0);
        let path = crate::apply_stroke!(svg_element::Path::new(), &stroke).to_string();
        assert!(path.contains("stroke-width=\"3\""));
        assert!(path.contains("stroke-dasharray=\"6,6\""));
        assert!(path.contains("stroke-linejoin=\"round\""));
    }

    #[test]
    fn test_solid_stroke_has_no_dasharray() {
        let stroke = StrokeDefinition::solid(ink(), 1.0);
        let path = crate::apply_stroke!(svg_element::Path::new(), &stroke).to_string();
        assert!(!path.contains("stroke-dasharray"));
        assert_eq!(stroke.style(), StrokeStyle::Solid);
    }
}
