//! Output formats for laid out diagrams.
//!
//! Only SVG is produced. Rendering works on a finished [`LayoutResult`] and
//! cannot fail: values that survived style resolution are always drawable.
//!
//! [`LayoutResult`]: crate::layout::LayoutResult

pub mod svg;
