//! Trellis Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Trellis parser,
//! layout engine and renderer:
//!
//! - **Colors**: CSS color parsing ([`color::Color`])
//! - **Geometry**: points, sizes, bounds and insets ([`geometry`] module)
//! - **Directives**: `#key: value` settings and their resolution ([`directive`] module)
//! - **Style**: the typed view of resolved directives ([`style::Style`])
//! - **Model**: the arena-backed diagram graph ([`model`] module)
//! - **Text**: label measurement ([`text`] module)
//! - **Draw**: stroke definitions ([`draw`] module)

pub mod color;
pub mod directive;
pub mod draw;
pub mod error;
pub mod geometry;
pub mod model;
pub mod style;
pub mod text;
