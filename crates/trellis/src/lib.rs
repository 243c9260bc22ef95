//! Trellis - A text-to-diagram compiler for class and flow diagrams.
//!
//! Parsing, layout, and rendering for a compact bracket-based diagram
//! language. Global directives from the [`config`] module are applied
//! before the ones declared in each document.

pub mod config;
pub mod export;
pub mod host;
pub mod layout;

mod error;

pub use trellis_core::{color, directive, geometry, model, style};

pub use error::TrellisError;

use log::{debug, info, trace};

use trellis_core::{
    directive::{DirectiveSet, resolve},
    model::Graph,
    style::Style,
};

use config::AppConfig;
use export::svg::SvgRenderer;
use layout::{LayoutEngine, LayoutResult};

/// A parsed diagram together with its effective directives and style.
#[derive(Debug, Clone)]
pub struct Diagram {
    graph: Graph,
    directives: DirectiveSet,
    style: Style,
}

impl Diagram {
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Directives after merging the global settings with the document.
    pub fn directives(&self) -> &DirectiveSet {
        &self.directives
    }

    pub fn style(&self) -> &Style {
        &self.style
    }
}

/// Builder for parsing and rendering Trellis diagrams.
///
/// # Examples
///
/// ```rust
/// use trellis::{DiagramBuilder, config::AppConfig};
///
/// let source = "[Customer] -> [Order]";
///
/// let builder = DiagramBuilder::new(AppConfig::default());
///
/// // Parse source to a diagram
/// let diagram = builder.parse(source).expect("Failed to parse");
/// assert_eq!(diagram.graph().node_count(), 2);
///
/// // Render the diagram to SVG
/// let svg = builder.render_svg(&diagram);
/// assert!(svg.starts_with("<svg"));
/// ```
#[derive(Debug, Default)]
pub struct DiagramBuilder {
    config: AppConfig,
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration holding the global directives
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Parse source code into a [`Diagram`].
    ///
    /// The global directives come first and the document's own directives
    /// after them, so the document wins on conflicts.
    ///
    /// # Arguments
    ///
    /// * `source` - Trellis source code as a string
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Parse`] for syntax and reference errors.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trellis::{DiagramBuilder, style::Direction};
    ///
    /// let builder = DiagramBuilder::default();
    /// let diagram = builder.parse("#direction: right\n[A] -> [B]").unwrap();
    /// assert_eq!(diagram.style().direction(), Direction::Right);
    /// ```
    pub fn parse(&self, source: &str) -> Result<Diagram, TrellisError> {
        info!("Parsing diagram");

        let document = trellis_parser::parse(source)
            .map_err(|err| TrellisError::new_parse_error(err, source))?;

        let globals = self.config.directives().directives();
        debug!(
            globals = globals.len(),
            declared = document.directives.len();
            "Resolving directives"
        );
        let directives = resolve(globals.into_iter().chain(document.directives));
        let style = Style::from_directives(&directives);
        trace!(style:?; "Resolved style");

        Ok(Diagram {
            graph: document.graph,
            directives,
            style,
        })
    }

    /// Lay out a parsed diagram. Any parsed diagram can be laid out.
    pub fn layout(&self, diagram: &Diagram) -> LayoutResult {
        info!(
            nodes = diagram.graph.node_count(),
            edges = diagram.graph.edge_count();
            "Calculating layout"
        );
        let layout = LayoutEngine::new(&diagram.graph, &diagram.style).layout();
        debug!(
            width = layout.size().width(),
            height = layout.size().height();
            "Layout calculated"
        );
        layout
    }

    /// Render a parsed diagram to an SVG string.
    pub fn render_svg(&self, diagram: &Diagram) -> String {
        let layout = self.layout(diagram);
        let svg = SvgRenderer::new(&diagram.graph, &diagram.style, &layout)
            .render()
            .to_string();
        info!(bytes = svg.len(); "SVG rendered successfully");
        svg
    }

    /// Parse and render in one step.
    ///
    /// # Errors
    ///
    /// Returns the parse error. Nothing is rendered for a source that fails
    /// to parse.
    pub fn render(&self, source: &str) -> Result<String, TrellisError> {
        let diagram = self.parse(source)?;
        Ok(self.render_svg(&diagram))
    }
}
