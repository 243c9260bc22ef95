//! Glue for embedding Trellis in a host application as a code-block
//! processor.
//!
//! A host exposes a single registration call. [`DiagramPlugin`] registers a
//! handler for `nomnoml` blocks that renders the block with the configured
//! global directives and writes the wrapped SVG into the output sink, or
//! leaves the sink empty when the block fails to render.
//!
//! ```
//! use trellis::{config::AppConfig, host::{DiagramPlugin, InMemoryHost}};
//!
//! let mut host = InMemoryHost::new();
//! DiagramPlugin::new(AppConfig::default()).on_load(&mut host);
//!
//! let html = host.process("nomnoml", "[A] -> [B]").unwrap();
//! assert!(html.starts_with("<div class=\"nomnoml-diagram-container\"><svg"));
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::{DiagramBuilder, config::AppConfig};

/// Language tag of the code blocks handled by [`DiagramPlugin`].
pub const CODE_BLOCK_LANGUAGE: &str = "nomnoml";

/// Class of the element wrapping every rendered diagram.
pub const CONTAINER_CLASS: &str = "nomnoml-diagram-container";

/// Handler invoked with a code block's source and the sink receiving its
/// markup.
pub type CodeBlockHandler = Box<dyn Fn(&str, &mut String) + Send + Sync>;

/// The registration surface a host application offers to plugins.
pub trait CodeBlockHost {
    fn register_code_block_processor(&mut self, language: &str, handler: CodeBlockHandler);
}

/// Renders diagram code blocks inside a host.
pub struct DiagramPlugin {
    builder: Arc<DiagramBuilder>,
}

impl DiagramPlugin {
    pub fn new(config: AppConfig) -> Self {
        Self {
            builder: Arc::new(DiagramBuilder::new(config)),
        }
    }

    /// Registers the code-block processor with `host`.
    pub fn on_load(&self, host: &mut impl CodeBlockHost) {
        info!(language = CODE_BLOCK_LANGUAGE; "Loading diagram plugin");
        let builder = Arc::clone(&self.builder);
        host.register_code_block_processor(
            CODE_BLOCK_LANGUAGE,
            Box::new(move |source, sink| render_block(&builder, source, sink)),
        );
    }
}

fn render_block(builder: &DiagramBuilder, source: &str, sink: &mut String) {
    sink.clear();
    match builder.render(source) {
        Ok(svg) => {
            sink.push_str(&format!("<div class=\"{CONTAINER_CLASS}\">"));
            sink.push_str(&svg);
            sink.push_str("</div>");
        }
        Err(err) => warn!(err:%; "Failed to render code block"),
    }
}

/// A host that keeps its processors in memory, for tests and batch use.
#[derive(Default)]
pub struct InMemoryHost {
    processors: IndexMap<String, CodeBlockHandler>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the processor registered for `language`, returning the markup
    /// it wrote, or `None` when no processor handles the language.
    pub fn process(&self, language: &str, source: &str) -> Option<String> {
        let handler = self.processors.get(language)?;
        let mut sink = String::new();
        handler(source, &mut sink);
        Some(sink)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.processors.keys().map(String::as_str)
    }
}

impl CodeBlockHost for InMemoryHost {
    fn register_code_block_processor(&mut self, language: &str, handler: CodeBlockHandler) {
        debug!(language; "Registering code block processor");
        self.processors.insert(language.to_string(), handler);
    }
}

#[cfg(test)]
mod tests {
    use crate::{color::Color, config::Settings};

    use super::*;

    fn loaded(config: AppConfig) -> InMemoryHost {
        let mut host = InMemoryHost::new();
        DiagramPlugin::new(config).on_load(&mut host);
        host
    }

    #[test]
    fn test_registers_single_language() {
        let host = loaded(AppConfig::default());
        assert_eq!(host.languages().collect::<Vec<_>>(), vec![CODE_BLOCK_LANGUAGE]);
        assert!(host.process("mermaid", "[A]").is_none());
    }

    #[test]
    fn test_renders_wrapped_svg() {
        let host = loaded(AppConfig::default());
        let html = host.process(CODE_BLOCK_LANGUAGE, "[A] -> [B]").unwrap();
        assert!(html.starts_with("<div class=\"nomnoml-diagram-container\">"));
        assert!(html.contains("</svg>"));
        assert!(html.ends_with("</div>"));
        assert_eq!(html.matches("class=\"node\"").count(), 2);
    }

    #[test]
    fn test_failure_leaves_sink_empty() {
        let host = loaded(AppConfig::default());
        assert_eq!(host.process(CODE_BLOCK_LANGUAGE, "[A] ->").as_deref(), Some(""));
    }

    #[test]
    fn test_oversized_gutter_still_renders() {
        let host = loaded(AppConfig::default());
        let html = host
            .process(CODE_BLOCK_LANGUAGE, "#gutter: 3e38\n#fontSize: 1e30\n[A]->[B]")
            .unwrap();
        assert_eq!(html.matches("class=\"node\"").count(), 2);
    }

    #[test]
    fn test_global_directives_apply() {
        let settings = Settings::default().merged([("background", "#123456")]);
        let global = Color::new("#123456").unwrap().to_string();
        let declared = Color::new("#abcdef").unwrap().to_string();
        let host = loaded(AppConfig::new(settings));

        let html = host.process(CODE_BLOCK_LANGUAGE, "[A]").unwrap();
        assert!(html.contains(&global));

        let html = host
            .process(CODE_BLOCK_LANGUAGE, "#background: #abcdef\n[A]")
            .unwrap();
        assert!(html.contains(&declared));
        assert!(!html.contains(&global));
    }
}
