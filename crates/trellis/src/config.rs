//! Configuration types for Trellis diagram rendering.
//!
//! Global directives are configured once and prepended to every diagram,
//! the way a host application applies its plugin settings. Document
//! directives still override them.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration.
//! - [`Settings`] - One value per recognized directive, plus pass-through extras.
//!
//! # Example
//!
//! ```
//! # use trellis::config::AppConfig;
//! let config: AppConfig = toml::from_str(
//!     r#"
//!     [directives]
//!     direction = "right"
//!     fillArrows = true
//!     zoom = "2"
//!     "#,
//! )
//! .unwrap();
//!
//! let lines: Vec<String> = config
//!     .directives()
//!     .directives()
//!     .iter()
//!     .map(ToString::to_string)
//!     .collect();
//! assert_eq!(lines[0], "#direction: right");
//! assert!(lines.contains(&"#fillArrows: true".to_string()));
//! assert_eq!(lines.last().map(String::as_str), Some("#zoom: 2"));
//! ```

use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use trellis_core::{
    directive::{Directive, DirectiveKey},
    error::ConfigurationError,
};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    /// Global directive settings.
    #[serde(default)]
    directives: Settings,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the given directive settings.
    pub fn new(directives: Settings) -> Self {
        Self { directives }
    }

    /// Returns the global directive settings.
    pub fn directives(&self) -> &Settings {
        &self.directives
    }
}

/// Global directive values, keyed like the directives themselves.
///
/// An empty string means "not set": it is never emitted as a directive, so
/// the renderer default applies. `fillArrows` is a real boolean and is
/// always emitted.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    arrow_size: String,
    bend_size: String,
    direction: String,
    gutter: String,
    edge_margin: String,
    gravity: String,
    edges: String,
    background: String,
    fill: String,
    fill_arrows: bool,
    font: String,
    font_size: String,
    leading: String,
    line_width: String,
    padding: String,
    spacing: String,
    stroke: String,
    ranker: String,

    /// Keys that are not recognized directives, passed through unchanged.
    #[serde(flatten)]
    extra: IndexMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            arrow_size: String::new(),
            bend_size: String::new(),
            direction: "down".to_string(),
            gutter: String::new(),
            edge_margin: String::new(),
            gravity: String::new(),
            edges: "rounded".to_string(),
            background: "#ffffff".to_string(),
            fill: String::new(),
            fill_arrows: false,
            font: String::new(),
            font_size: String::new(),
            leading: String::new(),
            line_width: String::new(),
            padding: String::new(),
            spacing: String::new(),
            stroke: String::new(),
            ranker: "network-simplex".to_string(),
            extra: IndexMap::new(),
        }
    }
}

impl Settings {
    /// Returns a copy with `overrides` applied on top.
    ///
    /// Keys may carry a leading `#`. Unrecognized keys are kept as extras.
    /// A `fillArrows` value other than `true` or `false` is ignored with a
    /// warning.
    ///
    /// ```
    /// # use trellis::config::Settings;
    /// # use trellis_core::directive::DirectiveKey;
    /// let settings = Settings::default().merged([("#stroke", "#333"), ("direction", "right")]);
    /// assert_eq!(settings.get(DirectiveKey::Stroke), "#333");
    /// assert_eq!(settings.get(DirectiveKey::Direction), "right");
    /// ```
    pub fn merged<I, K, V>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut settings = self.clone();
        for (key, value) in overrides {
            let key = key.as_ref().trim();
            let key = key.strip_prefix('#').unwrap_or(key).trim();
            let value = value.as_ref().trim();

            match key.parse::<DirectiveKey>() {
                Ok(DirectiveKey::FillArrows) => match value {
                    "true" => settings.fill_arrows = true,
                    "false" => settings.fill_arrows = false,
                    _ => {
                        let err = ConfigurationError::InvalidBool {
                            key: DirectiveKey::FillArrows.as_str(),
                            value: value.to_string(),
                        };
                        warn!(err:%; "Ignoring setting");
                    }
                },
                Ok(known) => {
                    if let Some(slot) = settings.slot_mut(known) {
                        *slot = value.to_string();
                    }
                }
                Err(()) => {
                    debug!(key; "Keeping unrecognized setting");
                    settings.extra.insert(key.to_string(), value.to_string());
                }
            }
        }
        settings
    }

    /// The configured value of a recognized directive, empty when unset.
    pub fn get(&self, key: DirectiveKey) -> String {
        match key {
            DirectiveKey::FillArrows => self.fill_arrows.to_string(),
            _ => self.slot(key).cloned().unwrap_or_default(),
        }
    }

    pub fn fill_arrows(&self) -> bool {
        self.fill_arrows
    }

    /// Unrecognized settings, in declaration order.
    pub fn extra(&self) -> &IndexMap<String, String> {
        &self.extra
    }

    /// The settings as directives: every non-empty value in canonical key
    /// order, then the extras.
    pub fn directives(&self) -> Vec<Directive> {
        let known = DirectiveKey::ALL
            .into_iter()
            .map(|key| (key.as_str().to_string(), self.get(key)));
        let extra = self
            .extra
            .iter()
            .map(|(key, value)| (key.clone(), value.trim().to_string()));

        known
            .chain(extra)
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| Directive::new(key, value))
            .collect()
    }

    fn slot(&self, key: DirectiveKey) -> Option<&String> {
        Some(match key {
            DirectiveKey::ArrowSize => &self.arrow_size,
            DirectiveKey::BendSize => &self.bend_size,
            DirectiveKey::Direction => &self.direction,
            DirectiveKey::Gutter => &self.gutter,
            DirectiveKey::EdgeMargin => &self.edge_margin,
            DirectiveKey::Gravity => &self.gravity,
            DirectiveKey::Edges => &self.edges,
            DirectiveKey::Background => &self.background,
            DirectiveKey::Fill => &self.fill,
            DirectiveKey::FillArrows => return None,
            DirectiveKey::Font => &self.font,
            DirectiveKey::FontSize => &self.font_size,
            DirectiveKey::Leading => &self.leading,
            DirectiveKey::LineWidth => &self.line_width,
            DirectiveKey::Padding => &self.padding,
            DirectiveKey::Spacing => &self.spacing,
            DirectiveKey::Stroke => &self.stroke,
            DirectiveKey::Ranker => &self.ranker,
        })
    }

    fn slot_mut(&mut self, key: DirectiveKey) -> Option<&mut String> {
        Some(match key {
            DirectiveKey::ArrowSize => &mut self.arrow_size,
            DirectiveKey::BendSize => &mut self.bend_size,
            DirectiveKey::Direction => &mut self.direction,
            DirectiveKey::Gutter => &mut self.gutter,
            DirectiveKey::EdgeMargin => &mut self.edge_margin,
            DirectiveKey::Gravity => &mut self.gravity,
            DirectiveKey::Edges => &mut self.edges,
            DirectiveKey::Background => &mut self.background,
            DirectiveKey::Fill => &mut self.fill,
            DirectiveKey::FillArrows => return None,
            DirectiveKey::Font => &mut self.font,
            DirectiveKey::FontSize => &mut self.font_size,
            DirectiveKey::Leading => &mut self.leading,
            DirectiveKey::LineWidth => &mut self.line_width,
            DirectiveKey::Padding => &mut self.padding,
            DirectiveKey::Spacing => &mut self.spacing,
            DirectiveKey::Stroke => &mut self.stroke,
            DirectiveKey::Ranker => &mut self.ranker,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(settings: &Settings) -> Vec<String> {
        settings.directives().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_default_directives() {
        assert_eq!(
            lines(&Settings::default()),
            vec![
                "#direction: down",
                "#edges: rounded",
                "#background: #ffffff",
                "#fillArrows: false",
                "#ranker: network-simplex",
            ]
        );
    }

    #[test]
    fn test_merged_overrides() {
        let settings = Settings::default().merged([
            ("gutter", "30"),
            ("#fillArrows", "true"),
            ("background", ""),
            ("zoom", "2"),
        ]);
        assert_eq!(settings.get(DirectiveKey::Gutter), "30");
        assert!(settings.fill_arrows());
        assert_eq!(settings.get(DirectiveKey::Background), "");
        assert_eq!(settings.extra().get("zoom").map(String::as_str), Some("2"));

        let lines = lines(&settings);
        assert!(!lines.iter().any(|line| line.starts_with("#background")));
        assert_eq!(lines.last().map(String::as_str), Some("#zoom: 2"));
    }

    #[test]
    fn test_invalid_bool_is_ignored() {
        let settings = Settings::default().merged([("fillArrows", "yes")]);
        assert!(!settings.fill_arrows());
    }

    #[test]
    fn test_merged_leaves_original_untouched() {
        let base = Settings::default();
        let _ = base.merged([("direction", "right")]);
        assert_eq!(base.get(DirectiveKey::Direction), "down");
    }

    #[test]
    fn test_deserialize_camel_case() {
        let config: AppConfig = toml::from_str(
            r##"
            [directives]
            edgeMargin = "4"
            fontSize = "14"
            fillArrows = true
            title = "ignored by the renderer"
            "##,
        )
        .unwrap();

        let settings = config.directives();
        assert_eq!(settings.get(DirectiveKey::EdgeMargin), "4");
        assert_eq!(settings.get(DirectiveKey::FontSize), "14");
        assert_eq!(settings.get(DirectiveKey::Direction), "down");
        assert!(settings.fill_arrows());
        assert_eq!(settings.extra().len(), 1);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
