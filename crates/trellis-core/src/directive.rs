//! Directives and directive resolution.
//!
//! A directive is a `#key: value` line that tunes layout or styling. Global
//! directives come from configuration; documents can override them inline.
//! [`resolve`] merges an ordered sequence of directives into one
//! [`DirectiveSet`]:
//!
//! - later declarations win over earlier ones,
//! - an empty value means "not specified" and never clears a prior value,
//! - unknown keys are kept so newer renderer features keep working.
//!
//! # Example
//!
//! ```
//! use trellis_core::directive::{Directive, DirectiveKey, resolve};
//!
//! let set = resolve([
//!     Directive::new("direction", "down"),
//!     Directive::new("stroke", "#333"),
//!     Directive::new("direction", "right"),
//!     Directive::new("stroke", ""),
//! ]);
//!
//! assert_eq!(set.get_key(DirectiveKey::Direction), Some("right"));
//! assert_eq!(set.get_key(DirectiveKey::Stroke), Some("#333"));
//! ```

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use log::trace;

/// The directive names understood by the layout engine and the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKey {
    ArrowSize,
    BendSize,
    Direction,
    Gutter,
    EdgeMargin,
    Gravity,
    Edges,
    Background,
    Fill,
    FillArrows,
    Font,
    FontSize,
    Leading,
    LineWidth,
    Padding,
    Spacing,
    Stroke,
    Ranker,
}

impl DirectiveKey {
    /// Every recognized key, in canonical order.
    pub const ALL: [DirectiveKey; 18] = [
        DirectiveKey::ArrowSize,
        DirectiveKey::BendSize,
        DirectiveKey::Direction,
        DirectiveKey::Gutter,
        DirectiveKey::EdgeMargin,
        DirectiveKey::Gravity,
        DirectiveKey::Edges,
        DirectiveKey::Background,
        DirectiveKey::Fill,
        DirectiveKey::FillArrows,
        DirectiveKey::Font,
        DirectiveKey::FontSize,
        DirectiveKey::Leading,
        DirectiveKey::LineWidth,
        DirectiveKey::Padding,
        DirectiveKey::Spacing,
        DirectiveKey::Stroke,
        DirectiveKey::Ranker,
    ];

    /// Returns the key as written in source (`#fillArrows: true` → `fillArrows`).
    pub fn as_str(self) -> &'static str {
        match self {
            DirectiveKey::ArrowSize => "arrowSize",
            DirectiveKey::BendSize => "bendSize",
            DirectiveKey::Direction => "direction",
            DirectiveKey::Gutter => "gutter",
            DirectiveKey::EdgeMargin => "edgeMargin",
            DirectiveKey::Gravity => "gravity",
            DirectiveKey::Edges => "edges",
            DirectiveKey::Background => "background",
            DirectiveKey::Fill => "fill",
            DirectiveKey::FillArrows => "fillArrows",
            DirectiveKey::Font => "font",
            DirectiveKey::FontSize => "fontSize",
            DirectiveKey::Leading => "leading",
            DirectiveKey::LineWidth => "lineWidth",
            DirectiveKey::Padding => "padding",
            DirectiveKey::Spacing => "spacing",
            DirectiveKey::Stroke => "stroke",
            DirectiveKey::Ranker => "ranker",
        }
    }
}

impl fmt::Display for DirectiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DirectiveKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DirectiveKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or(())
    }
}

/// A single `key: value` directive, as declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    key: String,
    value: String,
}

impl Directive {
    /// Creates a directive. Key and value are trimmed; a leading `#` on the key is dropped.
    pub fn new(key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let key = key.as_ref().trim();
        Self {
            key: key.strip_prefix('#').unwrap_or(key).trim().to_string(),
            value: value.as_ref().trim().to_string(),
        }
    }

    /// Parses a `#key: value` line. Returns `None` when the line is not a directive.
    ///
    /// ```
    /// # use trellis_core::directive::Directive;
    /// let directive = Directive::parse_line("#direction: right").unwrap();
    /// assert_eq!(directive.key(), "direction");
    /// assert_eq!(directive.value(), "right");
    /// assert!(Directive::parse_line("[A] -> [B]").is_none());
    /// ```
    pub fn parse_line(line: &str) -> Option<Self> {
        let rest = line.trim_start().strip_prefix('#')?;
        let (key, value) = rest.split_once(':')?;
        if key.trim().is_empty() {
            return None;
        }
        Some(Self::new(key, value))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The recognized key, or `None` for pass-through directives.
    pub fn known_key(&self) -> Option<DirectiveKey> {
        self.key.parse().ok()
    }

    /// `true` when the value carries nothing and must not override anything.
    pub fn is_unset(&self) -> bool {
        self.value.is_empty()
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}: {}", self.key, self.value)
    }
}

/// The effective directives for one diagram, keyed by name in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveSet {
    values: IndexMap<String, String>,
}

impl DirectiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the effective value for a directive name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the effective value for a recognized directive.
    pub fn get_key(&self, key: DirectiveKey) -> Option<&str> {
        self.get(key.as_str())
    }

    /// Directives whose key is not one of [`DirectiveKey::ALL`].
    pub fn unknown(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .filter(|(key, _)| key.parse::<DirectiveKey>().is_err())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Applies one directive with last-write-wins semantics; unset values are ignored.
    fn apply(&mut self, directive: Directive) {
        if directive.is_unset() {
            trace!(key = directive.key; "Skipping directive without value");
            return;
        }
        self.values.insert(directive.key, directive.value);
    }
}

/// Merges an ordered sequence of directives (globals first, then document
/// order) into the effective [`DirectiveSet`].
pub fn resolve<I>(directives: I) -> DirectiveSet
where
    I: IntoIterator<Item = Directive>,
{
    let mut set = DirectiveSet::new();
    for directive in directives {
        set.apply(directive);
    }
    set
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_last_write_wins() {
        let set = resolve([
            Directive::new("direction", "down"),
            Directive::new("direction", "right"),
        ]);
        assert_eq!(set.get_key(DirectiveKey::Direction), Some("right"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_empty_value_does_not_clear() {
        let set = resolve([
            Directive::new("stroke", "#333"),
            Directive::new("stroke", ""),
            Directive::new("stroke", "   "),
        ]);
        assert_eq!(set.get_key(DirectiveKey::Stroke), Some("#333"));
    }

    #[test]
    fn test_empty_value_alone_is_absent() {
        let set = resolve([Directive::new("fill", "")]);
        assert!(set.is_empty());
        assert_eq!(set.get("fill"), None);
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let set = resolve([
            Directive::new("zoom", "2"),
            Directive::new("title", "diagram"),
            Directive::new("stroke", "red"),
        ]);
        let unknown: Vec<_> = set.unknown().collect();
        assert_eq!(unknown, vec![("zoom", "2"), ("title", "diagram")]);
        assert_eq!(set.get("zoom"), Some("2"));
    }

    #[test]
    fn test_parse_line() {
        let directive = Directive::parse_line("  #fillArrows:   true  ").unwrap();
        assert_eq!(directive.key(), "fillArrows");
        assert_eq!(directive.value(), "true");
        assert_eq!(directive.known_key(), Some(DirectiveKey::FillArrows));

        let empty = Directive::parse_line("#stroke:").unwrap();
        assert!(empty.is_unset());

        assert!(Directive::parse_line("#nocolon").is_none());
        assert!(Directive::parse_line("#: value").is_none());
    }

    #[test]
    fn test_key_round_trip() {
        for key in DirectiveKey::ALL {
            assert_eq!(key.as_str().parse::<DirectiveKey>(), Ok(key));
        }
        assert!("Direction".parse::<DirectiveKey>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Directive::new("#gutter", "20").to_string(), "#gutter: 20");
    }

    fn directive_strategy() -> impl Strategy<Value = Directive> {
        (
            prop::sample::select(vec!["direction", "stroke", "fill", "zoom", "ranker"]),
            prop::sample::select(vec!["", "down", "right", "#333", "red", "2"]),
        )
            .prop_map(|(key, value)| Directive::new(key, value))
    }

    proptest! {
        #[test]
        fn prop_resolution_is_idempotent(
            directives in prop::collection::vec(directive_strategy(), 0..20),
        ) {
            let first = resolve(directives.clone());
            let second = resolve(directives);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_effective_value_is_last_non_empty(
            directives in prop::collection::vec(directive_strategy(), 0..20),
        ) {
            let set = resolve(directives.clone());
            for key in ["direction", "stroke", "fill", "zoom", "ranker"] {
                let expected = directives
                    .iter()
                    .rev()
                    .find(|d| d.key() == key && !d.is_unset())
                    .map(Directive::value);
                prop_assert_eq!(set.get(key), expected);
            }
        }
    }
}
