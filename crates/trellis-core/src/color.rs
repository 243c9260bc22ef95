//! CSS colors for the `stroke`, `background` and `fill` directives.

use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use color::DynamicColor;

/// A parsed CSS color. Anything a browser accepts in a `fill` attribute
/// parses: hex, `rgb()`, `hsl()` and named colors.
///
/// ```
/// use trellis_core::color::Color;
///
/// let stroke = Color::new("#33322E").unwrap();
/// assert_eq!(stroke.alpha(), 1.0);
/// assert!(Color::new("chartreuse-ish").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl Color {
    /// Parses one directive value. Surrounding whitespace is ignored.
    pub fn new(value: &str) -> Result<Self, String> {
        DynamicColor::from_str(value.trim())
            .map(|color| Self { color })
            .map_err(|err| format!("invalid color `{value}`: {err}"))
    }

    /// Parses the `;`-separated depth palette of the `fill` directive.
    ///
    /// Blank entries are skipped; the first bad entry rejects the whole list.
    pub fn parse_list(list: &str) -> Result<Vec<Self>, String> {
        list.split(';')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(Self::new)
            .collect()
    }

    /// Opacity in `0.0..=1.0`, written out as `fill-opacity`/`stroke-opacity`.
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.color)
    }
}

impl From<&Color> for svg::node::Value {
    fn from(color: &Color) -> Self {
        Self::from(color.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_directive_values() {
        assert!(Color::new("#ff0000").is_ok());
        assert!(Color::new("  #33322E ").is_ok());
        assert!(Color::new("hsl(120, 50%, 50%)").is_ok());
        assert!(Color::new("not-a-color").is_err());
    }

    #[test]
    fn test_transparent_background() {
        let clear = Color::new("transparent").unwrap();
        assert_eq!(clear.alpha(), 0.0);
    }

    #[test]
    fn test_fill_palette() {
        let colors = Color::parse_list("#eee8d5; #fdf6e3;").unwrap();
        assert_eq!(colors.len(), 2);
        assert_ne!(colors[0], colors[1]);

        assert!(Color::parse_list("red; nope").is_err());
        assert!(Color::parse_list("").unwrap().is_empty());
    }

    #[test]
    fn test_same_color_hashes_once() {
        let palette: HashSet<Color> = Color::parse_list("red; red; blue")
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(palette.len(), 2);
    }
}
