//! Typed view over a resolved [`DirectiveSet`].
//!
//! [`Style::from_directives`] never fails: a value that does not parse is
//! reported as a [`ConfigurationError`] through `log::warn!` and the default
//! for that directive is used instead.

use std::{fmt, ops::RangeInclusive, str::FromStr};

use log::warn;

use crate::{
    color::Color,
    directive::{DirectiveKey, DirectiveSet},
    error::ConfigurationError,
};

/// Axis along which ranks advance.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ranks grow top-to-bottom.
    #[default]
    Down,
    /// Ranks grow left-to-right.
    Right,
}

impl FromStr for Direction {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "down" => Ok(Self::Down),
            "right" => Ok(Self::Right),
            _ => Err(ConfigurationError::UnknownVariant {
                key: DirectiveKey::Direction.as_str(),
                value: s.to_string(),
                expected: "down, right",
            }),
        }
    }
}

/// Rank assignment strategy of the layered layout.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Ranker {
    /// Minimizes total edge length.
    #[default]
    NetworkSimplex,
    /// Greedily grows a tight spanning tree.
    TightTree,
    /// Places every node one rank below its longest predecessor chain.
    LongestPath,
}

impl Ranker {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NetworkSimplex => "network-simplex",
            Self::TightTree => "tight-tree",
            Self::LongestPath => "longest-path",
        }
    }
}

impl fmt::Display for Ranker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Ranker {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "network-simplex" => Ok(Self::NetworkSimplex),
            "tight-tree" => Ok(Self::TightTree),
            "longest-path" => Ok(Self::LongestPath),
            _ => Err(ConfigurationError::UnknownVariant {
                key: DirectiveKey::Ranker.as_str(),
                value: s.to_string(),
                expected: "network-simplex, tight-tree, longest-path",
            }),
        }
    }
}

/// Corner style of node boxes, set by the `edges` directive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Corners {
    #[default]
    Rounded,
    Hard,
}

impl FromStr for Corners {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rounded" => Ok(Self::Rounded),
            "hard" => Ok(Self::Hard),
            _ => Err(ConfigurationError::UnknownVariant {
                key: DirectiveKey::Edges.as_str(),
                value: s.to_string(),
                expected: "rounded, hard",
            }),
        }
    }
}

/// Font settings shared by every label of a diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    family: String,
    size: f32,
    leading: f32,
}

impl Font {
    pub fn new(family: impl Into<String>, size: f32, leading: f32) -> Self {
        Self {
            family: family.into(),
            size,
            leading,
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    /// Font size in pixels.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Line height multiplier.
    pub fn leading(&self) -> f32 {
        self.leading
    }

    /// Distance between two consecutive baselines.
    pub fn line_height(&self) -> f32 {
        self.size * self.leading
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("Helvetica", 12.0, 1.25)
    }
}

/// Fully typed rendering and layout parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    arrow_size: f32,
    bend_size: f32,
    direction: Direction,
    gutter: f32,
    edge_margin: f32,
    gravity: f32,
    corners: Corners,
    background: Option<Color>,
    fills: Vec<Color>,
    fill_arrows: bool,
    font: Font,
    line_width: f32,
    padding: f32,
    spacing: f32,
    stroke: Color,
    ranker: Ranker,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            arrow_size: 1.0,
            bend_size: 0.3,
            direction: Direction::default(),
            gutter: 20.0,
            edge_margin: 0.0,
            gravity: 1.0,
            corners: Corners::default(),
            background: None,
            fills: default_fills(),
            fill_arrows: false,
            font: Font::default(),
            line_width: 3.0,
            padding: 8.0,
            spacing: 40.0,
            stroke: Color::new("#33322E").expect("default stroke is a valid color"),
            ranker: Ranker::default(),
        }
    }
}

fn default_fills() -> Vec<Color> {
    Color::parse_list("#eee8d5; #fdf6e3").expect("default fills are valid colors")
}

impl Style {
    /// Builds a style from resolved directives, falling back to defaults for
    /// anything missing or malformed.
    ///
    /// ```
    /// use trellis_core::{
    ///     directive::{Directive, resolve},
    ///     style::{Direction, Ranker, Style},
    /// };
    ///
    /// let set = resolve([
    ///     Directive::new("direction", "right"),
    ///     Directive::new("ranker", "no-such-ranker"),
    /// ]);
    /// let style = Style::from_directives(&set);
    /// assert_eq!(style.direction(), Direction::Right);
    /// assert_eq!(style.ranker(), Ranker::NetworkSimplex);
    /// ```
    pub fn from_directives(directives: &DirectiveSet) -> Self {
        let defaults = Self::default();
        let number = |key, default| bounded(directives, key, default);
        let font = Font::new(
            directives
                .get_key(DirectiveKey::Font)
                .map_or_else(|| defaults.font.family.clone(), str::to_string),
            number(DirectiveKey::FontSize, defaults.font.size),
            number(DirectiveKey::Leading, defaults.font.leading),
        );

        Self {
            arrow_size: number(DirectiveKey::ArrowSize, defaults.arrow_size),
            bend_size: number(DirectiveKey::BendSize, defaults.bend_size),
            direction: typed(directives, DirectiveKey::Direction, defaults.direction),
            gutter: number(DirectiveKey::Gutter, defaults.gutter),
            edge_margin: number(DirectiveKey::EdgeMargin, defaults.edge_margin),
            gravity: number(DirectiveKey::Gravity, defaults.gravity),
            corners: typed(directives, DirectiveKey::Edges, defaults.corners),
            background: directives
                .get_key(DirectiveKey::Background)
                .and_then(|value| color(DirectiveKey::Background, value))
                .or(defaults.background),
            fills: directives
                .get_key(DirectiveKey::Fill)
                .and_then(|value| {
                    Color::parse_list(value)
                        .map_err(|reason| ConfigurationError::InvalidColor {
                            key: DirectiveKey::Fill.as_str(),
                            reason,
                        })
                        .inspect_err(|err| warn!(err:%; "Ignoring directive"))
                        .ok()
                })
                .filter(|fills| !fills.is_empty())
                .unwrap_or(defaults.fills),
            fill_arrows: boolean(directives, DirectiveKey::FillArrows, defaults.fill_arrows),
            font,
            line_width: number(DirectiveKey::LineWidth, defaults.line_width),
            padding: number(DirectiveKey::Padding, defaults.padding),
            spacing: number(DirectiveKey::Spacing, defaults.spacing),
            stroke: directives
                .get_key(DirectiveKey::Stroke)
                .and_then(|value| color(DirectiveKey::Stroke, value))
                .unwrap_or(defaults.stroke),
            ranker: typed(directives, DirectiveKey::Ranker, defaults.ranker),
        }
    }

    pub fn arrow_size(&self) -> f32 {
        self.arrow_size
    }

    /// Corner rounding of edge paths, between 0 (sharp) and 1.
    pub fn bend_size(&self) -> f32 {
        self.bend_size
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Gap between consecutive ranks, also used as the outer margin.
    pub fn gutter(&self) -> f32 {
        self.gutter
    }

    pub fn edge_margin(&self) -> f32 {
        self.edge_margin
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    pub fn corners(&self) -> Corners {
        self.corners
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    /// Fill color for a node at the given nesting depth; fills cycle with depth.
    pub fn fill_for_depth(&self, depth: usize) -> Color {
        self.fills[depth % self.fills.len()]
    }

    pub fn fill_arrows(&self) -> bool {
        self.fill_arrows
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    /// Inner margin of node compartments.
    pub fn padding(&self) -> f32 {
        self.padding
    }

    /// Gap between neighbours within one rank.
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn stroke(&self) -> Color {
        self.stroke
    }

    pub fn ranker(&self) -> Ranker {
        self.ranker
    }
}

fn typed<T>(directives: &DirectiveSet, key: DirectiveKey, default: T) -> T
where
    T: FromStr<Err = ConfigurationError>,
{
    match directives.get_key(key).map(str::parse::<T>) {
        Some(Ok(value)) => value,
        Some(Err(err)) => {
            warn!(err:%; "Ignoring directive");
            default
        }
        None => default,
    }
}

/// Accepted range of each numeric directive. The upper bounds keep every
/// derived coordinate finite, so layout never has to reject a diagram.
fn numeric_range(key: DirectiveKey) -> RangeInclusive<f32> {
    match key {
        DirectiveKey::ArrowSize => 0.0..=10.0,
        DirectiveKey::BendSize => 0.0..=1.0,
        DirectiveKey::Gravity => 0.0..=100.0,
        DirectiveKey::LineWidth => 0.0..=100.0,
        DirectiveKey::FontSize => 1.0..=200.0,
        DirectiveKey::Leading => 0.1..=10.0,
        _ => 0.0..=1000.0,
    }
}

fn bounded(directives: &DirectiveSet, key: DirectiveKey, default: f32) -> f32 {
    match directives.get_key(key).map(|value| parse_number(key, value)) {
        Some(Ok(number)) => number,
        Some(Err(err)) => {
            warn!(err:%; "Ignoring directive");
            default
        }
        None => default,
    }
}

fn parse_number(key: DirectiveKey, value: &str) -> Result<f32, ConfigurationError> {
    let range = numeric_range(key);
    match value.parse::<f32>() {
        Ok(number) if range.contains(&number) => Ok(number),
        Ok(number) if number.is_finite() => Err(ConfigurationError::OutOfRange {
            key: key.as_str(),
            value: number,
            min: *range.start(),
            max: *range.end(),
        }),
        _ => Err(ConfigurationError::InvalidNumber {
            key: key.as_str(),
            value: value.to_string(),
        }),
    }
}

fn boolean(directives: &DirectiveSet, key: DirectiveKey, default: bool) -> bool {
    match directives.get_key(key) {
        Some("true") => true,
        Some("false") => false,
        Some(value) => {
            let err = ConfigurationError::InvalidBool {
                key: key.as_str(),
                value: value.to_string(),
            };
            warn!(err:%; "Ignoring directive");
            default
        }
        None => default,
    }
}

fn color(key: DirectiveKey, value: &str) -> Option<Color> {
    Color::new(value)
        .map_err(|reason| ConfigurationError::InvalidColor {
            key: key.as_str(),
            reason,
        })
        .inspect_err(|err| warn!(err:%; "Ignoring directive"))
        .ok()
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::directive::{Directive, resolve};

    fn style_from(pairs: &[(&str, &str)]) -> Style {
        let set = resolve(pairs.iter().map(|(k, v)| Directive::new(k, v)));
        Style::from_directives(&set)
    }

    #[test]
    fn test_defaults() {
        let style = style_from(&[]);
        assert_eq!(style, Style::default());
        assert_eq!(style.direction(), Direction::Down);
        assert_eq!(style.ranker(), Ranker::NetworkSimplex);
        assert_eq!(style.corners(), Corners::Rounded);
        assert!(!style.fill_arrows());
        assert!(style.background().is_none());
        assert_approx_eq!(f32, style.spacing(), 40.0);
        assert_approx_eq!(f32, style.font().line_height(), 15.0);
    }

    #[test]
    fn test_all_rankers_parse() {
        for ranker in [Ranker::NetworkSimplex, Ranker::TightTree, Ranker::LongestPath] {
            assert_eq!(ranker.as_str().parse::<Ranker>(), Ok(ranker));
        }
    }

    #[test]
    fn test_invalid_enumerations_fall_back() {
        let style = style_from(&[
            ("ranker", "simplex"),
            ("direction", "up"),
            ("edges", "soft"),
            ("fillArrows", "yes"),
        ]);
        assert_eq!(style.ranker(), Ranker::NetworkSimplex);
        assert_eq!(style.direction(), Direction::Down);
        assert_eq!(style.corners(), Corners::Rounded);
        assert!(!style.fill_arrows());
    }

    #[test]
    fn test_configuration_error_message() {
        let err = "simplex".parse::<Ranker>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value `simplex` for directive `ranker`, \
             expected one of: network-simplex, tight-tree, longest-path"
        );
    }

    #[test]
    fn test_numbers() {
        let style = style_from(&[
            ("spacing", "60"),
            ("gutter", "-3"),
            ("padding", "abc"),
            ("bendSize", "4"),
            ("fontSize", "0"),
            ("edgeMargin", "NaN"),
        ]);
        assert_approx_eq!(f32, style.spacing(), 60.0);
        assert_approx_eq!(f32, style.gutter(), 20.0);
        assert_approx_eq!(f32, style.padding(), 8.0);
        assert_approx_eq!(f32, style.bend_size(), 0.3);
        assert_approx_eq!(f32, style.font().size(), 12.0);
        assert_approx_eq!(f32, style.edge_margin(), 0.0);
    }

    #[test]
    fn test_huge_numbers_fall_back() {
        let style = style_from(&[
            ("gutter", "3e38"),
            ("fontSize", "1e30"),
            ("leading", "1e30"),
            ("spacing", "inf"),
            ("arrowSize", "11"),
        ]);
        assert_eq!(style, Style::default());
    }

    #[test]
    fn test_range_ends_are_accepted() {
        let style = style_from(&[("gutter", "1000"), ("bendSize", "0"), ("fontSize", "1")]);
        assert_approx_eq!(f32, style.gutter(), 1000.0);
        assert_approx_eq!(f32, style.bend_size(), 0.0);
        assert_approx_eq!(f32, style.font().size(), 1.0);
    }

    #[test]
    fn test_rejected_numbers_carry_an_error() {
        assert_eq!(
            parse_number(DirectiveKey::Gutter, "-3"),
            Err(ConfigurationError::OutOfRange {
                key: "gutter",
                value: -3.0,
                min: 0.0,
                max: 1000.0,
            })
        );
        assert!(matches!(
            parse_number(DirectiveKey::FontSize, "0"),
            Err(ConfigurationError::OutOfRange { key: "fontSize", .. })
        ));
        assert!(matches!(
            parse_number(DirectiveKey::Padding, "wide"),
            Err(ConfigurationError::InvalidNumber { key: "padding", .. })
        ));

        let err = parse_number(DirectiveKey::LineWidth, "-1").unwrap_err();
        assert_eq!(err.to_string(), "value -1 for directive `lineWidth` is outside 0..=100");
    }
}
