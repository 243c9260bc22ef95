//! Text measurement for node compartments and edge labels.
//!
//! Sizes come from cosmic-text shaping against the system font database. The
//! database is loaded once per process and shared behind a mutex; it is a
//! cache, not part of any diagram. When a family cannot be resolved the
//! measurement degrades to a per-character estimate.

use std::sync::{Arc, Mutex, OnceLock};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use log::{debug, info};

use crate::{geometry::Size, style::Font};

/// Average glyph advance relative to the font size, used when shaping yields nothing.
const FALLBACK_ADVANCE: f32 = 0.55;

/// Measures a block of lines rendered with `font`.
///
/// The height is always `lines * font.line_height()`, so layout stays stable
/// regardless of the fonts installed.
///
/// ```
/// use trellis_core::{style::Font, text::measure_lines};
///
/// let size = measure_lines(&["Component", "+ field"], &Font::default());
/// assert!(size.width() > 0.0);
/// assert_eq!(size.height(), 30.0);
/// ```
pub fn measure_lines<S: AsRef<str>>(lines: &[S], font: &Font) -> Size {
    let manager = TEXT_MANAGER.get_or_init(TextManager::new);
    let width = lines
        .iter()
        .map(|line| manager.line_width(line.as_ref(), font))
        .fold(0.0_f32, f32::max);
    Size::new(width, lines.len() as f32 * font.line_height())
}

/// Measures a single line.
pub fn measure_line(line: &str, font: &Font) -> Size {
    measure_lines(&[line], font)
}

/// Keeps one `FontSystem` alive for the process, since loading it is expensive.
struct TextManager {
    font_system: Arc<Mutex<FontSystem>>,
}

impl TextManager {
    fn new() -> Self {
        info!("Initializing FontSystem");
        Self {
            font_system: Arc::new(Mutex::new(FontSystem::new())),
        }
    }

    fn line_width(&self, text: &str, font: &Font) -> f32 {
        if text.is_empty() {
            return 0.0;
        }

        let shaped = match self.font_system.lock() {
            Ok(mut font_system) => shaped_width(&mut font_system, text, font),
            Err(_) => {
                debug!("FontSystem lock poisoned, estimating text width");
                0.0
            }
        };

        if shaped > 0.0 {
            shaped
        } else {
            fallback_width(text, font)
        }
    }
}

fn shaped_width(font_system: &mut FontSystem, text: &str, font: &Font) -> f32 {
    let metrics = Metrics::new(font.size(), font.line_height());
    let mut buffer = Buffer::new(font_system, metrics);
    let mut buffer = buffer.borrow_with(font_system);

    let attrs = Attrs::new().family(Family::Name(font.family()));
    buffer.set_size(None, None);
    buffer.set_text(text, &attrs, Shaping::Advanced, None);
    buffer.shape_until_scroll(true);

    buffer
        .layout_runs()
        .filter_map(|run| run.glyphs.last().map(|glyph| glyph.x + glyph.w))
        .fold(0.0_f32, f32::max)
}

fn fallback_width(text: &str, font: &Font) -> f32 {
    text.chars().count() as f32 * font.size() * FALLBACK_ADVANCE
}

static TEXT_MANAGER: OnceLock<TextManager> = OnceLock::new();

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_empty_lines() {
        let size = measure_lines::<&str>(&[], &Font::default());
        assert!(size.is_zero());
    }

    #[test]
    fn test_height_is_line_count_times_line_height() {
        let font = Font::new("Helvetica", 10.0, 1.5);
        let size = measure_lines(&["a", "", "c"], &font);
        assert_approx_eq!(f32, size.height(), 45.0);
    }

    #[test]
    fn test_longer_line_is_wider() {
        let font = Font::default();
        let short = measure_line("ab", &font);
        let long = measure_line("abcdefghijklmnop", &font);
        assert!(long.width() > short.width());
    }

    #[test]
    fn test_unknown_family_still_measures() {
        let font = Font::new("No Such Font Family", 12.0, 1.25);
        assert!(measure_line("Hello", &font).width() > 0.0);
    }

    #[test]
    fn test_fallback_width() {
        let font = Font::new("x", 10.0, 1.0);
        assert_approx_eq!(f32, fallback_width("abcd", &font), 22.0);
    }
}
