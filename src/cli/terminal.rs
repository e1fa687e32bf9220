//! Styling for tree numbers, headings and section labels.

use std::borrow::Cow;

use owo_colors::{OwoColorize, colors::css};

/// Below this width tree listings are printed flat, without indentation.
const NARROW_COLUMNS: u16 = 60;

fn color_enabled() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(width, _)| width.0)
}

/// Indentation for a tree number `depth` levels below the listed prefix.
pub fn indent(depth: usize) -> String {
    if terminal_width().is_some_and(|width| width < NARROW_COLUMNS) {
        String::new()
    } else {
        "  ".repeat(depth)
    }
}

/// Shortens `text` so that it fits after `used` columns on the current line.
///
/// Text is left alone when the width of the terminal is unknown (for example
/// when stdout is piped).
pub fn fit(text: &str, used: usize) -> Cow<'_, str> {
    let Some(width) = terminal_width() else {
        return Cow::Borrowed(text);
    };
    let available = usize::from(width).saturating_sub(used);

    if text.chars().count() <= available || available < 2 {
        Cow::Borrowed(text)
    } else {
        let mut shortened: String = text.chars().take(available - 1).collect();
        shortened.push('…');
        Cow::Owned(shortened)
    }
}

/// Extension trait for styling vocabulary output
pub trait Style {
    /// A tree number (blue)
    fn tree_number(&self) -> String;
    /// Something that could not be resolved (amber)
    fn missing(&self) -> String;
    /// A count or other summary figure (green)
    fn figure(&self) -> String;
    /// A section label (dimmed)
    fn label(&self) -> String;
}

impl Style for str {
    fn tree_number(&self) -> String {
        if color_enabled() {
            self.fg::<css::LightBlue>().to_string()
        } else {
            self.to_string()
        }
    }

    fn missing(&self) -> String {
        if color_enabled() {
            self.fg::<css::Orange>().to_string()
        } else {
            self.to_string()
        }
    }

    fn figure(&self) -> String {
        if color_enabled() {
            self.fg::<css::Green>().to_string()
        } else {
            self.to_string()
        }
    }

    fn label(&self) -> String {
        if color_enabled() {
            self.dimmed().to_string()
        } else {
            self.to_string()
        }
    }
}
