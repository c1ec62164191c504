//! Human-readable excerpts around a syntax error.
//!
//! The excerpt shows the lines leading up to the faulty span, a finger line
//! pointing at it, and the lines following it. It is rendered twice: once
//! verbatim and once with carriage returns, line feeds and spaces replaced by
//! visible glyphs, since most grammar failures are whitespace related.
//!
//! The output is advisory text only and is never parsed back.

use crate::syntax::{clamp_to_boundary, Location};

/// Number of bytes scanned before and after the faulty span.
pub const CONTEXT_WINDOW: usize = 100;

const RULE_WIDTH: usize = 80;
const MARKER: char = '^';

/// The raw pieces of a rendered context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Excerpt {
    /// From the start of the window to the end of the span's last line.
    pub before: String,
    /// Spaces up to the span's column, then one marker per spanned character.
    pub finger: String,
    /// The lines following the span's last line, within the window.
    pub after: String,
}

impl Excerpt {
    pub fn extract(text: &str, location: &Location) -> Self {
        let start = clamp_to_boundary(text, location.start.offset);
        let end = clamp_to_boundary(text, location.end.offset).max(start);

        let error_line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
        let display_start = if start <= CONTEXT_WINDOW {
            0
        } else {
            let window_start = clamp_to_boundary(text, start - CONTEXT_WINDOW);
            if window_start >= error_line_start {
                // the error line alone is longer than the window
                window_start
            } else {
                text[window_start..error_line_start]
                    .find('\n')
                    .map_or(error_line_start, |i| window_start + i + 1)
            }
        };

        let line_end = newline_from(text, end);
        let after_start = (line_end + 1).min(text.len());
        let display_end = newline_from(text, clamp_to_boundary(text, line_end + CONTEXT_WINDOW)).max(after_start);

        let spanned = text[start..end].chars().count().max(1);
        let finger = " ".repeat(location.start.column.saturating_sub(1))
            + &MARKER.to_string().repeat(spanned);

        Self {
            before: text[display_start..line_end].to_string(),
            finger,
            after: text[after_start..display_end].to_string(),
        }
    }
}

/// Renders the context of `location` within `text`.
pub fn render(text: &str, location: &Location) -> String {
    let excerpt = Excerpt::extract(text, location);
    let rule = "─".repeat(RULE_WIDTH);

    format!(
        "from line {} column {}\n  to line {} column {}\n\n  Context:\n{rule}\n{before}\n{finger}\n{after}\n{rule}\n{visible_before}␊\n{finger}\n{visible_after}␊\n{rule}",
        location.start.line,
        location.start.column,
        location.end.line,
        location.end.column,
        before = excerpt.before,
        finger = excerpt.finger,
        after = excerpt.after,
        visible_before = show_control_characters(&excerpt.before),
        visible_after = show_control_characters(&excerpt.after),
    )
}

/// Replaces CR, LF and spaces with visible glyphs, keeping line breaks.
pub fn show_control_characters(text: &str) -> String {
    let mut shown = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        match c {
            '\r' => shown.push('␍'),
            '\n' => shown.push_str("␊\n"),
            ' ' => shown.push('␣'),
            other => shown.push(other),
        }
    }
    shown
}

/// Byte offset of the first line feed at or after `from`, or the text length.
fn newline_from(text: &str, from: usize) -> usize {
    let from = clamp_to_boundary(text, from);
    text[from..].find('\n').map_or(text.len(), |i| from + i)
}
