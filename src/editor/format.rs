//! Toolbar text transformations.
//!
//! Each function takes the document text and the current selection and
//! returns a single [`Edit`]. Offsets are char offsets; lines are split on
//! `'\n'` only.

use std::ops::Range;

use serde::Serialize;

use super::buffer::Selection;

/// Marker that switches line formatting into numbered-list mode.
pub const ORDERED_LIST_MARKER: &str = "1. ";

/// One atomic replacement of `range` plus the selection it leaves behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub range: Range<usize>,
    pub replacement: String,
    pub selection: Selection,
}

/// Wrap the selected text in `marker` on both sides.
///
/// Returns `None` for an empty selection. The new selection covers the
/// original text, now sitting between the markers.
pub fn inline(text: &str, selection: Selection, marker: &str) -> Option<Edit> {
    let selection = selection.clamp_to(text.chars().count());
    if selection.is_empty() {
        return None;
    }
    let selected = char_slice(text, selection.range());
    let marker_len = marker.chars().count();
    Some(Edit {
        range: selection.range(),
        replacement: format!("{marker}{selected}{marker}"),
        selection: Selection::new(selection.start() + marker_len, selection.end() + marker_len),
    })
}

/// Prefix every line touched by the selection with `prefix`.
///
/// The span starts at the beginning of the line containing
/// `selection.start()` and ends at `selection.end()`. Lines that already carry
/// the marker are left alone. With [`ORDERED_LIST_MARKER`], lines after the
/// first are numbered `2. `, `3. `, and so on. When `ensure_line_start` is
/// false the first line is never touched. The caret ends up after the
/// replaced span.
pub fn line_prefix(
    text: &str,
    selection: Selection,
    prefix: &str,
    ensure_line_start: bool,
) -> Edit {
    let selection = selection.clamp_to(text.chars().count());
    let start_byte = byte_offset(text, selection.start());
    let end_byte = byte_offset(text, selection.end());

    let line_start_byte = text[..start_byte].rfind('\n').map_or(0, |i| i + 1);
    let line_start = text[..line_start_byte].chars().count();

    let replacement = text[line_start_byte..end_byte]
        .split('\n')
        .enumerate()
        .map(|(index, line)| prefix_line(line, index, prefix, ensure_line_start))
        .collect::<Vec<_>>()
        .join("\n");

    let caret = line_start + replacement.chars().count();
    Edit {
        range: line_start..selection.end(),
        replacement,
        selection: Selection::caret(caret),
    }
}

/// Replace the selection with `[label](url)`, caret after the link.
pub fn link(text: &str, selection: Selection, url: &str, label: &str) -> Edit {
    let selection = selection.clamp_to(text.chars().count());
    let markup = format!("[{label}]({url})");
    let caret = selection.start() + markup.chars().count();
    Edit {
        range: selection.range(),
        replacement: markup,
        selection: Selection::caret(caret),
    }
}

fn prefix_line(line: &str, index: usize, prefix: &str, ensure_line_start: bool) -> String {
    if index == 0 && !ensure_line_start {
        return line.to_string();
    }

    let trimmed = line.trim_start();
    let ordered = prefix == ORDERED_LIST_MARKER;
    if trimmed.starts_with(prefix.trim_start()) || (ordered && has_ordered_marker(trimmed)) {
        return line.to_string();
    }

    if ordered && index > 0 {
        return format!("{}. {trimmed}", index + 1);
    }

    format!("{prefix}{trimmed}")
}

// `12. item` style marker at the start of an already trimmed line.
fn has_ordered_marker(line: &str) -> bool {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && line[digits..].starts_with(". ")
}

fn byte_offset(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map_or(text.len(), |(byte, _)| byte)
}

fn char_slice(text: &str, range: Range<usize>) -> &str {
    &text[byte_offset(text, range.start)..byte_offset(text, range.end)]
}
