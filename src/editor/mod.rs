//! Markdown editor with a formatting toolbar and live preview.
//!
//! [`Editor`] owns the document buffer, the preview renderer and the sink
//! the preview is shown in. Every change to the buffer re-renders the
//! preview. Toolbar actions that need the user (link insertion) or the
//! outside world (copying) take those collaborators as arguments.

mod buffer;
mod clipboard;
pub mod format;
mod prompt;

pub use buffer::{EditorBuffer, Selection, SelectionError};
pub use clipboard::{Clipboard, SystemClipboard};
pub use format::Edit;
pub use prompt::{LinePrompter, Prompter, ScriptedPrompter};

use crate::preview::{PreviewRenderer, PreviewSink};

/// Default answer offered by the URL prompt.
pub const URL_PROMPT_DEFAULT: &str = "https://";

/// Formatting buttons on the toolbar.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatAction {
    Bold,
    Italic,
    H1,
    H2,
    H3,
    /// Bulleted list
    Ul,
    /// Numbered list
    Ol,
    Link,
}

impl FormatAction {
    /// Marker wrapped around the selection, for inline actions.
    pub const fn inline_marker(self) -> Option<&'static str> {
        match self {
            Self::Bold => Some("**"),
            Self::Italic => Some("_"),
            _ => None,
        }
    }

    /// Prefix put in front of each line, for line actions.
    pub const fn line_prefix(self) -> Option<&'static str> {
        match self {
            Self::H1 => Some("# "),
            Self::H2 => Some("## "),
            Self::H3 => Some("### "),
            Self::Ul => Some("- "),
            Self::Ol => Some(format::ORDERED_LIST_MARKER),
            _ => None,
        }
    }
}

/// The editor: buffer, renderer and preview sink wired together.
pub struct Editor<S = String> {
    buffer: EditorBuffer,
    renderer: PreviewRenderer,
    sink: S,
    preview: String,
}

impl<S: PreviewSink> Editor<S> {
    /// Create an editor over `text` and render the initial preview.
    pub fn new(text: &str, renderer: PreviewRenderer, sink: S) -> Self {
        let mut editor = Self {
            buffer: EditorBuffer::from_text(text),
            renderer,
            sink,
            preview: String::new(),
        };
        editor.refresh();
        editor
    }

    pub const fn buffer(&self) -> &EditorBuffer {
        &self.buffer
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub const fn selection(&self) -> Selection {
        self.buffer.selection()
    }

    /// Markup of the most recent render.
    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the editor, returning the final text and the sink.
    pub fn into_parts(self) -> (String, S) {
        (self.buffer.text(), self.sink)
    }

    /// Move the selection (clamped to the document).
    pub fn select(&mut self, selection: Selection) {
        self.buffer.set_selection(selection);
    }

    /// Typed input: replaces the selection with `text`.
    pub fn input(&mut self, text: &str) {
        self.buffer.insert_str(text);
        self.refresh();
    }

    /// Backspace.
    pub fn delete_back(&mut self) -> bool {
        let deleted = self.buffer.delete_back();
        if deleted {
            self.refresh();
        }
        deleted
    }

    /// Replace the whole document.
    pub fn set_text(&mut self, text: &str) {
        self.buffer.set_text(text);
        self.refresh();
    }

    /// Wrap the selection in `marker`. Returns `false` (and does nothing)
    /// when the selection is empty.
    pub fn apply_inline_formatting(&mut self, marker: &str) -> bool {
        let Some(edit) = format::inline(&self.buffer.text(), self.buffer.selection(), marker)
        else {
            return false;
        };
        self.commit(&edit)
    }

    /// Prefix every line touched by the selection with `prefix`.
    ///
    /// Returns `false` when every line already carries the marker; the
    /// caret still moves to the end of the span but nothing is re-rendered.
    pub fn apply_line_formatting(&mut self, prefix: &str, ensure_line_start: bool) -> bool {
        let edit = format::line_prefix(
            &self.buffer.text(),
            self.buffer.selection(),
            prefix,
            ensure_line_start,
        );
        self.commit(&edit)
    }

    /// Ask for a URL (and link text when nothing is selected) and replace
    /// the selection with a markdown link.
    ///
    /// Returns `false` when a prompt is cancelled or answered empty; the
    /// buffer is then unchanged.
    pub fn insert_link(&mut self, prompter: &mut dyn Prompter) -> bool {
        let Some(url) = prompter
            .prompt("Enter the URL:", Some(URL_PROMPT_DEFAULT))
            .filter(|url| !url.is_empty())
        else {
            tracing::debug!("link insertion cancelled at url prompt");
            return false;
        };

        let selected = self.buffer.selected_text();
        let label = match selected.trim() {
            "" => prompter.prompt("Enter the link text:", None),
            trimmed => Some(trimmed.to_string()),
        };
        let Some(label) = label.filter(|label| !label.is_empty()) else {
            tracing::debug!("link insertion cancelled at text prompt");
            return false;
        };

        let edit = format::link(&self.buffer.text(), self.buffer.selection(), &url, &label);
        self.commit(&edit)
    }

    /// Run a toolbar button. Returns whether the buffer changed.
    pub fn apply(&mut self, action: FormatAction, prompter: &mut dyn Prompter) -> bool {
        if let Some(marker) = action.inline_marker() {
            return self.apply_inline_formatting(marker);
        }
        if let Some(prefix) = action.line_prefix() {
            return self.apply_line_formatting(prefix, true);
        }
        self.insert_link(prompter)
    }

    /// Copy the markdown source. Failures are logged, not returned.
    pub fn copy_markdown(&self, clipboard: &mut dyn Clipboard) -> bool {
        copy_logged(clipboard, &self.buffer.text(), "markdown")
    }

    /// Copy the rendered preview markup. Failures are logged, not returned.
    pub fn copy_html(&self, clipboard: &mut dyn Clipboard) -> bool {
        copy_logged(clipboard, &self.preview, "html")
    }

    /// Re-render the preview and push it to the sink.
    pub fn refresh(&mut self) {
        self.preview = self.renderer.render(&self.buffer.text());
        self.sink.show(&self.preview);
    }

    fn commit(&mut self, edit: &Edit) -> bool {
        let changed = self.buffer.apply(edit);
        if changed {
            self.refresh();
        }
        changed
    }
}

impl<S> std::fmt::Debug for Editor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("buffer", &self.buffer)
            .field("renderer", &self.renderer)
            .field("preview_bytes", &self.preview.len())
            .finish_non_exhaustive()
    }
}

fn copy_logged(clipboard: &mut dyn Clipboard, text: &str, what: &str) -> bool {
    match clipboard.write_text(text) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(%err, what, "failed to copy text");
            false
        }
    }
}
