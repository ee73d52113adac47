#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. editor::EditorBuffer)
    clippy::module_name_repetitions
)]

//! # Markpad
//!
//! A markdown editing toolkit.
//!
//! Markpad provides:
//! - Toolbar formatting over a text buffer and selection (bold, italic,
//!   headings, lists, links)
//! - Live HTML preview rendered with comrak
//! - Syntax-highlighted code blocks that degrade to plain text
//! - Copying markdown or HTML to the clipboard
//!
//! ## Modules
//!
//! - [`editor`]: Buffer, selection, toolbar actions
//! - [`preview`]: Markdown to HTML rendering
//! - [`highlight`]: Code block highlighting and stylesheets
//! - [`config`]: Persisted command-line defaults
//! - [`watcher`]: Source file watching

pub mod config;
pub mod editor;
pub mod highlight;
pub mod perf;
pub mod preview;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::editor::{Editor, FormatAction, Prompter, Selection};
    pub use crate::preview::{PreviewRenderer, PreviewSink};
}
