//! Live preview of the markdown being edited.
//!
//! This module handles:
//! - Rendering markdown to HTML with comrak
//! - Routing fenced code blocks through a [`crate::highlight::CodeHighlighter`]
//! - Delivering markup to a [`PreviewSink`]

mod page;
mod render;

pub use page::standalone_page;
pub use render::PreviewRenderer;

/// Receives freshly rendered preview markup.
pub trait PreviewSink {
    /// Replace whatever is displayed with `html`.
    fn show(&mut self, html: &str);
}

impl PreviewSink for String {
    fn show(&mut self, html: &str) {
        self.clear();
        self.push_str(html);
    }
}

/// Counts renders; used where the markup itself is not needed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderCounter(pub usize);

impl PreviewSink for RenderCounter {
    fn show(&mut self, _html: &str) {
        self.0 += 1;
    }
}
