//! Markdown to HTML rendering with comrak.

use std::collections::HashMap;
use std::io::{self, Write};

use comrak::adapters::SyntaxHighlighterAdapter;
use comrak::{Options, Plugins, markdown_to_html_with_plugins};

use crate::highlight::{CodeHighlighter, PlainHighlighter, SyntectHighlighter};

/// Renders markdown source into preview markup.
///
/// # Example
///
/// ```
/// use markpad::preview::PreviewRenderer;
///
/// let html = PreviewRenderer::new().render("# Hello");
/// assert!(html.contains("<h1>Hello</h1>"));
/// ```
pub struct PreviewRenderer {
    highlighter: Box<dyn CodeHighlighter>,
    raw_html: bool,
}

impl PreviewRenderer {
    /// Renderer with syntect highlighting and raw HTML passed through.
    pub fn new() -> Self {
        Self {
            highlighter: Box::new(SyntectHighlighter),
            raw_html: true,
        }
    }

    /// Renderer that never highlights code.
    pub fn plain() -> Self {
        Self::new().with_highlighter(PlainHighlighter)
    }

    /// Replace the code block highlighter.
    pub fn with_highlighter(mut self, highlighter: impl CodeHighlighter + 'static) -> Self {
        self.highlighter = Box::new(highlighter);
        self
    }

    /// Pass raw HTML in the source through (`true`) or escape it.
    pub const fn with_raw_html(mut self, enabled: bool) -> Self {
        self.raw_html = enabled;
        self
    }

    /// Render `markdown` to HTML.
    ///
    /// Never fails: a code block whose language cannot be highlighted is
    /// written as escaped text and the rest of the document is unaffected.
    pub fn render(&self, markdown: &str) -> String {
        let _scope = crate::perf::scope("preview.render");
        let adapter = HighlightAdapter {
            highlighter: self.highlighter.as_ref(),
        };
        let mut plugins = Plugins::default();
        plugins.render.codefence_syntax_highlighter = Some(&adapter);

        let html = markdown_to_html_with_plugins(markdown, &self.create_options(), &plugins);
        tracing::debug!(
            source_bytes = markdown.len(),
            html_bytes = html.len(),
            "rendered preview"
        );
        html
    }

    fn create_options(&self) -> Options {
        let mut options = Options::default();

        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.extension.footnotes = true;

        options.render.unsafe_ = self.raw_html;

        options
    }
}

impl Default for PreviewRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PreviewRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewRenderer")
            .field("raw_html", &self.raw_html)
            .finish_non_exhaustive()
    }
}

/// Bridges a [`CodeHighlighter`] into comrak's fenced code block hook.
struct HighlightAdapter<'h> {
    highlighter: &'h dyn CodeHighlighter,
}

impl SyntaxHighlighterAdapter for HighlightAdapter<'_> {
    fn write_highlighted(
        &self,
        output: &mut dyn Write,
        lang: Option<&str>,
        code: &str,
    ) -> io::Result<()> {
        if let Some(lang) = lang.filter(|lang| !lang.is_empty()) {
            match self.highlighter.highlight(lang, code) {
                Ok(html) => return output.write_all(html.as_bytes()),
                Err(err) => {
                    tracing::debug!(language = lang, %err, "code block left unhighlighted");
                }
            }
        }
        comrak::html::escape(output, code.as_bytes())
    }

    fn write_pre_tag(
        &self,
        output: &mut dyn Write,
        attributes: HashMap<String, String>,
    ) -> io::Result<()> {
        write_opening_tag(output, "pre", &attributes)
    }

    fn write_code_tag(
        &self,
        output: &mut dyn Write,
        attributes: HashMap<String, String>,
    ) -> io::Result<()> {
        write_opening_tag(output, "code", &attributes)
    }
}

fn write_opening_tag(
    output: &mut dyn Write,
    tag: &str,
    attributes: &HashMap<String, String>,
) -> io::Result<()> {
    let mut names = attributes.keys().collect::<Vec<_>>();
    names.sort();

    write!(output, "<{tag}")?;
    for name in names {
        write!(output, " {name}=\"")?;
        comrak::html::escape(output, attributes[name].as_bytes())?;
        output.write_all(b"\"")?;
    }
    output.write_all(b">")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::HighlightError;

    struct FailingHighlighter;

    impl CodeHighlighter for FailingHighlighter {
        fn highlight(&self, _language: &str, _code: &str) -> Result<String, HighlightError> {
            Err(HighlightError::UnsupportedLanguage("always".to_string()))
        }
    }

    struct ShoutingHighlighter;

    impl CodeHighlighter for ShoutingHighlighter {
        fn highlight(&self, language: &str, code: &str) -> Result<String, HighlightError> {
            if language == "python" {
                return Err(HighlightError::UnsupportedLanguage(language.to_string()));
            }
            Ok(code.to_uppercase())
        }
    }

    #[test]
    fn test_render_basic_markdown() {
        let html = PreviewRenderer::plain().render("# Title\n\nSome **bold** text");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_render_unknown_language_falls_back_to_escaped_text() {
        let md = "```klingon\nif a < b { qapla }\n```\n";
        let html = PreviewRenderer::new().render(md);
        assert!(html.contains("if a &lt; b { qapla }"), "got: {html}");
        assert!(html.contains("<code class=\"language-klingon\">"), "got: {html}");
    }

    #[test]
    fn test_render_highlighter_error_only_affects_its_block() {
        let md = "```rust\nfn a() {}\n```\n\n```python\nx = 1 < 2\n```\n";
        let html = PreviewRenderer::new()
            .with_highlighter(ShoutingHighlighter)
            .render(md);
        assert!(html.contains("FN A() {}"), "got: {html}");
        assert!(html.contains("x = 1 &lt; 2"), "got: {html}");
    }

    #[test]
    fn test_render_failing_highlighter_still_renders_document() {
        let md = "intro\n\n```rust\nlet v = \"<tag>\";\n```\n\noutro";
        let html = PreviewRenderer::new()
            .with_highlighter(FailingHighlighter)
            .render(md);
        assert!(html.contains("<p>intro</p>"));
        assert!(html.contains("&lt;tag&gt;"));
        assert!(html.contains("<p>outro</p>"));
    }

    #[test]
    fn test_render_untagged_block_is_escaped() {
        let html = PreviewRenderer::new().render("```\n<b>raw</b>\n```\n");
        assert!(html.contains("<pre><code>&lt;b&gt;raw&lt;/b&gt;"), "got: {html}");
    }

    #[test]
    fn test_render_known_language_is_highlighted() {
        let html = PreviewRenderer::new().render("```rust\nfn main() {}\n```\n");
        assert!(html.contains("<span class=\""), "got: {html}");
    }

    #[test]
    fn test_render_passes_raw_html_by_default() {
        let html = PreviewRenderer::plain().render("<div class=\"note\">hi</div>\n");
        assert!(html.contains("<div class=\"note\">hi</div>"));
    }

    #[test]
    fn test_render_safe_mode_omits_raw_html() {
        let html = PreviewRenderer::plain()
            .with_raw_html(false)
            .render("<script>alert(1)</script>\n");
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_render_gfm_extensions() {
        let md = "~~gone~~\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n- [x] done\n";
        let html = PreviewRenderer::plain().render(md);
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("checkbox"));
    }

    #[test]
    fn test_write_opening_tag_escapes_attributes() {
        let mut out = Vec::new();
        let attributes = HashMap::from([("class".to_string(), "a\"b".to_string())]);
        write_opening_tag(&mut out, "code", &attributes).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "<code class=\"a&quot;b\">");
    }
}
