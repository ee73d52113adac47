//! Standalone HTML document around a rendered preview.

use std::fmt::Write as _;

/// Wrap a rendered body in a minimal HTML5 document.
///
/// `css` is inlined in a `<style>` element when present.
pub fn standalone_page(title: &str, body: &str, css: Option<&str>) -> String {
    let mut page = String::with_capacity(body.len() + 256);
    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(page, "<title>{}</title>", escape_text(title));
    if let Some(css) = css {
        let _ = writeln!(page, "<style>\n{css}</style>");
    }
    page.push_str("</head>\n<body>\n");
    page.push_str(body);
    page.push_str("</body>\n</html>\n");
    page
}

fn escape_text(text: &str) -> String {
    let mut escaped = Vec::with_capacity(text.len());
    if comrak::html::escape(&mut escaped, text.as_bytes()).is_err() {
        return String::new();
    }
    String::from_utf8(escaped).unwrap_or_default()
}
