//! Syntax highlighting for fenced code blocks.
//!
//! Uses syntect with Sublime Text syntax definitions and emits class-based
//! HTML spans. The matching stylesheet comes from [`stylesheet`].

use std::sync::OnceLock;

use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use thiserror::Error;

/// Why a code block could not be highlighted.
#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("highlighting failed: {0}")]
    Syntect(#[from] syntect::Error),
}

/// Turns code in a named language into HTML markup.
///
/// The preview renderer falls back to escaped text whenever this returns
/// an error, so implementations only need to handle the happy path.
pub trait CodeHighlighter: Send + Sync {
    /// Highlight `code` written in `language`.
    ///
    /// # Errors
    /// Returns an error if the language is unknown or highlighting fails.
    fn highlight(&self, language: &str, code: &str) -> Result<String, HighlightError>;
}

/// syntect-backed highlighter using the bundled syntax definitions.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntectHighlighter;

impl CodeHighlighter for SyntectHighlighter {
    fn highlight(&self, language: &str, code: &str) -> Result<String, HighlightError> {
        let _scope = crate::perf::scope("highlight.code_block");
        let syntax_set = syntax_set();
        let syntax = find_syntax(language)
            .ok_or_else(|| HighlightError::UnsupportedLanguage(language.to_string()))?;

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set, ClassStyle::Spaced);
        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        Ok(generator.finalize())
    }
}

/// Highlighter that declines every language, leaving all code plain.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHighlighter;

impl CodeHighlighter for PlainHighlighter {
    fn highlight(&self, language: &str, _code: &str) -> Result<String, HighlightError> {
        Err(HighlightError::UnsupportedLanguage(language.to_string()))
    }
}

/// Look up a syntax by fence token (`rs`, `python`) or by name (`Rust`).
pub fn find_syntax(language: &str) -> Option<&'static SyntaxReference> {
    let syntax_set = syntax_set();
    syntax_set
        .find_syntax_by_token(language)
        .or_else(|| syntax_set.find_syntax_by_name(language))
}

/// Background the highlight stylesheet is designed for.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HighlightTheme {
    #[default]
    Light,
    Dark,
}

/// CSS for the class names emitted by [`SyntectHighlighter`].
///
/// # Errors
/// Returns an error if syntect cannot render the theme.
pub fn stylesheet(mode: HighlightTheme) -> Result<String, HighlightError> {
    Ok(css_for_theme_with_class_style(
        theme(mode),
        ClassStyle::Spaced,
    )?)
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.syntax_set.load_defaults");
        SyntaxSet::load_defaults_newlines()
    })
}

fn theme_set() -> &'static ThemeSet {
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.theme.load_defaults");
        ThemeSet::load_defaults()
    })
}

fn theme(mode: HighlightTheme) -> &'static Theme {
    static FALLBACK: OnceLock<Theme> = OnceLock::new();
    let theme_set = theme_set();
    let preferred = match mode {
        HighlightTheme::Dark => [
            "base16-ocean.dark",
            "Solarized (dark)",
            "base16-eighties.dark",
            "base16-mocha.dark",
        ]
        .as_slice(),
        HighlightTheme::Light => ["InspiredGitHub", "Solarized (light)", "base16-ocean.light"]
            .as_slice(),
    };

    preferred
        .iter()
        .find_map(|name| theme_set.themes.get(*name))
        .or_else(|| theme_set.themes.values().next())
        .unwrap_or_else(|| FALLBACK.get_or_init(Theme::default))
}
