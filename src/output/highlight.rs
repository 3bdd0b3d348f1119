//! Syntax highlighting of generated code

use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};
use tracing::debug;

use super::terminal::RESET;

/// Cached syntax definitions - loaded once and reused for all highlighting
static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

/// Cached theme definitions - loaded once and reused for all highlighting
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Syntax for a file extension; languages without a bundled grammar are
/// plain text
fn syntax_for(extension: &str) -> &'static SyntaxReference {
    let ss = &*SYNTAX_SET;
    ss.find_syntax_by_extension(extension).unwrap_or_else(|| {
        debug!(extension, "no bundled syntax, using plain text");
        ss.find_syntax_plain_text()
    })
}

fn theme_for(name: &str) -> Option<&'static Theme> {
    let ts = &*THEME_SET;
    ts.themes
        .get(name)
        .or_else(|| ts.themes.get(DEFAULT_THEME))
        .or_else(|| ts.themes.values().next())
}

/// Whether a grammar other than plain text exists for the extension
pub fn has_syntax(extension: &str) -> bool {
    SYNTAX_SET.find_syntax_by_extension(extension).is_some()
}

/// Highlight `code` as 24-bit terminal escapes, picking the grammar by
/// extension; lines that fail to highlight are passed through unchanged
pub fn highlight(code: &str, extension: &str, theme_name: &str) -> String {
    let Some(theme) = theme_for(theme_name) else {
        return code.to_string();
    };
    let mut highlighter = HighlightLines::new(syntax_for(extension), theme);

    let mut out = String::with_capacity(code.len() * 2);
    for line in LinesWithEndings::from(code) {
        match highlighter.highlight_line(line, &SYNTAX_SET) {
            Ok(ranges) => out.push_str(&as_24_bit_terminal_escaped(&ranges[..], false)),
            Err(_) => out.push_str(line),
        }
    }
    if !out.is_empty() {
        out.push_str(RESET);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_adds_escapes() {
        let out = highlight("import requests\n", "py", DEFAULT_THEME);
        assert!(out.contains("\x1b[38;2;"));
        assert!(out.ends_with(RESET));
        assert!(out.contains("requests"));
    }

    #[test]
    fn test_unknown_extension_keeps_text() {
        assert!(!has_syntax("nope"));
        let out = highlight("anything", "nope", "no-such-theme");
        assert!(out.contains("anything"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(highlight("", "rs", DEFAULT_THEME), "");
    }
}
