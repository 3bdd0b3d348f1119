//! Helpers shared by the language generators

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::curl::{DataParam, FormParam};

/// Serialize JSON with the given indent width, keeping key order
pub fn json_pretty(value: &serde_json::Value, indent: usize) -> String {
    let indent = " ".repeat(indent);
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = Serializer::with_formatter(&mut out, formatter);
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8(out).unwrap_or_default(),
        Err(_) => value.to_string(),
    }
}

/// Prefix every non-empty line with `prefix`
pub fn indent_lines(code: &str, prefix: &str) -> String {
    code.lines()
        .map(|line| if line.is_empty() { String::new() } else { format!("{}{}", prefix, line) })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prefix every line but the first, for nesting a multi-line value after a key
pub fn indent_tail(text: &str, prefix: &str) -> String {
    text.lines()
        .enumerate()
        .map(|(i, line)| if i == 0 { line.to_string() } else { format!("{}{}", prefix, line) })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Literal data items joined with `&`, or `None` when any item reads a file
pub fn join_literals(params: &[DataParam]) -> Option<String> {
    params
        .iter()
        .map(|p| match p {
            DataParam::Literal(s) => Some(s.as_str()),
            DataParam::File(_) => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(|parts| parts.join("&"))
}

/// Shell-safe bare word: letters, digits, `-`, `_` and `.`
pub fn is_bare_word(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

/// Text safe inside a line or block comment: control characters are escaped
/// and `*/` cannot close the comment
pub fn comment_safe(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_control() || c == '\u{2028}' || c == '\u{2029}' {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    out.replace("*/", "* /")
}

/// `name=value`, or `name=@file`, for a multipart placeholder comment
pub fn field_summary(field: &FormParam) -> String {
    let marker = if field.is_file { "@" } else { "" };
    comment_safe(&format!("{}={}{}", field.name, marker, field.content))
}

/// Components of a URL needed by low-level clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// Path plus query string
    pub path: String,
}

/// Split a URL into scheme/host/port/path, falling back to localhost:80 and
/// `/` when it does not parse
pub fn url_parts(raw: &str) -> UrlParts {
    match url::Url::parse(raw) {
        Ok(parsed) => {
            let mut path = parsed.path().to_string();
            if let Some(query) = parsed.query() {
                path.push('?');
                path.push_str(query);
            }
            UrlParts {
                scheme: parsed.scheme().to_string(),
                host: parsed.host_str().unwrap_or("localhost").to_string(),
                port: parsed.port_or_known_default().unwrap_or(80),
                path,
            }
        }
        Err(_) => UrlParts {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: 80,
            path: "/".to_string(),
        },
    }
}

/// Backslash escape for the C family of string literals.
///
/// `quote` is the delimiter to escape; control characters without a short
/// form go through `unicode`.
pub fn backslash_escape(s: &str, quote: char, unicode: fn(char) -> String) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&unicode(c)),
            c => out.push(c),
        }
    }
    out
}

/// `\uXXXX` (JavaScript, Java, C#, Python)
pub fn unicode_u4(c: char) -> String {
    format!("\\u{:04x}", c as u32)
}

/// `\u{XX}` (Rust, Swift)
pub fn unicode_braced(c: char) -> String {
    format!("\\u{{{:x}}}", c as u32)
}
