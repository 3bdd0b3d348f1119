//! Shell-like tokenizer for curl command lines

use once_cell::sync::Lazy;
use regex::Regex;

/// Line continuation: `\` (Unix), `^` (cmd.exe) or `` ` `` (PowerShell)
/// before a newline, together with the surrounding indentation
static LINE_CONTINUATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\\^`][ \t]*\r?\n[ \t]*").expect("valid line continuation regex")
});

/// Trim the command and collapse line continuations into single spaces
pub fn normalize(command: &str) -> String {
    LINE_CONTINUATION
        .replace_all(command.trim(), " ")
        .into_owned()
}

/// Split a command line into tokens.
///
/// Quotes group characters and are dropped. Outside quotes and inside double
/// quotes a backslash takes the next character literally, except that
/// backslash-newline is removed; inside single quotes it is an ordinary
/// character. An unterminated quote runs to end of input.
pub fn tokenize(command: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // Distinguishes `''` (an empty argument) from no token at all
    let mut has_token = false;
    let mut quote: Option<char> = None;
    let mut escape_next = false;

    let mut chars = command.chars().peekable();
    while let Some(c) = chars.next() {
        if escape_next {
            escape_next = false;
            match c {
                // Backslash-newline is a line continuation and vanishes
                '\n' => {}
                '\r' if chars.peek() == Some(&'\n') => {
                    chars.next();
                }
                _ => {
                    current.push(c);
                    has_token = true;
                }
            }
            continue;
        }

        match (quote, c) {
            (Some('\''), '\'') | (Some('"'), '"') => {
                quote = None;
            }
            (Some('\''), _) => {
                current.push(c);
            }
            (_, '\\') => {
                escape_next = true;
            }
            (Some(_), _) => {
                current.push(c);
            }
            (None, '\'' | '"') => {
                quote = Some(c);
                has_token = true;
            }
            (None, c) if c.is_whitespace() => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            (None, _) => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if has_token {
        tokens.push(current);
    }

    tokens
}
