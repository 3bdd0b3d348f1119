//! ANSI styling for listings and messages

pub mod colors {
    pub const GREY: u8 = 102;      // #7D7D7D - Secondary text
    pub const BLUE: u8 = 68;       // #426BD1 - Language labels
    pub const PINK: u8 = 176;      // #DE85DE - Registry keys
    pub const GREEN: u8 = 71;      // #63C27A - Variant names
    pub const RED: u8 = 167;       // #E34F45 - Errors
}

pub const RESET: &str = "\x1b[0m";

#[inline]
pub fn fg(color: u8) -> String {
    format!("\x1b[38;5;{}m", color)
}

#[inline]
pub fn bold_fg(color: u8) -> String {
    format!("\x1b[1;38;5;{}m", color)
}

#[inline]
pub fn colorize(text: &str, color: u8) -> String {
    format!("{}{}{}", fg(color), text, RESET)
}

#[inline]
pub fn bold(text: &str, color: u8) -> String {
    format!("{}{}{}", bold_fg(color), text, RESET)
}

/// Error prefix (bold red)
#[inline]
pub fn error(text: &str) -> String {
    bold(text, colors::RED)
}

/// Language label (bold blue)
#[inline]
pub fn label(text: &str) -> String {
    bold(text, colors::BLUE)
}

/// Registry key (pink)
#[inline]
pub fn key(text: &str) -> String {
    colorize(text, colors::PINK)
}

/// Variant name (green)
#[inline]
pub fn value(text: &str) -> String {
    colorize(text, colors::GREEN)
}

/// Secondary text (grey)
#[inline]
pub fn muted(text: &str) -> String {
    colorize(text, colors::GREY)
}
