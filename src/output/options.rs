//! Output options

use clap::ValueEnum;
use serde::Deserialize;

/// When to syntax-highlight generated code
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Highlight when stdout is a terminal and NO_COLOR is unset
    #[default]
    Auto,
    /// Always highlight
    Always,
    /// Never highlight
    Never,
}

impl ColorMode {
    /// Resolve against the terminal state
    pub fn enabled(self, stdout_isatty: bool, no_color: bool) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => stdout_isatty && !no_color,
        }
    }
}
