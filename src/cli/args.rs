//! CLI argument definitions using clap
//!
//! This module defines all command-line arguments for curlport.

use clap::{ArgAction, Parser, ValueEnum};

pub use crate::output::ColorMode;

/// curlport - Convert curl commands into code for other languages and libraries
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "curlport", version, about, long_about = None)]
pub struct Args {
    // =========================================================================
    // INPUT
    // =========================================================================

    /// The curl command to convert; read from stdin when omitted or "-"
    #[arg(value_name = "COMMAND")]
    pub command: Option<String>,

    // =========================================================================
    // TARGET SELECTION
    // =========================================================================

    /// Target language key (see --list)
    #[arg(short = 'l', long = "language", value_name = "KEY", env = "CURLPORT_LANGUAGE")]
    pub language: Option<String>,

    /// Library variant within the language (defaults to the first one)
    #[arg(short = 'v', long = "variant", value_name = "NAME")]
    pub variant: Option<String>,

    /// Print every variant of the language, each under a comment banner
    #[arg(long = "all-variants", action = ArgAction::SetTrue, conflicts_with = "variant")]
    pub all_variants: bool,

    /// List supported languages and their variants, then exit
    #[arg(long = "list", action = ArgAction::SetTrue)]
    pub list: bool,

    /// Print the parsed request as JSON instead of generating code
    #[arg(long = "parse-only", action = ArgAction::SetTrue)]
    pub parse_only: bool,

    // =========================================================================
    // OUTPUT
    // =========================================================================

    /// When to syntax-highlight the generated code
    #[arg(long = "color", value_name = "WHEN", value_enum)]
    pub color: Option<ColorMode>,

    /// Highlighting theme
    #[arg(long = "theme", value_name = "THEME")]
    pub theme: Option<String>,

    /// Output format for structured logging: json (JSON Lines) or text (default)
    #[arg(long = "log-format", value_name = "FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    // =========================================================================
    // TROUBLESHOOTING
    // =========================================================================

    /// Debug logging and detailed error output
    #[arg(long = "debug", action = ArgAction::SetTrue)]
    pub debug: bool,

    // =========================================================================
    // GENERATION (hidden)
    // =========================================================================

    /// Generate shell completions for the specified shell
    #[arg(long = "generate-completions", value_name = "SHELL", value_enum, hide = true)]
    pub generate_completions: Option<Shell>,
}

/// Shell types for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Log format for structured output (CI/CD)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Plain text output (default)
    #[default]
    Text,
    /// JSON Lines format for parsing
    Json,
}
