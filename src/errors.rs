//! Error types for curlport

use thiserror::Error;

/// Main error type for curlport
#[derive(Error, Debug)]
pub enum CurlportError {
    /// The text is not a curl invocation at all
    #[error("{0}")]
    InvalidCommand(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown language '{0}'. Supported: {1}")]
    UnknownLanguage(String, String),

    #[error("Unknown variant '{variant}' for {language}. Available: {available}")]
    UnknownVariant {
        language: String,
        variant: String,
        available: String,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CurlportError>;
