//! curl command parsing
//!
//! - [`tokenizer`] - shell-like splitting and line-continuation folding
//! - [`parser`] - flag interpretation into a [`Request`]
//! - [`request`] - the normalized request model

pub mod parser;
pub mod request;
pub mod tokenizer;

pub use parser::{parse_curl_command, parse_tokens, ParseOutcome, NOT_A_CURL_COMMAND};
pub use request::{
    AuthConfig, AuthType, BodySource, DataParam, FileData, FileType, FormParam, LegacyData, Request,
    RequestUrl,
};
pub use tokenizer::{normalize, tokenize};
