//! curlport library interface
//!
//! Converts curl command lines into equivalent code for other languages and
//! HTTP libraries.
//!
//! # Module Organization
//!
//! - [`curl`] - Tokenizer, interpreter and the [`Request`] model
//! - [`codegen`] - Per-language generators and the registry
//! - [`errors`] - Error types (CurlportError, Result)
//! - [`status`] - Exit status codes (ExitStatus)
//! - [`core`] - CLI execution logic
//!
//! ```
//! use curlport::{get_generators, parse_curl_command};
//!
//! let request = parse_curl_command("curl -d 'a=1' https://example.com")
//!     .into_result()
//!     .unwrap();
//! assert_eq!(request.method, "POST");
//!
//! let python = get_generators("python").unwrap();
//! let (_, requests) = python.default_variant().unwrap();
//! assert!(requests(&request).contains("requests.post("));
//! ```

pub mod cli;
pub mod codegen;
pub mod config;
pub mod context;
pub mod core;
pub mod curl;
pub mod errors;
pub mod output;
pub mod status;

pub use codegen::{generate, get_generators, supported_languages, Generator, GeneratorSet, Language};
pub use curl::{parse_curl_command, ParseOutcome, Request};
pub use errors::{CurlportError, Result};
