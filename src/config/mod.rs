//! Configuration loaded from `config.toml`

mod config;

pub use config::{merge_default_options, Config, Defaults, CONFIG_DIR_ENV};
