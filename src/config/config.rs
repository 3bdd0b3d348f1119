//! Config file handling

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::{CurlportError, Result};
use crate::output::ColorMode;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "CURLPORT_CONFIG_DIR";

/// `[defaults]` table of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    /// Language key used when `-l` is absent
    pub language: Option<String>,
    /// Variant used when `-v` is absent
    pub variant: Option<String>,
    pub color: Option<ColorMode>,
    /// Extra flags inserted before the user's own
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    defaults: Defaults,
}

/// curlport configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub config_dir: PathBuf,
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: Self::default_config_dir(),
            defaults: Defaults::default(),
        }
    }
}

impl Config {
    /// Load `config.toml` from the config directory; a missing file yields
    /// the defaults
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_config_dir())
    }

    /// Load `config.toml` from `config_dir`
    pub fn load_from(config_dir: PathBuf) -> Result<Self> {
        let config_file = config_dir.join("config.toml");
        if !config_file.exists() {
            debug!(path = %config_file.display(), "no config file");
            return Ok(Self {
                config_dir,
                defaults: Defaults::default(),
            });
        }

        let content = std::fs::read_to_string(&config_file)
            .map_err(|e| CurlportError::Config(format!("Failed to read config: {}", e)))?;
        let defaults = Self::parse(&content)?;
        debug!(path = %config_file.display(), ?defaults, "loaded config");

        Ok(Self { config_dir, defaults })
    }

    fn parse(content: &str) -> Result<Defaults> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.defaults)
    }

    /// `CURLPORT_CONFIG_DIR`, else `<platform config dir>/curlport`
    pub fn default_config_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return PathBuf::from(dir);
        }
        dirs::config_dir()
            .map(|p| p.join("curlport"))
            .unwrap_or_else(|| PathBuf::from(".curlport"))
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }
}

/// Insert the configured default flags after the program name.
///
/// Positional entries are dropped with a warning; only flags may be set
/// this way.
pub fn merge_default_options(args: Vec<String>, defaults: &Defaults) -> Vec<String> {
    if defaults.options.is_empty() {
        return args;
    }

    let (flags, positional): (Vec<_>, Vec<_>) = defaults.options.iter().partition(|opt| opt.starts_with('-'));
    if !positional.is_empty() {
        warn!(?positional, "positional arguments in default options are ignored");
    }
    if flags.is_empty() {
        return args;
    }

    let mut merged = Vec::with_capacity(args.len() + flags.len());
    if let Some(program) = args.first() {
        merged.push(program.clone());
    }
    merged.extend(flags.into_iter().cloned());
    merged.extend(args.into_iter().skip(1));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.defaults, Defaults::default());
        assert_eq!(config.config_file(), dir.path().join("config.toml"));
    }

    #[test]
    fn test_parse_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[defaults]\nlanguage = \"go\"\nvariant = \"Resty\"\ncolor = \"never\"\noptions = [\"--debug\"]\n",
        )
        .unwrap();

        let config = Config::load_from(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.defaults.language.as_deref(), Some("go"));
        assert_eq!(config.defaults.variant.as_deref(), Some("Resty"));
        assert_eq!(config.defaults.color, Some(ColorMode::Never));
        assert_eq!(config.defaults.options, vec!["--debug".to_string()]);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[defaults\nlanguage = ").unwrap();
        let err = Config::load_from(dir.path().to_path_buf()).unwrap_err();
        assert!(matches!(err, CurlportError::TomlParse(_)));

        std::fs::write(dir.path().join("config.toml"), "[defaults]\nlangauge = \"go\"\n").unwrap();
        assert!(Config::load_from(dir.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_merge_default_options() {
        let defaults = Defaults {
            options: vec!["--color=never".into(), "stray".into(), "--debug".into()],
            ..Defaults::default()
        };
        let args = vec!["curlport".to_string(), "-l".to_string(), "go".to_string()];
        let merged = merge_default_options(args, &defaults);
        assert_eq!(merged, vec!["curlport", "--color=never", "--debug", "-l", "go"]);
    }

    #[test]
    fn test_merge_without_options_is_identity() {
        let args = vec!["curlport".to_string(), "--list".to_string()];
        assert_eq!(merge_default_options(args.clone(), &Defaults::default()), args);
    }
}
