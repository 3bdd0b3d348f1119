use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::{Args, LogFormat, Shell};
use crate::codegen::{self, Language};
use crate::config::{merge_default_options, Config};
use crate::context::Environment;
use crate::curl::{parse_curl_command, Request};
use crate::errors::{CurlportError, Result};
use crate::output::{self, DEFAULT_THEME};
use crate::status::ExitStatus;

/// Environment variable holding the log filter directives
pub const LOG_ENV: &str = "CURLPORT_LOG";

/// Language used when neither the command line nor the config names one
pub const DEFAULT_LANGUAGE: &str = "python";

/// Main entry point for the CLI.
///
/// Loads the configuration, parses arguments and dispatches to listing,
/// parse-only output or code generation.
pub fn run(args: Vec<String>, env: Environment) -> ExitStatus {
    let loaded = Config::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();
    let merged_args = merge_default_options(args, &config.defaults);
    let debug = merged_args.iter().any(|a| a == "--debug");

    let parsed = match Args::try_parse_from(&merged_args) {
        Ok(args) => args,
        Err(e) => {
            e.print().ok();
            return if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion
            {
                ExitStatus::Success
            } else {
                ExitStatus::Error
            };
        }
    };

    init_logging(parsed.debug, parsed.log_format.unwrap_or_default(), env.stderr_isatty);
    if let Err(e) = &loaded {
        warn!(error = %e, "failed to load config, using defaults");
    }

    if let Some(shell) = parsed.generate_completions {
        generate_completions(shell);
        return ExitStatus::Success;
    }

    match program(parsed, &config, &env) {
        Ok(status) => status,
        Err(e) => handle_error(e, debug, env.stderr_isatty && !env.no_color),
    }
}

/// Install the stderr subscriber: `--debug` wins over `CURLPORT_LOG`, which
/// defaults to `warn`
fn init_logging(debug: bool, format: LogFormat, ansi: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr).with_filter(filter))
            .try_init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(debug)
                    .with_ansi(ansi)
                    .with_filter(filter),
            )
            .try_init(),
    };
    if result.is_err() {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn program(args: Args, config: &Config, env: &Environment) -> Result<ExitStatus> {
    let color = args
        .color
        .or(config.defaults.color)
        .unwrap_or_default()
        .enabled(env.stdout_isatty, env.no_color);

    if args.list {
        print!("{}", render_list(color));
        return Ok(ExitStatus::Success);
    }

    let request = read_request(args.command.as_deref(), env)?;

    if args.parse_only {
        println!("{}", serde_json::to_string_pretty(&request)?);
        return Ok(ExitStatus::Success);
    }

    let (key, variant) = resolve_target(&args, config);
    let language: Language = key.parse()?;
    let theme = args.theme.as_deref().unwrap_or(DEFAULT_THEME);

    let code = if args.all_variants {
        render_all_variants(language, &request)
    } else {
        codegen::generate(key, variant, &request)?
    };

    if color {
        println!("{}", output::highlight(&code, language.extension(), theme));
    } else {
        println!("{}", code);
    }
    Ok(ExitStatus::Success)
}

/// Parse the command given on the command line, or read it from stdin
fn read_request(command: Option<&str>, env: &Environment) -> Result<Request> {
    let text = match command {
        Some(text) if text != "-" => text.to_string(),
        _ if env.stdin_isatty => {
            return Err(CurlportError::InvalidCommand(
                "No curl command given; pass it as an argument or on stdin".to_string(),
            ));
        }
        _ => env.read_stdin()?,
    };
    debug!(bytes = text.len(), "read curl command");
    parse_curl_command(&text).into_result()
}

/// Language key and variant: command line first, then config, then the
/// built-in default. A configured variant only applies to the configured
/// language.
fn resolve_target<'a>(args: &'a Args, config: &'a Config) -> (&'a str, Option<&'a str>) {
    let configured = config.defaults.language.as_deref();
    let key = args.language.as_deref().or(configured).unwrap_or(DEFAULT_LANGUAGE);

    let variant = args.variant.as_deref().or_else(|| {
        if args.all_variants {
            return None;
        }
        let same_language = configured.unwrap_or(DEFAULT_LANGUAGE) == key;
        config.defaults.variant.as_deref().filter(|_| same_language)
    });
    (key, variant)
}

/// Every variant of `language`, each under a comment banner
fn render_all_variants(language: Language, request: &Request) -> String {
    let prefix = language.comment_prefix();
    language
        .generators()
        .iter()
        .map(|(name, generator)| format!("{} --- {} ---\n{}\n", prefix, name, generator(request)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Languages with their keys and variants
fn render_list(color: bool) -> String {
    let mut out = String::new();
    for language in Language::ALL {
        let key = format!("{:<12}", language.key());
        if color {
            out.push_str(&format!("{} {}\n", output::key(&key), output::label(language.label())));
        } else {
            out.push_str(&format!("{} {}\n", key, language.label()));
        }
        for name in language.generators().names() {
            if color {
                out.push_str(&format!("    {} {}\n", output::muted("-"), output::value(name)));
            } else {
                out.push_str(&format!("    - {}\n", name));
            }
        }
    }
    out
}

fn handle_error(error: CurlportError, debug: bool, color: bool) -> ExitStatus {
    let prefix = if color { output::error("Error:") } else { "Error:".to_string() };
    if debug {
        eprintln!("{} {:?}", prefix, error);
    } else {
        eprintln!("{} {}", prefix, error);
    }

    // All errors return the same exit code (1) following Unix conventions
    ExitStatus::Error
}

fn generate_completions(shell: Shell) {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as ClapShell};

    let mut cmd = Args::command();
    let shell = match shell {
        Shell::Bash => ClapShell::Bash,
        Shell::Zsh => ClapShell::Zsh,
        Shell::Fish => ClapShell::Fish,
        Shell::PowerShell => ClapShell::PowerShell,
        Shell::Elvish => ClapShell::Elvish,
    };

    generate(shell, &mut cmd, "curlport", &mut std::io::stdout());
}
