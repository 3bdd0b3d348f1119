//! curl command interpreter
//!
//! Walks the token stream once and accumulates a [`Request`]. Unknown flags
//! are skipped without consuming a value, and a flag whose value is missing is
//! dropped; conversion is best effort, not validation.
//!
//! # Example
//!
//! ```
//! use curlport::curl::parse_curl_command;
//!
//! let outcome = parse_curl_command("curl -d 'name=John' https://example.com");
//! let request = outcome.request.unwrap();
//! assert_eq!(request.method, "POST");
//! ```

use serde::Serialize;
use tracing::debug;

use super::request::{
    AuthConfig, AuthType, DataParam, FileData, FileType, FormParam, LegacyData, Request, RequestUrl,
};
use super::tokenizer::{normalize, tokenize};
use crate::errors::CurlportError;

/// Message returned when the text is not a curl invocation
pub const NOT_A_CURL_COMMAND: &str = "Command must start with \"curl\" or \"curl.exe\"";

/// Result of a conversion call: exactly one of the two fields is set
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<Request>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ParseOutcome {
    fn ok(request: Request) -> Self {
        Self { request: Some(request), error: None }
    }

    fn err(message: impl Into<String>) -> Self {
        Self { request: None, error: Some(message.into()) }
    }

    pub fn is_ok(&self) -> bool {
        self.request.is_some()
    }

    pub fn into_result(self) -> Result<Request, CurlportError> {
        match (self.request, self.error) {
            (Some(request), _) => Ok(request),
            (None, Some(error)) if error == NOT_A_CURL_COMMAND => Err(CurlportError::InvalidCommand(error)),
            (None, error) => Err(CurlportError::Parse(error.unwrap_or_else(|| "Parse error".to_string()))),
        }
    }
}

/// Parse a curl command line into a [`Request`].
///
/// The only failure is text that is not a curl invocation; everything else
/// degrades to a best-effort request.
pub fn parse_curl_command(command: &str) -> ParseOutcome {
    let normalized = normalize(command);
    let tokens = tokenize(&normalized);

    let is_curl = tokens
        .first()
        .map(|program| {
            let program = program.to_ascii_lowercase();
            program == "curl" || program == "curl.exe"
        })
        .unwrap_or(false);
    if !is_curl {
        return ParseOutcome::err(NOT_A_CURL_COMMAND);
    }

    debug!(tokens = tokens.len(), "tokenized curl command");

    ParseOutcome::ok(parse_tokens(&tokens))
}

/// Interpreter state for a single scan
struct Interpreter<'a> {
    tokens: &'a [String],
    pos: usize,
    request: Request,
    explicit_method: bool,
    has_data: bool,
    auth_type: AuthType,
    pending_upload: Option<String>,
}

/// Interpret tokens (program name first) into a [`Request`]
pub fn parse_tokens(tokens: &[String]) -> Request {
    let mut interp = Interpreter {
        tokens,
        pos: 1,
        request: Request::default(),
        explicit_method: false,
        has_data: false,
        auth_type: AuthType::Basic,
        pending_upload: None,
    };

    while interp.pos < tokens.len() {
        interp.step();
        interp.pos += 1;
    }

    interp.finish()
}

impl<'a> Interpreter<'a> {
    /// Consume and return the value token following the current flag
    fn value(&mut self) -> Option<&'a str> {
        let next = self.tokens.get(self.pos + 1)?;
        self.pos += 1;
        Some(next.as_str())
    }

    fn step(&mut self) {
        let tokens = self.tokens;
        let token = tokens[self.pos].as_str();

        if !token.starts_with('-') {
            self.add_url(token);
            return;
        }

        match token {
            "-X" | "--request" => {
                self.request.method = self.value().unwrap_or("GET").to_string();
                self.explicit_method = true;
            }
            "-H" | "--header" => {
                if let Some((name, value)) = self.value().and_then(parse_header) {
                    self.request.headers.insert(name, value);
                }
            }
            "-d" | "--data" | "--data-ascii" => {
                if let Some(data) = self.value().filter(|v| !v.is_empty()) {
                    self.add_data(data, FileType::Data, true);
                }
            }
            "--data-raw" => {
                if let Some(data) = self.value().filter(|v| !v.is_empty()) {
                    self.add_data(data, FileType::Data, false);
                    self.request.is_data_raw = true;
                }
            }
            "--data-binary" => {
                if let Some(data) = self.value().filter(|v| !v.is_empty()) {
                    self.add_data(data, FileType::Binary, true);
                    self.request.is_data_binary = true;
                }
            }
            "--data-urlencode" => {
                if let Some(data) = self.value().filter(|v| !v.is_empty()) {
                    self.add_urlencoded(data);
                }
            }
            "--json" => {
                if let Some(data) = self.value().filter(|v| !v.is_empty()) {
                    self.set_json(data);
                }
            }
            "-u" | "--user" => {
                if let Some(user) = self.value().filter(|v| !v.is_empty()) {
                    let (username, password) = user.split_once(':').unwrap_or((user, ""));
                    self.request.auth = Some(AuthConfig {
                        auth_type: self.auth_type,
                        username: username.to_string(),
                        password: password.to_string(),
                    });
                }
            }
            "--basic" => self.set_auth_type(AuthType::Basic),
            "--digest" => self.set_auth_type(AuthType::Digest),
            "--ntlm" => self.set_auth_type(AuthType::Ntlm),
            "--negotiate" => self.set_auth_type(AuthType::Negotiate),
            "-F" | "--form" => {
                if let Some(field) = self.value().filter(|v| !v.is_empty()) {
                    self.add_form(field, true);
                }
            }
            "--form-string" => {
                if let Some(field) = self.value().filter(|v| !v.is_empty()) {
                    self.add_form(field, false);
                }
            }
            "--compressed" => self.request.compressed = true,
            "-k" | "--insecure" => self.request.insecure = true,
            "-L" | "--location" => self.request.follow_redirects = true,
            "--max-redirs" => {
                if let Some(n) = self.value() {
                    self.request.max_redirs = n.parse().ok();
                }
            }
            "-m" | "--max-time" => {
                if let Some(n) = self.value() {
                    self.request.timeout = parse_seconds(n);
                }
            }
            "--connect-timeout" => {
                if let Some(n) = self.value() {
                    self.request.connect_timeout = parse_seconds(n);
                }
            }
            "-x" | "--proxy" => {
                if let Some(proxy) = self.value() {
                    self.request.proxy = Some(proxy.to_string());
                }
            }
            "-A" | "--user-agent" => {
                if let Some(agent) = self.value() {
                    self.request.headers.insert("User-Agent".to_string(), agent.to_string());
                }
            }
            "-e" | "--referer" => {
                if let Some(referer) = self.value() {
                    self.request.headers.insert("Referer".to_string(), referer.to_string());
                }
            }
            "-b" | "--cookie" => {
                if let Some(cookie) = self.value() {
                    if cookie.contains('=') {
                        self.request.headers.insert("Cookie".to_string(), cookie.to_string());
                    } else {
                        self.request.cookie_files.push(cookie.to_string());
                    }
                }
            }
            "-o" | "--output" => {
                if let Some(path) = self.value() {
                    self.request.output_path = Some(path.to_string());
                }
            }
            "-I" | "--head" => {
                self.request.method = "HEAD".to_string();
                self.explicit_method = true;
            }
            "-0" | "--http1.0" => self.request.http_version = Some("1.0".to_string()),
            "--http1.1" => self.request.http_version = Some("1.1".to_string()),
            "--http2" => self.request.http_version = Some("2".to_string()),
            "--http3" => self.request.http_version = Some("3".to_string()),
            "-T" | "--upload-file" => {
                if let Some(file) = self.value() {
                    self.set_upload_file(file);
                }
            }
            "--url" => {
                if let Some(url) = self.value() {
                    self.add_url(url);
                }
            }
            other => {
                debug!(flag = other, "ignoring unsupported flag");
            }
        }
    }

    fn finish(mut self) -> Request {
        if self.has_data && !self.explicit_method && self.request.method == "GET" {
            self.request.method = "POST".to_string();
        }
        self.request
    }

    fn add_url(&mut self, text: &str) {
        let mut entry = RequestUrl::new(text);
        entry.upload_file = self.pending_upload.take();
        self.request.urls.push(entry);
    }

    fn set_upload_file(&mut self, file: &str) {
        match self.request.urls.last_mut() {
            Some(url) if url.upload_file.is_none() => url.upload_file = Some(file.to_string()),
            _ => self.pending_upload = Some(file.to_string()),
        }
        if !self.explicit_method {
            self.request.method = "PUT".to_string();
        }
    }

    fn set_auth_type(&mut self, auth_type: AuthType) {
        self.auth_type = auth_type;
        if let Some(auth) = self.request.auth.as_mut() {
            auth.auth_type = auth_type;
        }
    }

    /// `-d`, `--data-raw`, `--data-binary`; `@` marks a file when allowed
    fn add_data(&mut self, data: &str, filetype: FileType, allow_file: bool) {
        let binary = filetype == FileType::Binary;
        match data.strip_prefix('@').filter(|_| allow_file) {
            Some(filename) => {
                self.request.data.push(LegacyData {
                    content: filename.to_string(),
                    is_file: true,
                    binary,
                    ..Default::default()
                });
                self.push_file(filetype, filename, None);
            }
            None => {
                self.request.data.push(LegacyData {
                    content: data.to_string(),
                    binary,
                    ..Default::default()
                });
                self.request.data_array.push(DataParam::Literal(data.to_string()));
            }
        }
        self.has_data = true;
    }

    /// `--data-urlencode` in its five shapes
    fn add_urlencoded(&mut self, data: &str) {
        let named_file = data
            .split_once('=')
            .and_then(|(name, value)| value.strip_prefix('@').map(|file| (name, file)));

        if let Some((name, filename)) = named_file {
            // name=@filename
            self.request.data.push(LegacyData {
                content: filename.to_string(),
                is_file: true,
                urlencode: true,
                name: Some(name.to_string()),
                ..Default::default()
            });
            self.push_file(FileType::Urlencode, filename, Some(name));
        } else if let Some(filename) = data.strip_prefix('@') {
            // @filename
            self.request.data.push(LegacyData {
                content: filename.to_string(),
                is_file: true,
                urlencode: true,
                ..Default::default()
            });
            self.push_file(FileType::Urlencode, filename, None);
        } else if let Some((name, source)) = data.split_once('@').filter(|_| !data.contains('=')) {
            // name@source, where "-" is standard input
            let name = Some(name.to_string()).filter(|n| !n.is_empty());
            let is_stdin = source == "-";
            self.request.data.push(LegacyData {
                content: source.to_string(),
                is_file: !is_stdin,
                urlencode: true,
                name: name.clone(),
                ..Default::default()
            });
            if is_stdin {
                self.request.data_array.push(DataParam::File(FileData {
                    filetype: FileType::Urlencode,
                    filename: source.to_string(),
                    name,
                }));
            } else {
                self.push_file(FileType::Urlencode, source, name.as_deref());
            }
        } else {
            // name=value or a bare value
            self.request.data.push(LegacyData {
                content: data.to_string(),
                urlencode: true,
                ..Default::default()
            });
            self.request.data_array.push(DataParam::Literal(data.to_string()));
        }
        self.has_data = true;
    }

    fn push_file(&mut self, filetype: FileType, filename: &str, name: Option<&str>) {
        self.request.data_array.push(DataParam::File(FileData {
            filetype,
            filename: filename.to_string(),
            name: name.map(str::to_string),
        }));
        self.request.data_reads_file = Some(filename.to_string());
    }

    fn set_json(&mut self, data: &str) {
        let value = serde_json::from_str(data)
            .unwrap_or_else(|_| serde_json::Value::String(data.to_string()));
        self.request.json = Some(value);
        if !self.explicit_method {
            self.request.method = "POST".to_string();
        }
        self.request
            .headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self.has_data = true;
    }

    fn add_form(&mut self, field: &str, allow_file: bool) {
        let (name, content) = field.split_once('=').unwrap_or((field, ""));
        let file = content
            .strip_prefix('@')
            .or_else(|| content.strip_prefix('<'))
            .filter(|_| allow_file);

        self.request.multipart_uploads.push(match file {
            Some(path) => FormParam {
                name: name.to_string(),
                content: path.to_string(),
                is_file: true,
                content_file: Some(path.to_string()),
            },
            None => FormParam {
                name: name.to_string(),
                content: content.to_string(),
                is_file: false,
                content_file: None,
            },
        });
        self.has_data = true;
    }
}

/// Parse a header string "Name: Value"
fn parse_header(header: &str) -> Option<(String, String)> {
    let (name, value) = header.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}

/// A finite, non-negative number of seconds
fn parse_seconds(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|t| t.is_finite() && *t >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(cmd: &str) -> Request {
        parse_curl_command(cmd).request.unwrap()
    }

    #[test]
    fn test_simple_get() {
        let request = parse("curl https://example.com");
        assert_eq!(request.url(), "https://example.com");
        assert_eq!(request.method, "GET");
    }

    #[test]
    fn test_rejects_other_programs() {
        let outcome = parse_curl_command("wget https://example.com");
        assert!(outcome.request.is_none());
        assert_eq!(outcome.error.as_deref(), Some(NOT_A_CURL_COMMAND));

        assert!(!parse_curl_command("").is_ok());
        assert!(parse_curl_command("CURL.EXE https://example.com").is_ok());
    }

    #[test]
    fn test_curlish_prefix_is_not_curl() {
        assert!(!parse_curl_command("curlie https://example.com").is_ok());
    }

    #[test]
    fn test_parse_header_splits_on_first_colon() {
        assert_eq!(
            parse_header("Host:  example.com:8080 "),
            Some(("Host".to_string(), "example.com:8080".to_string()))
        );
        assert_eq!(parse_header("NoColon"), None);
    }

    #[test]
    fn test_missing_value_is_ignored() {
        let request = parse("curl https://example.com -H");
        assert!(request.headers.is_empty());
        let request = parse("curl https://example.com -X");
        assert_eq!(request.method, "GET");
    }

    #[test]
    fn test_unknown_flag_does_not_consume_value() {
        let request = parse("curl --frobnicate https://example.com");
        assert_eq!(request.url(), "https://example.com");
    }

    #[test]
    fn test_data_raw_keeps_at_sign() {
        let request = parse("curl --data-raw '@literal' https://example.com");
        assert!(!request.data[0].is_file);
        assert_eq!(request.data_array, vec![DataParam::Literal("@literal".to_string())]);
        assert!(request.is_data_raw);
        assert!(request.data_reads_file.is_none());
    }

    #[test]
    fn test_timeouts_must_be_finite_and_non_negative() {
        let request = parse("curl -m 2.5 --connect-timeout 0 https://example.com");
        assert_eq!(request.timeout, Some(2.5));
        assert_eq!(request.connect_timeout, Some(0.0));

        for bad in ["inf", "NaN", "-1", "soon"] {
            let request = parse(&format!("curl -m {0} --connect-timeout {0} https://example.com", bad));
            assert!(request.timeout.is_none(), "{}", bad);
            assert!(request.connect_timeout.is_none(), "{}", bad);
        }
    }

    #[test]
    fn test_empty_header_name_is_skipped() {
        let request = parse("curl -H ':x' -H '  : y' -H 'A: 1' https://example.com");
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.header("A"), Some("1"));
    }

    #[test]
    fn test_stdin_data_reads_dash() {
        let request = parse("curl -d @- https://example.com");
        assert_eq!(request.data_reads_file.as_deref(), Some("-"));

        let request = parse("curl --data-binary @- https://example.com");
        assert_eq!(request.data_reads_file.as_deref(), Some("-"));
    }

    #[test]
    fn test_auth_type_flag_after_user() {
        let request = parse("curl -u bob:pw --digest https://example.com");
        let auth = request.auth.unwrap();
        assert_eq!(auth.auth_type, AuthType::Digest);
        assert_eq!(auth.username, "bob");
    }

    #[test]
    fn test_upload_file_attaches_to_url() {
        let request = parse("curl -T report.csv https://example.com/upload");
        assert_eq!(request.method, "PUT");
        assert_eq!(request.urls[0].upload_file.as_deref(), Some("report.csv"));
    }

    #[test]
    fn test_into_result() {
        assert!(matches!(
            parse_curl_command("http GET x").into_result(),
            Err(CurlportError::InvalidCommand(_))
        ));
        assert!(parse_curl_command("curl x").into_result().is_ok());
    }
}
