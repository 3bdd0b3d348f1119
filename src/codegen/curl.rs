//! `curl.exe` command lines for Windows shells
//!
//! The argument list is rebuilt from the parsed request, so flags the
//! interpreter ignores do not reappear.

use super::common::is_bare_word;
use super::VariantTable;
use crate::curl::{AuthType, BodySource, LegacyData, Request};

pub const VARIANTS: VariantTable = &[("Windows CMD", windows_cmd), ("PowerShell", powershell)];

/// Double-quoted `cmd.exe` argument
///
/// Quotes are doubled so the shell's quote state stays balanced, and
/// backslashes preceding a quote are doubled for the C runtime argument
/// parser. A newline closes the quote and is inserted with `^`.
pub fn repr_str(s: &str) -> String {
    let mut out = String::from("\"");
    let mut backslashes = 0;
    for c in s.chars() {
        match c {
            '\\' => {
                backslashes += 1;
                out.push('\\');
            }
            '"' => {
                out.push_str(&"\\".repeat(backslashes));
                out.push_str("\"\"");
                backslashes = 0;
            }
            '\n' => {
                out.push_str(&"\\".repeat(backslashes));
                out.push_str("\"^\n\n\"");
                backslashes = 0;
            }
            c => {
                out.push(c);
                backslashes = 0;
            }
        }
    }
    out.push_str(&"\\".repeat(backslashes));
    out.push('"');
    out
}

/// Single-quoted PowerShell argument
pub fn ps_str(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Method curl would pick without `-X`
fn implied_method(request: &Request) -> &'static str {
    if request.upload_file().is_some() {
        "PUT"
    } else if request.body_source() != BodySource::Empty {
        "POST"
    } else {
        "GET"
    }
}

/// Flag and value for one legacy data record
fn data_flag(data: &LegacyData) -> (&'static str, String) {
    if data.is_stdin() {
        let name = data.name.as_deref().unwrap_or_default();
        return ("--data-urlencode", format!("{}@-", name));
    }
    if data.urlencode {
        let value = match (&data.name, data.is_file) {
            (Some(name), true) => format!("{}@{}", name, data.content),
            (None, true) => format!("@{}", data.content),
            (_, false) => data.content.clone(),
        };
        return ("--data-urlencode", value);
    }
    let flag = if data.binary { "--data-binary" } else { "--data" };
    if data.is_file {
        (flag, format!("@{}", data.content))
    } else if data.content.starts_with('@') {
        ("--data-raw", data.content.clone())
    } else {
        (flag, data.content.clone())
    }
}

/// Arguments after `curl.exe`, each already quoted with `quote`
fn arguments(request: &Request, quote: fn(&str) -> String) -> Vec<String> {
    let mut args = Vec::new();

    if request.method == "HEAD" {
        args.push("-I".to_string());
    } else if request.method != implied_method(request) {
        let method = if is_bare_word(&request.method) { request.method.clone() } else { quote(&request.method) };
        args.push(format!("-X {}", method));
    }
    args.push(quote(request.url()));

    let json = matches!(request.body_source(), BodySource::Json(_));
    for (name, value) in &request.headers {
        if json && name.eq_ignore_ascii_case("content-type") && value == "application/json" {
            continue;
        }
        args.push(format!("-H {}", quote(&format!("{}: {}", name, value))));
    }

    match request.body_source() {
        BodySource::Multipart(fields) => {
            for field in fields {
                if field.is_file {
                    args.push(format!("-F {}", quote(&format!("{}=@{}", field.name, field.content))));
                } else if field.content.starts_with(['@', '<']) {
                    args.push(format!(
                        "--form-string {}",
                        quote(&format!("{}={}", field.name, field.content))
                    ));
                } else {
                    args.push(format!("-F {}", quote(&format!("{}={}", field.name, field.content))));
                }
            }
        }
        BodySource::Json(_) => {
            if let Some(text) = request.json_text() {
                args.push(format!("--json {}", quote(&text)));
            }
        }
        BodySource::DataArray(_) | BodySource::Legacy(_) => {
            for data in &request.data {
                let (flag, value) = data_flag(data);
                args.push(format!("{} {}", flag, quote(&value)));
            }
        }
        BodySource::Empty => {}
    }
    if let Some(file) = request.upload_file() {
        args.push(format!("-T {}", quote(file)));
    }

    if let Some(auth) = &request.auth {
        match auth.auth_type {
            AuthType::Basic => {}
            AuthType::Digest => args.push("--digest".to_string()),
            AuthType::Ntlm => args.push("--ntlm".to_string()),
            AuthType::Negotiate => args.push("--negotiate".to_string()),
        }
        args.push(format!("-u {}", quote(&format!("{}:{}", auth.username, auth.password))));
    }
    for file in &request.cookie_files {
        args.push(format!("-b {}", quote(file)));
    }
    if request.compressed {
        args.push("--compressed".to_string());
    }
    if request.insecure {
        args.push("-k".to_string());
    }
    if request.follow_redirects {
        args.push("-L".to_string());
    }
    if let Some(max) = request.max_redirs {
        args.push(format!("--max-redirs {}", max));
    }
    if let Some(timeout) = request.timeout {
        args.push(format!("-m {}", timeout));
    }
    if let Some(timeout) = request.connect_timeout {
        args.push(format!("--connect-timeout {}", timeout));
    }
    if let Some(proxy) = &request.proxy {
        args.push(format!("-x {}", quote(proxy)));
    }
    match request.http_version.as_deref() {
        Some("1.0") => args.push("--http1.0".to_string()),
        Some("1.1") => args.push("--http1.1".to_string()),
        Some("2") => args.push("--http2".to_string()),
        Some("3") => args.push("--http3".to_string()),
        _ => {}
    }
    if let Some(path) = &request.output_path {
        args.push(format!("-o {}", quote(path)));
    }
    args
}

fn render(args: &[String], continuation: &str) -> String {
    let mut code = String::from("curl.exe");
    for arg in args {
        code.push_str(continuation);
        code.push_str(arg);
    }
    code
}

/// `cmd.exe` with `^` line continuations
pub fn windows_cmd(request: &Request) -> String {
    render(&arguments(request, repr_str), " ^\n  ")
}

/// PowerShell with backtick line continuations
pub fn powershell(request: &Request) -> String {
    render(&arguments(request, ps_str), " `\n  ")
}
