//! GNU Wget command lines

use super::common::{comment_safe, field_summary, is_bare_word, join_literals};
use super::VariantTable;
use crate::curl::{AuthType, BodySource, DataParam, FileType, Request};

pub const VARIANTS: VariantTable = &[("Standard", standard), ("Mirror", mirror)];

/// POSIX shell single-quoted word
pub fn repr_str(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\"'\"'"))
}

/// Text placed inside a double-quoted shell word
fn dquote_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Shell command substitution producing one data item
fn substitution(param: &DataParam) -> String {
    match param {
        DataParam::Literal(s) => dquote_escape(s),
        DataParam::File(file) => {
            let input = if file.is_stdin() {
                String::new()
            } else {
                format!(" < {}", repr_str(&file.filename))
            };
            match file.filetype {
                FileType::Data => format!("$(tr -d '\\r\\n'{})", input),
                FileType::Binary | FileType::Json => format!("$(cat{})", input),
                FileType::Urlencode => {
                    let prefix = file
                        .name
                        .as_deref()
                        .map(|name| format!("{}=", dquote_escape(name)))
                        .unwrap_or_default();
                    format!("{}$(jq -sRr @uri{})", prefix, input)
                }
            }
        }
    }
}

/// `--body-data` / `--body-file` argument for the data items
fn data_arg(params: &[DataParam]) -> String {
    match params {
        [DataParam::File(file)] if file.filetype == FileType::Binary && !file.is_stdin() => {
            format!("--body-file={}", repr_str(&file.filename))
        }
        _ => match join_literals(params) {
            Some(joined) => format!("--body-data={}", repr_str(&joined)),
            None => {
                let parts: Vec<String> = params.iter().map(substitution).collect();
                format!("--body-data=\"{}\"", parts.join("&"))
            }
        },
    }
}

/// Options shared by both variants: headers, credentials and TLS
fn common_args(request: &Request, args: &mut Vec<String>) {
    for (name, value) in &request.headers {
        args.push(format!("--header={}", repr_str(&format!("{}: {}", name, value))));
    }
    if let Some(auth) = &request.auth {
        args.push(format!("--user={}", repr_str(&auth.username)));
        args.push(format!("--password={}", repr_str(&auth.password)));
        if auth.auth_type == AuthType::Basic {
            args.push("--auth-no-challenge".to_string());
        }
    }
    for file in &request.cookie_files {
        args.push(format!("--load-cookies={}", repr_str(file)));
    }
    if request.insecure {
        args.push("--no-check-certificate".to_string());
    }
    if let Some(proxy) = &request.proxy {
        args.push("-e use_proxy=yes".to_string());
        args.push(format!("-e {}", repr_str(&format!("http_proxy={}", proxy))));
        args.push(format!("-e {}", repr_str(&format!("https_proxy={}", proxy))));
    }
}

fn render(comments: &[String], args: &[String]) -> String {
    let mut code = String::new();
    for line in comments {
        code.push_str(&format!("# {}\n", line));
    }
    code.push_str("wget");
    for arg in args {
        code.push_str(" \\\n  ");
        code.push_str(arg);
    }
    code
}

/// One request, printing the response body to stdout unless `-o` was given
pub fn standard(request: &Request) -> String {
    let mut comments = Vec::new();
    let mut args = Vec::new();

    if request.method != "GET" {
        let method = if is_bare_word(&request.method) { request.method.clone() } else { repr_str(&request.method) };
        args.push(format!("--method={}", method));
    }
    common_args(request, &mut args);

    match request.body_source() {
        BodySource::Multipart(fields) => {
            comments.push("wget cannot send multipart/form-data; fields:".to_string());
            for field in fields {
                comments.push(format!("  {}", field_summary(field)));
            }
        }
        BodySource::Json(_) => {
            if let Some(text) = request.json_text() {
                if request.header("Content-Type").is_none() {
                    args.push(format!("--header={}", repr_str("Content-Type: application/json")));
                }
                args.push(format!("--body-data={}", repr_str(&text)));
            }
        }
        BodySource::DataArray(_) | BodySource::Legacy(_) => {
            let params = request.data_params();
            if params.iter().any(|p| p.as_file().is_some_and(|f| f.filetype == FileType::Urlencode)) {
                comments.push("requires jq for percent-encoding file contents".to_string());
            }
            args.push(data_arg(&params));
        }
        BodySource::Empty => {
            if let Some(file) = request.upload_file() {
                args.push(format!("--body-file={}", repr_str(file)));
            }
        }
    }

    if request.compressed {
        args.push("--compression=auto".to_string());
    }
    if let Some(timeout) = request.timeout {
        args.push(format!("--timeout={}", timeout));
    }
    if let Some(timeout) = request.connect_timeout {
        args.push(format!("--connect-timeout={}", timeout));
    }
    if !request.follow_redirects {
        args.push("--max-redirect=0".to_string());
    } else if let Some(max) = request.max_redirs {
        args.push(format!("--max-redirect={}", max));
    }
    match &request.output_path {
        Some(path) => args.push(format!("--output-document={}", repr_str(path))),
        None => {
            args.push("--quiet".to_string());
            args.push("--output-document=-".to_string());
        }
    }
    args.push(repr_str(request.url()));

    render(&comments, &args)
}

/// Recursive site mirror rooted at the request URL
pub fn mirror(request: &Request) -> String {
    let mut comments = Vec::new();
    let mut args = vec![
        "--mirror".to_string(),
        "--convert-links".to_string(),
        "--adjust-extension".to_string(),
        "--page-requisites".to_string(),
        "--no-parent".to_string(),
    ];
    if request.method != "GET" {
        comments.push(format!(
            "mirroring always uses GET; the {} method is dropped",
            comment_safe(&request.method)
        ));
    }
    if request.body_source() != BodySource::Empty {
        comments.push("request body is not sent when mirroring".to_string());
    }
    common_args(request, &mut args);
    args.push(repr_str(request.url()));

    render(&comments, &args)
}

#[cfg(test)]
mod tests {
    use super::super::common::testing::{parse, TRICKY};
    use super::*;

    /// Concatenation of single- and double-quoted shell segments
    fn unquote(word: &str) -> String {
        let mut out = String::new();
        let mut chars = word.chars();
        while let Some(c) = chars.next() {
            match c {
                '\'' => out.extend(chars.by_ref().take_while(|&c| c != '\'')),
                '"' => out.extend(chars.by_ref().take_while(|&c| c != '"')),
                other => out.push(other),
            }
        }
        out
    }

    #[test]
    fn test_repr_str_round_trip() {
        assert_eq!(repr_str("it's"), "'it'\"'\"'s'");
        assert_eq!(unquote(&repr_str(TRICKY)), TRICKY);
        assert_eq!(repr_str("$HOME \\n"), "'$HOME \\n'");
    }

    #[test]
    fn test_standard_get() {
        let code = standard(&Request::get("https://example.com"));
        assert_eq!(
            code,
            "wget \\\n  --max-redirect=0 \\\n  --quiet \\\n  --output-document=- \\\n  'https://example.com'"
        );
    }

    #[test]
    fn test_standard_post_data() {
        let request = parse("curl -L -d 'a=1' -d 'b=2' -H 'X-Id: 7' https://example.com/f");
        let code = standard(&request);
        assert!(code.contains("--method=POST"));
        assert!(code.contains("--header='X-Id: 7'"));
        assert!(code.contains("--body-data='a=1&b=2'"));
        assert!(!code.contains("--max-redirect"));
    }

    #[test]
    fn test_odd_method_is_quoted() {
        let code = standard(&parse("curl -X 'GET & calc' https://example.com"));
        assert!(code.contains("--method='GET & calc'"));
        assert!(standard(&parse("curl -X PURGE https://example.com")).contains("--method=PURGE"));
    }

    #[test]
    fn test_file_data_uses_substitution() {
        let request = parse("curl -d 'x=1' -d @notes.txt https://example.com");
        let code = standard(&request);
        assert!(code.contains("--body-data=\"x=1&$(tr -d '\\r\\n' < 'notes.txt')\""));

        let request = parse("curl --data-binary @blob.bin https://example.com");
        assert!(standard(&request).contains("--body-file='blob.bin'"));
    }

    #[test]
    fn test_json_header_not_duplicated() {
        let request = parse(r#"curl --json '{"a":1}' https://example.com"#);
        let code = standard(&request);
        assert_eq!(code.matches("Content-Type: application/json").count(), 1);
        assert!(code.contains("--body-data='{\"a\":1}'"));
    }

    #[test]
    fn test_mirror() {
        let request = parse("curl -u bob:pw -k https://example.com/docs/");
        let code = mirror(&request);
        assert!(code.starts_with("wget \\\n  --mirror \\\n  --convert-links"));
        assert!(code.contains("--user='bob'"));
        assert!(code.contains("--no-check-certificate"));
        assert!(code.ends_with("'https://example.com/docs/'"));
    }
}
