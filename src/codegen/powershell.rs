//! PowerShell generators: `Invoke-WebRequest` and `Invoke-RestMethod`
//!
//! Parameters are passed by splatting a hashtable. Targets PowerShell 7.

use super::common::join_literals;
use super::VariantTable;
use crate::curl::{AuthType, BodySource, DataParam, FileType, Request};

pub const VARIANTS: VariantTable = &[("WebRequest", web_request), ("RestMethod", rest_method)];

/// PowerShell double-quoted string with backtick escapes
pub fn repr_str(s: &str) -> String {
    let mut out = String::from("\"");
    for c in s.chars() {
        match c {
            '`' | '"' | '$' => {
                out.push('`');
                out.push(c);
            }
            '\n' => out.push_str("`n"),
            '\r' => out.push_str("`r"),
            '\t' => out.push_str("`t"),
            '\0' => out.push_str("`0"),
            c if c.is_control() => out.push_str(&format!("$([char]0x{:x})", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// String expression for the data items, reading files with `Get-Content`
fn data_expr(params: &[DataParam]) -> String {
    if let Some(joined) = join_literals(params) {
        return repr_str(&joined);
    }
    let parts: Vec<String> = params
        .iter()
        .map(|param| match param {
            DataParam::Literal(s) => repr_str(s),
            DataParam::File(file) => {
                let read = if file.is_stdin() {
                    "[Console]::In.ReadToEnd()".to_string()
                } else {
                    format!("(Get-Content -Raw -Path {})", repr_str(&file.filename))
                };
                match file.filetype {
                    FileType::Data => format!("({} -replace '[\\r\\n]', '')", read),
                    FileType::Binary | FileType::Json => read,
                    FileType::Urlencode => {
                        let encoded = format!("[uri]::EscapeDataString({})", read);
                        match &file.name {
                            Some(name) => format!("{} + {}", repr_str(&format!("{}=", name)), encoded),
                            None => encoded,
                        }
                    }
                }
            }
        })
        .collect();
    format!("({})", parts.join(" + \"&\" + "))
}

/// Splatted parameter table shared by both cmdlets
fn splat(request: &Request) -> Vec<String> {
    let mut params = vec![
        format!("    Uri = {}", repr_str(request.url())),
        format!("    Method = {}", repr_str(&request.method)),
    ];

    let content_type = request.header("Content-Type");
    let multipart = matches!(request.body_source(), BodySource::Multipart(_));

    let mut headers: Vec<String> = request
        .headers_without_content_type()
        .map(|(k, v)| format!("        {} = {}", repr_str(k), repr_str(v)))
        .collect();
    if let Some(auth) = request.auth.as_ref().filter(|a| a.auth_type == AuthType::Basic) {
        headers.push(format!(
            "        \"Authorization\" = \"Basic \" + [Convert]::ToBase64String([Text.Encoding]::UTF8.GetBytes({}))",
            repr_str(&format!("{}:{}", auth.username, auth.password))
        ));
    }
    if !headers.is_empty() {
        params.push(format!("    Headers = @{{\n{}\n    }}", headers.join("\n")));
    }
    if let (Some(content_type), false) = (content_type, multipart) {
        params.push(format!("    ContentType = {}", repr_str(content_type)));
    }

    match request.body_source() {
        BodySource::Multipart(fields) => {
            let entries: Vec<String> = fields
                .iter()
                .map(|field| {
                    let value = if field.is_file {
                        format!("Get-Item -Path {}", repr_str(&field.content))
                    } else {
                        repr_str(&field.content)
                    };
                    format!("        {} = {}", repr_str(&field.name), value)
                })
                .collect();
            params.push(format!("    Form = @{{\n{}\n    }}", entries.join("\n")));
        }
        BodySource::Json(_) => {
            if let Some(text) = request.json_text() {
                params.push(format!("    Body = {}", repr_str(&text)));
            }
        }
        BodySource::DataArray(_) | BodySource::Legacy(_) => {
            let data = request.data_params();
            match data.as_slice() {
                [DataParam::File(file)] if file.filetype == FileType::Binary && !file.is_stdin() => {
                    params.push(format!("    InFile = {}", repr_str(&file.filename)));
                }
                _ => params.push(format!("    Body = {}", data_expr(&data))),
            }
        }
        BodySource::Empty => {
            if let Some(file) = request.upload_file() {
                params.push(format!("    InFile = {}", repr_str(file)));
            }
        }
    }

    if let Some(auth) = request.auth.as_ref().filter(|a| a.auth_type != AuthType::Basic) {
        params.push(format!(
            "    Credential = New-Object System.Management.Automation.PSCredential({}, (ConvertTo-SecureString {} -AsPlainText -Force))",
            repr_str(&auth.username),
            repr_str(&auth.password)
        ));
    }
    if request.insecure {
        params.push("    SkipCertificateCheck = $true".to_string());
    }
    if let Some(timeout) = request.timeout {
        params.push(format!("    TimeoutSec = {}", timeout.ceil() as u64));
    }
    if let Some(proxy) = &request.proxy {
        params.push(format!("    Proxy = {}", repr_str(proxy)));
    }
    if let Some(max) = request.max_redirs {
        params.push(format!("    MaximumRedirection = {}", max));
    }
    if let Some(path) = &request.output_path {
        params.push(format!("    OutFile = {}", repr_str(path)));
    }
    params
}

fn render(request: &Request, cmdlet: &str, output: &str) -> String {
    let mut code = format!("$params = @{{\n{}\n}}\n\n", splat(request).join("\n"));
    code.push_str(&format!("$response = {} @params\n", cmdlet));
    code.push_str(&format!("Write-Output {}", output));
    code
}

/// `Invoke-WebRequest`, printing the response content
pub fn web_request(request: &Request) -> String {
    render(request, "Invoke-WebRequest", "$response.Content")
}

/// `Invoke-RestMethod`, printing the deserialized response
pub fn rest_method(request: &Request) -> String {
    render(request, "Invoke-RestMethod", "$response")
}

#[cfg(test)]
mod tests {
    use super::super::common::testing::{parse, strip_quotes, TRICKY};
    use super::*;

    fn unescape(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c != '`' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('0') => out.push('\0'),
                Some(other) => out.push(other),
                None => {}
            }
        }
        out
    }

    #[test]
    fn test_repr_str_round_trip() {
        let literal = repr_str(TRICKY);
        assert!(!literal.contains('\n'));
        assert_eq!(unescape(strip_quotes(&literal)), TRICKY);
        assert_eq!(repr_str("$env:HOME `x`"), "\"`$env:HOME ``x``\"");
    }

    #[test]
    fn test_web_request_get() {
        let code = web_request(&Request::get("https://example.com"));
        assert!(code.starts_with("$params = @{\n    Uri = \"https://example.com\"\n    Method = \"GET\"\n}"));
        assert!(code.contains("$response = Invoke-WebRequest @params"));
        assert!(code.ends_with("Write-Output $response.Content"));
    }

    #[test]
    fn test_rest_method_json() {
        let request = parse(r#"curl --json '{"a":"b"}' -H 'X-Token: t' https://example.com"#);
        let code = rest_method(&request);
        assert!(code.contains("        \"X-Token\" = \"t\""));
        assert!(code.contains("    ContentType = \"application/json\""));
        assert!(code.contains("    Body = \"{`\"a`\":`\"b`\"}\""));
        assert!(code.ends_with("Write-Output $response"));
    }

    #[test]
    fn test_binary_file_uses_in_file() {
        let request = parse("curl --data-binary @blob.bin https://example.com");
        assert!(web_request(&request).contains("    InFile = \"blob.bin\""));
    }

    #[test]
    fn test_multipart_form() {
        let request = parse("curl -F 'up=@x.zip' -F 'tag=v1' https://example.com");
        let code = web_request(&request);
        assert!(code.contains("    Form = @{\n        \"up\" = Get-Item -Path \"x.zip\"\n        \"tag\" = \"v1\"\n    }"));
    }
}
