//! Python generators: `requests` and the standard library `http.client`

use serde_json::Value;

use super::common::{backslash_escape, field_summary, join_literals, unicode_u4, url_parts};
use super::VariantTable;
use crate::curl::{AuthType, BodySource, DataParam, FileType, FormParam, Request};

pub const VARIANTS: VariantTable = &[("Requests", requests), ("HTTP Client", http_client)];

/// Python string literal in single quotes
pub fn repr_str(s: &str) -> String {
    format!("'{}'", backslash_escape(s, '\'', unicode_u4))
}

/// Python literal for a JSON value, nested containers indented by four spaces
fn repr_json(value: &Value, level: usize) -> String {
    let pad = "    ".repeat(level + 1);
    let close = "    ".repeat(level);
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => repr_str(s),
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items
                .iter()
                .map(|item| format!("{}{}", pad, repr_json(item, level + 1)))
                .collect();
            format!("[\n{},\n{}]", items.join(",\n"), close)
        }
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(map) => {
            let items: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}{}: {}", pad, repr_str(k), repr_json(v, level + 1)))
                .collect();
            format!("{{\n{},\n{}}}", items.join(",\n"), close)
        }
    }
}

fn headers_dict<'a>(headers: impl Iterator<Item = (&'a String, &'a String)>) -> Option<String> {
    let entries: Vec<String> = headers
        .map(|(k, v)| format!("    {}: {},\n", repr_str(k), repr_str(v)))
        .collect();
    if entries.is_empty() {
        return None;
    }
    Some(format!("headers = {{\n{}}}\n\n", entries.concat()))
}

/// Collects imports while the body is rendered
#[derive(Default)]
struct Imports(Vec<&'static str>);

impl Imports {
    fn add(&mut self, line: &'static str) {
        if !self.0.contains(&line) {
            self.0.push(line);
        }
    }

    fn render(&self) -> String {
        let mut out = self.0.join("\n");
        out.push_str("\n\n");
        out
    }
}

/// Build `var` from the data items, reading files and stdin where referenced
fn data_builder(var: &str, params: &[DataParam], binary: bool, imports: &mut Imports) -> String {
    if let Some(joined) = join_literals(params) {
        return format!("{} = {}\n\n", var, repr_str(&joined));
    }

    let encode = if binary { ".encode()" } else { "" };
    let mut code = format!("{} = {}\n", var, if binary { "b''" } else { "''" });

    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            code.push_str(&format!("{} += '&'{}\n", var, encode));
        }
        match param {
            DataParam::Literal(s) => {
                code.push_str(&format!("{} += {}{}\n", var, repr_str(s), encode));
            }
            DataParam::File(file) => {
                let read = if file.is_stdin() {
                    imports.add("import sys");
                    if file.filetype == FileType::Binary {
                        "sys.stdin.buffer.read()"
                    } else {
                        "sys.stdin.read()"
                    }
                } else {
                    "f.read()"
                };
                let value = match file.filetype {
                    FileType::Urlencode => {
                        imports.add("from urllib.parse import quote_plus");
                        let prefix = file
                            .name
                            .as_ref()
                            .map(|name| format!("{} + ", repr_str(&format!("{}=", name))))
                            .unwrap_or_default();
                        format!("{}quote_plus({}){}", prefix, read, encode)
                    }
                    FileType::Data => format!("{}.replace('\\n', '').replace('\\r', ''){}", read, encode),
                    FileType::Binary => read.to_string(),
                    FileType::Json => format!("{}{}", read, encode),
                };

                if file.is_stdin() {
                    code.push_str(&format!("{} += {}\n", var, value));
                } else {
                    let mode = if file.filetype == FileType::Binary { ", 'rb'" } else { "" };
                    code.push_str(&format!("with open({}{}) as f:\n", repr_str(&file.filename), mode));
                    code.push_str(&format!("    {} += {}\n", var, value));
                }
            }
        }
    }
    code.push('\n');
    code
}

fn files_dict(fields: &[FormParam]) -> String {
    let mut code = String::from("files = {\n");
    for field in fields {
        if field.is_file {
            code.push_str(&format!(
                "    {}: open({}, 'rb'),\n",
                repr_str(&field.name),
                repr_str(&field.content)
            ));
        } else {
            code.push_str(&format!(
                "    {}: (None, {}),\n",
                repr_str(&field.name),
                repr_str(&field.content)
            ));
        }
    }
    code.push_str("}\n\n");
    code
}

/// `requests` with the shortcut function for standard methods
pub fn requests(request: &Request) -> String {
    let mut imports = Imports::default();
    imports.add("import requests");

    let mut body = String::new();
    let mut kwargs: Vec<String> = Vec::new();
    let structured_json = matches!(request.body_source(), BodySource::Json(v) if !v.is_string());

    let headers = if structured_json {
        headers_dict(request.headers_without_content_type())
    } else {
        headers_dict(request.headers.iter())
    };
    if let Some(headers) = headers {
        body.push_str(&headers);
        kwargs.push("headers=headers".to_string());
    }

    match request.body_source() {
        BodySource::Multipart(fields) => {
            body.push_str(&files_dict(fields));
            kwargs.push("files=files".to_string());
        }
        BodySource::Json(Value::String(raw)) => {
            body.push_str(&format!("data = {}\n\n", repr_str(raw)));
            kwargs.push("data=data".to_string());
        }
        BodySource::Json(value) => {
            body.push_str(&format!("json_data = {}\n\n", repr_json(value, 0)));
            kwargs.push("json=json_data".to_string());
        }
        BodySource::DataArray(_) | BodySource::Legacy(_) => {
            body.push_str(&data_builder("data", &request.data_params(), request.is_data_binary, &mut imports));
            kwargs.push("data=data".to_string());
        }
        BodySource::Empty => {
            if let Some(file) = request.upload_file() {
                body.push_str(&format!("with open({}, 'rb') as f:\n    data = f.read()\n\n", repr_str(file)));
                kwargs.push("data=data".to_string());
            }
        }
    }

    if let Some(auth) = &request.auth {
        let credentials = format!("{}, {}", repr_str(&auth.username), repr_str(&auth.password));
        match auth.auth_type {
            AuthType::Basic => kwargs.push(format!("auth=({})", credentials)),
            AuthType::Digest => {
                imports.add("from requests.auth import HTTPDigestAuth");
                kwargs.push(format!("auth=HTTPDigestAuth({})", credentials));
            }
            AuthType::Ntlm => {
                imports.add("from requests_ntlm import HttpNtlmAuth");
                kwargs.push(format!("auth=HttpNtlmAuth({})", credentials));
            }
            AuthType::Negotiate => {
                imports.add("from requests_kerberos import HTTPKerberosAuth");
                kwargs.push("auth=HTTPKerberosAuth()".to_string());
            }
        }
    }

    if let Some(proxy) = &request.proxy {
        body.push_str(&format!(
            "proxies = {{\n    'http': {0},\n    'https': {0},\n}}\n\n",
            repr_str(proxy)
        ));
        kwargs.push("proxies=proxies".to_string());
    }
    if request.insecure {
        kwargs.push("verify=False".to_string());
    }
    if let Some(timeout) = request.timeout {
        kwargs.push(format!("timeout={}", timeout));
    }
    if request.method == "HEAD" && request.follow_redirects {
        kwargs.push("allow_redirects=True".to_string());
    }

    let url = repr_str(request.url());
    let call = match request.method.as_str() {
        "GET" | "POST" | "PUT" | "PATCH" | "DELETE" | "HEAD" | "OPTIONS" => {
            let mut args = vec![url];
            args.extend(kwargs);
            format!("requests.{}({})", request.method.to_lowercase(), args.join(", "))
        }
        other => {
            let mut args = vec![repr_str(other), url];
            args.extend(kwargs);
            format!("requests.request({})", args.join(", "))
        }
    };

    let mut code = imports.render();
    code.push_str(&body);
    code.push_str(&format!("response = {}\n", call));
    match &request.output_path {
        Some(path) => code.push_str(&format!(
            "\nwith open({}, 'wb') as f:\n    f.write(response.content)",
            repr_str(path)
        )),
        None => code.push_str("print(response.text)"),
    }
    code
}

/// Standard library `http.client`
pub fn http_client(request: &Request) -> String {
    let parts = url_parts(request.url());
    let mut imports = Imports::default();
    imports.add("import http.client");
    imports.add("from urllib.parse import urlparse");

    let connection = if parts.scheme == "https" { "HTTPSConnection" } else { "HTTPConnection" };
    let mut body = format!("url = urlparse({})\n", repr_str(request.url()));
    body.push_str("path = (url.path or '/') + ('?' + url.query if url.query else '')\n");
    body.push_str(&format!("conn = http.client.{}(url.netloc)\n\n", connection));

    let headers = headers_dict(request.headers.iter());
    if let Some(headers) = &headers {
        body.push_str(headers);
    }

    let has_payload = match request.body_source() {
        BodySource::Multipart(fields) => {
            body.push_str("# Multipart form data is not supported by http.client; fields:\n");
            for field in fields {
                body.push_str(&format!("#   {}\n", field_summary(field)));
            }
            body.push('\n');
            false
        }
        BodySource::Json(Value::String(raw)) => {
            body.push_str(&format!("payload = {}\n\n", repr_str(raw)));
            true
        }
        BodySource::Json(value) => {
            imports.add("import json");
            body.push_str(&format!("payload = json.dumps({})\n\n", repr_json(value, 0)));
            true
        }
        BodySource::DataArray(_) | BodySource::Legacy(_) => {
            body.push_str(&data_builder("payload", &request.data_params(), request.is_data_binary, &mut imports));
            true
        }
        BodySource::Empty => false,
    };

    let mut args = vec![repr_str(&request.method.to_uppercase()), "path".to_string()];
    if has_payload {
        args.push("payload".to_string());
    }
    if headers.is_some() {
        if !has_payload {
            args.push("None".to_string());
        }
        args.push("headers".to_string());
    }

    let mut code = imports.render();
    code.push_str(&body);
    code.push_str(&format!("conn.request({})\n", args.join(", ")));
    code.push_str("response = conn.getresponse()\n");
    code.push_str("print(response.read().decode('utf-8'))");
    code
}

#[cfg(test)]
mod tests {
    use super::super::common::testing::{parse, strip_quotes, unescape_backslash, TRICKY};
    use super::*;

    #[test]
    fn test_repr_str_round_trip() {
        let literal = repr_str(TRICKY);
        assert!(literal.starts_with('\'') && literal.ends_with('\''));
        assert!(!literal.contains('\n'));
        assert_eq!(unescape_backslash(strip_quotes(&literal)), TRICKY);
    }

    #[test]
    fn test_repr_json() {
        let value = serde_json::json!({"name": "John", "ok": true, "tags": [], "n": null});
        assert_eq!(
            repr_json(&value, 0),
            "{\n    'name': 'John',\n    'ok': True,\n    'tags': [],\n    'n': None,\n}"
        );
    }

    #[test]
    fn test_requests_get() {
        let code = requests(&Request::get("https://example.com"));
        assert!(code.starts_with("import requests\n\n"));
        assert!(code.contains("response = requests.get('https://example.com')"));
        assert!(code.ends_with("print(response.text)"));
    }

    #[test]
    fn test_requests_post_form() {
        let request = parse(
            "curl -X POST https://api.example.com/login -H 'Accept: */*' -d 'user=bob' -d 'pw=secret'",
        );
        let code = requests(&request);
        assert!(code.contains("headers = {\n    'Accept': '*/*',\n}"));
        assert!(code.contains("data = 'user=bob&pw=secret'"));
        assert!(code.contains("requests.post('https://api.example.com/login', headers=headers, data=data)"));
    }

    #[test]
    fn test_requests_json_drops_content_type() {
        let request = parse(r#"curl --json '{"a":1}' https://example.com"#);
        let code = requests(&request);
        assert!(code.contains("json_data = {\n    'a': 1,\n}"));
        assert!(!code.contains("Content-Type"));
        assert!(code.contains("json=json_data"));
    }

    #[test]
    fn test_requests_file_and_stdin() {
        let request = parse(
            "curl https://example.com --data-urlencode 'q@-' --data-urlencode 'name=@names.txt'",
        );
        let code = requests(&request);
        assert!(code.contains("import sys"));
        assert!(code.contains("from urllib.parse import quote_plus"));
        assert!(code.contains("data += 'q=' + quote_plus(sys.stdin.read())"));
        assert!(code.contains("with open('names.txt') as f:\n    data += 'name=' + quote_plus(f.read())"));
    }

    #[test]
    fn test_requests_multipart() {
        let request = parse("curl -F 'file=@photo.jpg' -F 'title=Hi' https://example.com/upload");
        let code = requests(&request);
        assert!(code.contains("'file': open('photo.jpg', 'rb'),"));
        assert!(code.contains("'title': (None, 'Hi'),"));
        assert!(code.contains("files=files"));
    }

    #[test]
    fn test_requests_custom_method_and_auth() {
        let request = parse("curl -X PURGE -u admin:pw --digest https://cache.example.com/x");
        let code = requests(&request);
        assert!(code.contains("from requests.auth import HTTPDigestAuth"));
        assert!(code.contains(
            "requests.request('PURGE', 'https://cache.example.com/x', auth=HTTPDigestAuth('admin', 'pw'))"
        ));
    }

    #[test]
    fn test_http_client() {
        let request = parse(r#"curl http://localhost:8080/api?x=1 --json '{"a":1}'"#);
        let code = http_client(&request);
        assert!(code.contains("url = urlparse('http://localhost:8080/api?x=1')\n"));
        assert!(code.contains("conn = http.client.HTTPConnection(url.netloc)"));
        assert!(code.contains("import json"));
        assert!(code.contains("conn.request('POST', path, payload, headers)"));
    }

    #[test]
    fn test_http_client_get() {
        let code = http_client(&Request::get("https://example.com/path"));
        assert!(code.starts_with("import http.client\nfrom urllib.parse import urlparse\n\n"));
        assert!(code.contains("url = urlparse('https://example.com/path')"));
        assert!(code.contains("HTTPSConnection(url.netloc)"));
        assert!(code.contains("conn.request('GET', path)"));
    }
}
