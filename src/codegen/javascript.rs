//! Browser JavaScript generators: `fetch` and `XMLHttpRequest`
//!
//! Browsers cannot read local files, so file and stdin data render as
//! placeholders the user fills in.

use serde_json::Value;

use super::common::{backslash_escape, comment_safe, indent_tail, json_pretty, unicode_u4};
use super::VariantTable;
use crate::curl::{AuthType, BodySource, DataParam, FileType, FormParam, Request};

pub const VARIANTS: VariantTable = &[("Fetch API", fetch), ("XMLHttpRequest", xhr)];

/// JavaScript string literal in single quotes
pub fn repr_str(s: &str) -> String {
    let escaped = backslash_escape(s, '\'', unicode_u4)
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029");
    format!("'{}'", escaped)
}

/// Body expression for the data items, with placeholders for file contents
fn data_expr(params: &[DataParam]) -> String {
    let parts: Vec<String> = params
        .iter()
        .map(|param| match param {
            DataParam::Literal(s) => repr_str(s),
            DataParam::File(file) => {
                let placeholder = if file.is_stdin() {
                    "'' /* standard input */".to_string()
                } else {
                    format!("'' /* contents of {} */", comment_safe(&file.filename))
                };
                match (&file.name, file.filetype) {
                    (Some(name), FileType::Urlencode) => format!(
                        "{} + encodeURIComponent({})",
                        repr_str(&format!("{}=", name)),
                        placeholder
                    ),
                    (None, FileType::Urlencode) => format!("encodeURIComponent({})", placeholder),
                    _ => placeholder,
                }
            }
        })
        .collect();
    parts.join(" + '&' + ")
}

/// `const formData = ...` statements; files become empty `File` objects
fn form_data(fields: &[FormParam]) -> String {
    let mut code = String::from("const formData = new FormData();\n");
    for field in fields {
        if field.is_file {
            code.push_str(&format!(
                "formData.append({}, new File([/* contents of {} */], {}));\n",
                repr_str(&field.name),
                comment_safe(&field.content),
                repr_str(&field.content)
            ));
        } else {
            code.push_str(&format!(
                "formData.append({}, {});\n",
                repr_str(&field.name),
                repr_str(&field.content)
            ));
        }
    }
    code
}

/// Header name and value expressions, including an `Authorization` header
/// for basic credentials
fn header_exprs(request: &Request, json_content_type: bool) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = if json_content_type {
        request
            .headers_without_content_type()
            .map(|(k, v)| (repr_str(k), repr_str(v)))
            .collect()
    } else {
        request.headers.iter().map(|(k, v)| (repr_str(k), repr_str(v))).collect()
    };

    if let Some(auth) = request.auth.as_ref().filter(|a| a.auth_type == AuthType::Basic) {
        if request.header("Authorization").is_none() {
            headers.push((
                repr_str("Authorization"),
                format!("'Basic ' + btoa({})", repr_str(&format!("{}:{}", auth.username, auth.password))),
            ));
        }
    }
    if json_content_type {
        headers.push((repr_str("Content-Type"), repr_str("application/json")));
    }
    headers
}

/// Body expression plus any statements that must precede the request
fn body_parts(request: &Request) -> (String, Option<String>) {
    match request.body_source() {
        BodySource::Multipart(fields) => (form_data(fields), Some("formData".to_string())),
        BodySource::Json(Value::String(raw)) => (String::new(), Some(repr_str(raw))),
        BodySource::Json(value) => (
            String::new(),
            Some(format!("JSON.stringify({})", json_pretty(value, 2))),
        ),
        BodySource::DataArray(_) | BodySource::Legacy(_) => {
            (String::new(), Some(data_expr(&request.data_params())))
        }
        BodySource::Empty => (String::new(), None),
    }
}

/// `fetch` with async/await
pub fn fetch(request: &Request) -> String {
    let structured_json = matches!(request.body_source(), BodySource::Json(v) if !v.is_string());
    let (prelude, body) = body_parts(request);

    let mut code = String::new();
    if !prelude.is_empty() {
        code.push_str(&prelude);
        code.push('\n');
    }

    let mut options = vec![format!("  method: {}", repr_str(&request.method))];

    let headers = header_exprs(request, structured_json);
    if !headers.is_empty() {
        let entries: Vec<String> = headers
            .iter()
            .map(|(k, v)| format!("    {}: {}", k, v))
            .collect();
        options.push(format!("  headers: {{\n{}\n  }}", entries.join(",\n")));
    }
    if let Some(body) = body {
        options.push(format!("  body: {}", indent_tail(&body, "  ")));
    }
    if request.follow_redirects {
        options.push("  redirect: 'follow'".to_string());
    }
    if request.auth.as_ref().is_some_and(|a| a.auth_type != AuthType::Basic) {
        options.push("  credentials: 'include'".to_string());
    }

    code.push_str(&format!(
        "const response = await fetch({}, {{\n{}\n}});\n\n",
        repr_str(request.url()),
        options.join(",\n")
    ));
    code.push_str("const data = await response.text();\n");
    code.push_str("console.log(data);");
    code
}

/// `XMLHttpRequest` with an `onreadystatechange` handler
pub fn xhr(request: &Request) -> String {
    let structured_json = matches!(request.body_source(), BodySource::Json(v) if !v.is_string());
    let (prelude, body) = body_parts(request);

    let mut code = String::from("const xhr = new XMLHttpRequest();\n");
    code.push_str(&format!(
        "xhr.open({}, {});\n",
        repr_str(&request.method),
        repr_str(request.url())
    ));

    let headers = header_exprs(request, structured_json);
    for (name, value) in &headers {
        code.push_str(&format!("xhr.setRequestHeader({}, {});\n", name, value));
    }
    code.push('\n');

    code.push_str("xhr.onreadystatechange = function() {\n");
    code.push_str("  if (xhr.readyState === 4) {\n");
    code.push_str("    if (xhr.status >= 200 && xhr.status < 300) {\n");
    code.push_str("      console.log(xhr.responseText);\n");
    code.push_str("    } else {\n");
    code.push_str("      console.error('Error:', xhr.status, xhr.statusText);\n");
    code.push_str("    }\n");
    code.push_str("  }\n");
    code.push_str("};\n\n");

    if !prelude.is_empty() {
        code.push_str(&prelude);
    }
    match body {
        Some(body) => code.push_str(&format!("xhr.send({});", body)),
        None => code.push_str("xhr.send();"),
    }
    code
}

#[cfg(test)]
mod tests {
    use super::super::common::testing::{parse, strip_quotes, unescape_backslash, TRICKY};
    use super::*;

    #[test]
    fn test_repr_str_round_trip() {
        let literal = repr_str(TRICKY);
        assert!(!literal.contains('\n'));
        assert_eq!(unescape_backslash(strip_quotes(&literal)), TRICKY);
    }

    #[test]
    fn test_repr_str_escapes_line_separators() {
        assert_eq!(repr_str("a\u{2028}b\u{2029}c"), "'a\\u2028b\\u2029c'");
    }

    #[test]
    fn test_fetch_get() {
        let code = fetch(&Request::get("https://example.com"));
        assert!(code.starts_with("const response = await fetch('https://example.com', {\n  method: 'GET'\n});"));
    }

    #[test]
    fn test_fetch_json_sets_content_type_once() {
        let request = parse(r#"curl -H 'Content-Type: application/json' -H 'X-Id: 7' -d '{"a":1}' --json '{"a":1}' https://example.com"#);
        let code = fetch(&request);
        assert_eq!(code.matches("Content-Type").count(), 1);
        assert!(code.contains("    'X-Id': '7',\n    'Content-Type': 'application/json'"));
        assert!(code.contains("  body: JSON.stringify({\n    \"a\": 1\n  })"));
    }

    #[test]
    fn test_fetch_file_placeholder() {
        let request = parse("curl -d @payload.txt -d 'x=1' https://example.com");
        let code = fetch(&request);
        assert!(code.contains("body: '' /* contents of payload.txt */ + '&' + 'x=1'"));
    }

    #[test]
    fn test_fetch_basic_auth_header() {
        let request = parse("curl -u user:pass https://example.com");
        let code = fetch(&request);
        assert!(code.contains("'Authorization': 'Basic ' + btoa('user:pass')"));
    }

    #[test]
    fn test_xhr_multipart() {
        let request = parse("curl -F 'avatar=@me.png' -F 'name=Al' https://example.com/u");
        let code = xhr(&request);
        assert!(code.contains("xhr.open('POST', 'https://example.com/u');"));
        assert!(code.contains("formData.append('avatar', new File([/* contents of me.png */], 'me.png'));"));
        assert!(code.ends_with("xhr.send(formData);"));
    }

    #[test]
    fn test_xhr_get() {
        let code = xhr(&Request::get("https://example.com"));
        assert!(code.contains("'https://example.com'"));
        assert!(code.ends_with("xhr.send();"));
    }
}
