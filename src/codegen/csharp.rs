//! C# generators: `System.Net.Http.HttpClient` and RestSharp
//!
//! Both render top-level statements (C# 9+).

use std::collections::BTreeSet;

use super::common::{backslash_escape, comment_safe, join_literals, unicode_u4};
use super::VariantTable;
use crate::curl::{AuthType, BodySource, DataParam, FileType, Request};

pub const VARIANTS: VariantTable = &[("HttpClient", http_client), ("RestSharp", rest_sharp)];

/// C# regular string literal
pub fn repr_str(s: &str) -> String {
    format!("\"{}\"", backslash_escape(s, '"', unicode_u4))
}

type Usings = BTreeSet<&'static str>;

fn render_usings(usings: &Usings) -> String {
    let mut code = String::new();
    for using in usings {
        code.push_str(&format!("using {};\n", using));
    }
    code.push('\n');
    code
}

/// String expression for the data items, reading files with `File`
fn data_expr(params: &[DataParam], usings: &mut Usings) -> String {
    if let Some(joined) = join_literals(params) {
        return repr_str(&joined);
    }
    let parts: Vec<String> = params
        .iter()
        .map(|param| match param {
            DataParam::Literal(s) => repr_str(s),
            DataParam::File(file) => {
                let read = if file.is_stdin() {
                    "Console.In.ReadToEnd()".to_string()
                } else {
                    usings.insert("System.IO");
                    format!("File.ReadAllText({})", repr_str(&file.filename))
                };
                match file.filetype {
                    FileType::Data => format!("{}.Replace(\"\\n\", \"\").Replace(\"\\r\", \"\")", read),
                    FileType::Binary | FileType::Json => read,
                    FileType::Urlencode => {
                        let encoded = format!("Uri.EscapeDataString({})", read);
                        match &file.name {
                            Some(name) => format!("{} + {}", repr_str(&format!("{}=", name)), encoded),
                            None => encoded,
                        }
                    }
                }
            }
        })
        .collect();
    parts.join(" + \"&\" + ")
}

fn text_body(request: &Request, usings: &mut Usings) -> Option<String> {
    match request.body_source() {
        BodySource::Json(_) => request.json_text().map(|text| repr_str(&text)),
        BodySource::DataArray(_) | BodySource::Legacy(_) => Some(data_expr(&request.data_params(), usings)),
        BodySource::Multipart(_) | BodySource::Empty => None,
    }
}

fn content_type(request: &Request) -> String {
    request
        .header("Content-Type")
        .unwrap_or("application/x-www-form-urlencoded")
        .to_string()
}

/// `HttpClient.SendAsync` with an `HttpRequestMessage`
pub fn http_client(request: &Request) -> String {
    let mut usings: Usings = ["System", "System.Net.Http"].into_iter().collect();
    let mut body = String::new();

    let mut handler = Vec::new();
    if let Some(auth) = request.auth.as_ref().filter(|a| a.auth_type != AuthType::Basic) {
        usings.insert("System.Net");
        handler.push(format!(
            "    Credentials = new NetworkCredential({}, {}),",
            repr_str(&auth.username),
            repr_str(&auth.password)
        ));
    }
    if request.insecure {
        handler.push(
            "    ServerCertificateCustomValidationCallback = HttpClientHandler.DangerousAcceptAnyServerCertificateValidator,"
                .to_string(),
        );
    }
    if let Some(proxy) = &request.proxy {
        usings.insert("System.Net");
        handler.push(format!("    Proxy = new WebProxy({}),", repr_str(proxy)));
    }
    if request.follow_redirects {
        handler.push("    AllowAutoRedirect = true,".to_string());
    }
    if request.compressed {
        usings.insert("System.Net");
        handler.push("    AutomaticDecompression = DecompressionMethods.All,".to_string());
    }

    if handler.is_empty() {
        body.push_str("using var client = new HttpClient();\n");
    } else {
        body.push_str(&format!("var handler = new HttpClientHandler\n{{\n{}\n}};\n", handler.join("\n")));
        body.push_str("using var client = new HttpClient(handler);\n");
    }
    if let Some(timeout) = request.timeout {
        body.push_str(&format!("client.Timeout = TimeSpan.FromMilliseconds({});\n", (timeout * 1000.0) as u64));
    }

    body.push_str(&format!(
        "\nvar request = new HttpRequestMessage(new HttpMethod({}), {});\n",
        repr_str(&request.method),
        repr_str(request.url())
    ));

    let mut content = None;
    match request.body_source() {
        BodySource::Multipart(fields) => {
            body.push_str("\nvar content = new MultipartFormDataContent();\n");
            for field in fields {
                if field.is_file {
                    usings.insert("System.IO");
                    body.push_str(&format!(
                        "content.Add(new ByteArrayContent(File.ReadAllBytes({})), {}, Path.GetFileName({}));\n",
                        repr_str(&field.content),
                        repr_str(&field.name),
                        repr_str(&field.content)
                    ));
                } else {
                    body.push_str(&format!(
                        "content.Add(new StringContent({}), {});\n",
                        repr_str(&field.content),
                        repr_str(&field.name)
                    ));
                }
            }
            content = Some("content".to_string());
        }
        _ => {
            if let Some(text) = text_body(request, &mut usings) {
                usings.insert("System.Text");
                content = Some(format!(
                    "new StringContent({}, Encoding.UTF8, {})",
                    text,
                    repr_str(&content_type(request))
                ));
            } else if let Some(file) = request.upload_file() {
                usings.insert("System.IO");
                content = Some(format!("new ByteArrayContent(File.ReadAllBytes({}))", repr_str(file)));
            }
        }
    }

    for (name, value) in &request.headers {
        if content.is_some() && name.eq_ignore_ascii_case("content-type") {
            continue;
        }
        body.push_str(&format!(
            "request.Headers.TryAddWithoutValidation({}, {});\n",
            repr_str(name),
            repr_str(value)
        ));
    }
    if let Some(auth) = request.auth.as_ref().filter(|a| a.auth_type == AuthType::Basic) {
        usings.extend(["System.Net.Http.Headers", "System.Text"]);
        body.push_str(&format!(
            "request.Headers.Authorization = new AuthenticationHeaderValue(\"Basic\", Convert.ToBase64String(Encoding.UTF8.GetBytes({})));\n",
            repr_str(&format!("{}:{}", auth.username, auth.password))
        ));
    }
    if let Some(content) = content {
        body.push_str(&format!("request.Content = {};\n", content));
    }

    body.push_str("\nvar response = await client.SendAsync(request);\n");
    body.push_str("response.EnsureSuccessStatusCode();\n");
    body.push_str("var responseBody = await response.Content.ReadAsStringAsync();\n");
    body.push_str("Console.WriteLine(responseBody);");

    let mut code = render_usings(&usings);
    code.push_str(&body);
    code
}

/// RestSharp name of a standard method
fn rest_method(method: &str) -> Option<&'static str> {
    Some(match method {
        "GET" => "Method.Get",
        "POST" => "Method.Post",
        "PUT" => "Method.Put",
        "DELETE" => "Method.Delete",
        "HEAD" => "Method.Head",
        "OPTIONS" => "Method.Options",
        "PATCH" => "Method.Patch",
        "MERGE" => "Method.Merge",
        "COPY" => "Method.Copy",
        "SEARCH" => "Method.Search",
        _ => return None,
    })
}

/// RestSharp 107+ `RestClient`
pub fn rest_sharp(request: &Request) -> String {
    let mut usings: Usings = ["System", "RestSharp"].into_iter().collect();
    let mut body = format!("var options = new RestClientOptions({});\n", repr_str(request.url()));

    if let Some(auth) = &request.auth {
        usings.insert("RestSharp.Authenticators");
        if auth.auth_type != AuthType::Basic {
            body.push_str(&format!(
                "// {:?} authentication needs a custom authenticator; basic credentials shown\n",
                auth.auth_type
            ));
        }
        body.push_str(&format!(
            "options.Authenticator = new HttpBasicAuthenticator({}, {});\n",
            repr_str(&auth.username),
            repr_str(&auth.password)
        ));
    }
    if request.insecure {
        body.push_str("options.RemoteCertificateValidationCallback = (sender, certificate, chain, errors) => true;\n");
    }
    if let Some(timeout) = request.timeout {
        body.push_str(&format!("options.Timeout = TimeSpan.FromMilliseconds({});\n", (timeout * 1000.0) as u64));
    }
    body.push_str("var client = new RestClient(options);\n\n");

    match rest_method(&request.method) {
        Some(method) => body.push_str(&format!("var request = new RestRequest(\"\", {});\n", method)),
        None => body.push_str(&format!(
            "// RestSharp has no {} method; sending as GET\nvar request = new RestRequest(\"\", Method.Get);\n",
            comment_safe(&request.method)
        )),
    }

    let multipart = matches!(request.body_source(), BodySource::Multipart(_));
    for (name, value) in &request.headers {
        if multipart && name.eq_ignore_ascii_case("content-type") {
            continue;
        }
        body.push_str(&format!("request.AddHeader({}, {});\n", repr_str(name), repr_str(value)));
    }

    match request.body_source() {
        BodySource::Multipart(fields) => {
            body.push_str("request.AlwaysMultipartFormData = true;\n");
            for field in fields {
                if field.is_file {
                    body.push_str(&format!(
                        "request.AddFile({}, {});\n",
                        repr_str(&field.name),
                        repr_str(&field.content)
                    ));
                } else {
                    body.push_str(&format!(
                        "request.AddParameter({}, {});\n",
                        repr_str(&field.name),
                        repr_str(&field.content)
                    ));
                }
            }
        }
        _ => {
            if let Some(text) = text_body(request, &mut usings) {
                body.push_str(&format!(
                    "request.AddStringBody({}, {});\n",
                    text,
                    repr_str(&content_type(request))
                ));
            } else if let Some(file) = request.upload_file() {
                usings.insert("System.IO");
                body.push_str(&format!(
                    "request.AddBody(File.ReadAllBytes({}), \"application/octet-stream\");\n",
                    repr_str(file)
                ));
            }
        }
    }

    body.push_str("\nRestResponse response = await client.ExecuteAsync(request);\n");
    body.push_str("Console.WriteLine(response.Content);");

    let mut code = render_usings(&usings);
    code.push_str(&body);
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
    fn test_http_client_get() {
        let code = http_client(&Request::get("https://example.com"));
        assert!(code.starts_with("using System;\nusing System.Net.Http;\n\n"));
        assert!(code.contains("new HttpRequestMessage(new HttpMethod(\"GET\"), \"https://example.com\")"));
        assert!(!code.contains("request.Content"));
    }

    #[test]
    fn test_http_client_json_content_type() {
        let request = parse(r#"curl -H 'X-A: 1' --json '{"a":1}' https://example.com"#);
        let code = http_client(&request);
        assert!(code.contains(
            "request.Content = new StringContent(\"{\\\"a\\\":1}\", Encoding.UTF8, \"application/json\");"
        ));
        assert!(code.contains("TryAddWithoutValidation(\"X-A\", \"1\")"));
        assert!(!code.contains("TryAddWithoutValidation(\"Content-Type\""));
    }

    #[test]
    fn test_http_client_ntlm_uses_handler() {
        let request = parse("curl --ntlm -u 'DOMAIN\\user:pw' https://intranet.example.com");
        let code = http_client(&request);
        assert!(code.contains("Credentials = new NetworkCredential(\"DOMAIN\\\\user\", \"pw\"),"));
        assert!(code.contains("using var client = new HttpClient(handler);"));
    }

    #[test]
    fn test_rest_sharp_multipart() {
        let request = parse("curl -F 'photo=@p.jpg' -F 'caption=hi' https://example.com/photos");
        let code = rest_sharp(&request);
        assert!(code.contains("new RestRequest(\"\", Method.Post)"));
        assert!(code.contains("request.AddFile(\"photo\", \"p.jpg\");"));
        assert!(code.contains("request.AddParameter(\"caption\", \"hi\");"));
    }

    #[test]
    fn test_rest_sharp_unknown_method() {
        let request = parse("curl -X PURGE https://example.com");
        assert!(rest_sharp(&request).contains("// RestSharp has no PURGE method"));
    }
}
