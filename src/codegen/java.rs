//! Java generators: `java.net.http.HttpClient`, OkHttp and `HttpURLConnection`

use std::collections::BTreeSet;

use super::common::{backslash_escape, field_summary, indent_lines, join_literals};
use super::VariantTable;
use crate::curl::{AuthType, BodySource, DataParam, FileType, FormParam, Request};

pub const VARIANTS: VariantTable = &[
    ("HttpClient", http_client),
    ("OkHttp", okhttp),
    ("HttpURLConnection", http_url_connection),
];

/// Three-digit octal escape; `\u` escapes are translated before lexing in Java
/// and cannot carry control characters
fn octal(c: char) -> String {
    format!("\\{:03o}", c as u32)
}

/// Java string literal
pub fn repr_str(s: &str) -> String {
    format!("\"{}\"", backslash_escape(s, '"', octal))
}

type Imports = BTreeSet<&'static str>;

/// String expression for the data items, reading files with `Files`
fn data_expr(params: &[DataParam], imports: &mut Imports) -> String {
    if let Some(joined) = join_literals(params) {
        return repr_str(&joined);
    }
    let parts: Vec<String> = params
        .iter()
        .map(|param| match param {
            DataParam::Literal(s) => repr_str(s),
            DataParam::File(file) => {
                let read = if file.is_stdin() {
                    "new String(System.in.readAllBytes())".to_string()
                } else {
                    imports.extend(["java.nio.file.Files", "java.nio.file.Path"]);
                    format!("Files.readString(Path.of({}))", repr_str(&file.filename))
                };
                match file.filetype {
                    FileType::Data => format!("{}.replaceAll(\"[\\\\r\\\\n]\", \"\")", read),
                    FileType::Binary | FileType::Json => read,
                    FileType::Urlencode => {
                        imports.extend(["java.net.URLEncoder", "java.nio.charset.StandardCharsets"]);
                        let encoded = format!("URLEncoder.encode({}, StandardCharsets.UTF_8)", read);
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

/// Request body as a string expression, when the body is textual
fn text_body(request: &Request, imports: &mut Imports) -> Option<String> {
    match request.body_source() {
        BodySource::Json(_) => request.json_text().map(|text| repr_str(&text)),
        BodySource::DataArray(_) | BodySource::Legacy(_) => Some(data_expr(&request.data_params(), imports)),
        BodySource::Multipart(_) | BodySource::Empty => None,
    }
}

fn multipart_comment(fields: &[FormParam], indent: &str) -> String {
    let mut code = format!("{}// Multipart form data is not built in; fields:\n", indent);
    for field in fields {
        code.push_str(&format!("{}//   {}\n", indent, field_summary(field)));
    }
    code
}

fn basic_auth_value(request: &Request, imports: &mut Imports) -> Option<String> {
    let auth = request.auth.as_ref().filter(|a| a.auth_type == AuthType::Basic)?;
    imports.insert("java.util.Base64");
    Some(format!(
        "\"Basic \" + Base64.getEncoder().encodeToString({}.getBytes())",
        repr_str(&format!("{}:{}", auth.username, auth.password))
    ))
}

/// Wrap `body` in a `Main` class with the collected imports
fn main_class(imports: &Imports, throws: &str, body: &str) -> String {
    let mut code = String::new();
    for import in imports {
        code.push_str(&format!("import {};\n", import));
    }
    code.push_str("\npublic class Main {\n");
    code.push_str(&format!("    public static void main(String[] args) throws {} {{\n", throws));
    code.push_str(&indent_lines(body.trim_end(), "        "));
    code.push_str("\n    }\n}");
    code
}

/// Java 11+ `HttpClient`
pub fn http_client(request: &Request) -> String {
    let mut imports: Imports = [
        "java.net.URI",
        "java.net.http.HttpClient",
        "java.net.http.HttpRequest",
        "java.net.http.HttpResponse",
    ]
    .into_iter()
    .collect();
    let mut body = String::new();

    if request.follow_redirects {
        body.push_str("HttpClient client = HttpClient.newBuilder()\n");
        body.push_str("    .followRedirects(HttpClient.Redirect.NORMAL)\n");
        body.push_str("    .build();\n\n");
    } else {
        body.push_str("HttpClient client = HttpClient.newHttpClient();\n\n");
    }

    if let BodySource::Multipart(fields) = request.body_source() {
        body.push_str(&multipart_comment(fields, ""));
    }

    let publisher = match (text_body(request, &mut imports), request.upload_file()) {
        (Some(text), _) => Some(format!("HttpRequest.BodyPublishers.ofString({})", text)),
        (None, Some(file)) => {
            imports.insert("java.nio.file.Path");
            Some(format!("HttpRequest.BodyPublishers.ofFile(Path.of({}))", repr_str(file)))
        }
        (None, None) => None,
    };

    let mut chain = vec![format!(".uri(URI.create({}))", repr_str(request.url()))];
    for (name, value) in &request.headers {
        chain.push(format!(".header({}, {})", repr_str(name), repr_str(value)));
    }
    if let Some(value) = basic_auth_value(request, &mut imports) {
        chain.push(format!(".header(\"Authorization\", {})", value));
    }
    if let Some(timeout) = request.timeout {
        imports.insert("java.time.Duration");
        chain.push(format!(".timeout(Duration.ofMillis({}))", (timeout * 1000.0) as u64));
    }
    match (request.method.as_str(), publisher) {
        ("GET", None) => chain.push(".GET()".to_string()),
        ("DELETE", None) => chain.push(".DELETE()".to_string()),
        (method, Some(publisher)) => chain.push(format!(".method({}, {})", repr_str(method), publisher)),
        (method, None) => chain.push(format!(
            ".method({}, HttpRequest.BodyPublishers.noBody())",
            repr_str(method)
        )),
    }
    chain.push(".build()".to_string());

    body.push_str("HttpRequest request = HttpRequest.newBuilder()\n");
    for link in &chain {
        body.push_str(&format!("    {}", link));
        body.push_str(if link == ".build()" { ";\n\n" } else { "\n" });
    }

    body.push_str("HttpResponse<String> response = client.send(request, HttpResponse.BodyHandlers.ofString());\n");
    body.push_str("System.out.println(response.body());\n");

    main_class(&imports, "Exception", &body)
}

/// OkHttp 4 `Request.Builder`
pub fn okhttp(request: &Request) -> String {
    let mut imports: Imports = [
        "java.io.IOException",
        "okhttp3.OkHttpClient",
        "okhttp3.Request",
        "okhttp3.Response",
    ]
    .into_iter()
    .collect();
    let mut body = String::from("OkHttpClient client = new OkHttpClient();\n\n");

    let media_type = request
        .header("Content-Type")
        .unwrap_or("application/x-www-form-urlencoded")
        .to_string();

    let has_body = match request.body_source() {
        BodySource::Multipart(fields) => {
            imports.extend(["okhttp3.MultipartBody", "okhttp3.RequestBody"]);
            body.push_str("RequestBody body = new MultipartBody.Builder()\n");
            body.push_str("    .setType(MultipartBody.FORM)\n");
            for field in fields {
                if field.is_file {
                    imports.extend(["java.io.File", "okhttp3.MediaType"]);
                    body.push_str(&format!(
                        "    .addFormDataPart({}, {}, RequestBody.create(new File({}), MediaType.parse(\"application/octet-stream\")))\n",
                        repr_str(&field.name),
                        repr_str(&field.content),
                        repr_str(&field.content)
                    ));
                } else {
                    body.push_str(&format!(
                        "    .addFormDataPart({}, {})\n",
                        repr_str(&field.name),
                        repr_str(&field.content)
                    ));
                }
            }
            body.push_str("    .build();\n\n");
            true
        }
        _ => match (text_body(request, &mut imports), request.upload_file()) {
            (Some(text), _) => {
                imports.extend(["okhttp3.MediaType", "okhttp3.RequestBody"]);
                body.push_str(&format!(
                    "RequestBody body = RequestBody.create({}, MediaType.parse({}));\n\n",
                    text,
                    repr_str(&media_type)
                ));
                true
            }
            (None, Some(file)) => {
                imports.extend(["java.io.File", "okhttp3.MediaType", "okhttp3.RequestBody"]);
                body.push_str(&format!(
                    "RequestBody body = RequestBody.create(new File({}), MediaType.parse(\"application/octet-stream\"));\n\n",
                    repr_str(file)
                ));
                true
            }
            (None, None) => false,
        },
    };

    let multipart = matches!(request.body_source(), BodySource::Multipart(_));
    let mut chain = vec![format!(".url({})", repr_str(request.url()))];
    match (request.method.as_str(), has_body) {
        ("GET", false) => chain.push(".get()".to_string()),
        ("HEAD", false) => chain.push(".head()".to_string()),
        (method, true) => chain.push(format!(".method({}, body)", repr_str(method))),
        (method, false) => chain.push(format!(".method({}, null)", repr_str(method))),
    }
    for (name, value) in &request.headers {
        if multipart && name.eq_ignore_ascii_case("content-type") {
            continue;
        }
        chain.push(format!(".addHeader({}, {})", repr_str(name), repr_str(value)));
    }
    if let Some(auth) = request.auth.as_ref().filter(|a| a.auth_type == AuthType::Basic) {
        imports.insert("okhttp3.Credentials");
        chain.push(format!(
            ".addHeader(\"Authorization\", Credentials.basic({}, {}))",
            repr_str(&auth.username),
            repr_str(&auth.password)
        ));
    }

    body.push_str("Request request = new Request.Builder()\n");
    for link in &chain {
        body.push_str(&format!("    {}\n", link));
    }
    body.push_str("    .build();\n\n");

    body.push_str("try (Response response = client.newCall(request).execute()) {\n");
    body.push_str("    System.out.println(response.body().string());\n");
    body.push_str("}\n");

    main_class(&imports, "IOException", &body)
}

/// Plain `HttpURLConnection`
pub fn http_url_connection(request: &Request) -> String {
    let mut imports: Imports = [
        "java.io.BufferedReader",
        "java.io.InputStreamReader",
        "java.net.HttpURLConnection",
        "java.net.URI",
    ]
    .into_iter()
    .collect();

    let mut body = format!(
        "HttpURLConnection conn = (HttpURLConnection) URI.create({}).toURL().openConnection();\n",
        repr_str(request.url())
    );
    body.push_str(&format!("conn.setRequestMethod({});\n", repr_str(&request.method)));
    for (name, value) in &request.headers {
        body.push_str(&format!(
            "conn.setRequestProperty({}, {});\n",
            repr_str(name),
            repr_str(value)
        ));
    }
    if let Some(value) = basic_auth_value(request, &mut imports) {
        body.push_str(&format!("conn.setRequestProperty(\"Authorization\", {});\n", value));
    }
    if let Some(timeout) = request.timeout {
        body.push_str(&format!("conn.setReadTimeout({});\n", (timeout * 1000.0) as u64));
    }
    if let Some(timeout) = request.connect_timeout {
        body.push_str(&format!("conn.setConnectTimeout({});\n", (timeout * 1000.0) as u64));
    }
    if request.follow_redirects {
        body.push_str("conn.setInstanceFollowRedirects(true);\n");
    }

    if let BodySource::Multipart(fields) = request.body_source() {
        body.push('\n');
        body.push_str(&multipart_comment(fields, ""));
    }

    let payload = match (text_body(request, &mut imports), request.upload_file()) {
        (Some(text), _) => {
            imports.insert("java.nio.charset.StandardCharsets");
            Some(format!("{}.getBytes(StandardCharsets.UTF_8)", text))
        }
        (None, Some(file)) => {
            imports.extend(["java.nio.file.Files", "java.nio.file.Path"]);
            Some(format!("Files.readAllBytes(Path.of({}))", repr_str(file)))
        }
        (None, None) => None,
    };
    if let Some(payload) = payload {
        imports.insert("java.io.OutputStream");
        body.push_str("\nconn.setDoOutput(true);\n");
        body.push_str("try (OutputStream os = conn.getOutputStream()) {\n");
        body.push_str(&format!("    os.write({});\n", payload));
        body.push_str("}\n");
    }

    body.push_str("\nSystem.out.println(\"Status: \" + conn.getResponseCode());\n");
    body.push_str("try (BufferedReader in = new BufferedReader(new InputStreamReader(conn.getInputStream()))) {\n");
    body.push_str("    String line;\n");
    body.push_str("    while ((line = in.readLine()) != null) {\n");
    body.push_str("        System.out.println(line);\n");
    body.push_str("    }\n");
    body.push_str("}\n");

    main_class(&imports, "Exception", &body)
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
    fn test_control_characters_use_octal() {
        assert_eq!(repr_str("a\u{1}2"), "\"a\\0012\"");
        assert!(!repr_str("\u{1b}").contains("\\u"));
    }

    #[test]
    fn test_http_client_get() {
        let code = http_client(&Request::get("https://example.com"));
        assert!(code.starts_with("import java.net.URI;\n"));
        assert!(code.contains("            .uri(URI.create(\"https://example.com\"))\n            .GET()\n            .build();"));
        assert!(code.ends_with("    }\n}"));
    }

    #[test]
    fn test_http_client_post_file_data() {
        let request = parse("curl -d @body.txt -H 'Content-Type: text/plain' https://example.com/in");
        let code = http_client(&request);
        assert!(code.contains("import java.nio.file.Files;"));
        assert!(code.contains(
            ".method(\"POST\", HttpRequest.BodyPublishers.ofString(Files.readString(Path.of(\"body.txt\")).replaceAll(\"[\\\\r\\\\n]\", \"\")))"
        ));
    }

    #[test]
    fn test_okhttp_json() {
        let request = parse(r#"curl --json '{"k":"v"}' https://example.com"#);
        let code = okhttp(&request);
        assert!(code.contains(
            "RequestBody body = RequestBody.create(\"{\\\"k\\\":\\\"v\\\"}\", MediaType.parse(\"application/json\"));"
        ));
        assert!(code.contains(".method(\"POST\", body)"));
    }

    #[test]
    fn test_okhttp_multipart_and_auth() {
        let request = parse("curl -u a:b -F 'f=@x.bin' -F 'k=v' https://example.com");
        let code = okhttp(&request);
        assert!(code.contains(".addFormDataPart(\"k\", \"v\")"));
        assert!(code.contains("RequestBody.create(new File(\"x.bin\"), MediaType.parse(\"application/octet-stream\"))"));
        assert!(code.contains("Credentials.basic(\"a\", \"b\")"));
    }

    #[test]
    fn test_http_url_connection_writes_body() {
        let request = parse("curl -X PATCH -d 'x=1' https://example.com/p");
        let code = http_url_connection(&request);
        assert!(code.contains("conn.setRequestMethod(\"PATCH\");"));
        assert!(code.contains("os.write(\"x=1\".getBytes(StandardCharsets.UTF_8));"));
    }
}
