//! Dart generators: `package:http` and Dio

use std::collections::BTreeSet;

use super::common::{backslash_escape, join_literals, unicode_braced};
use super::VariantTable;
use crate::curl::{AuthType, BodySource, DataParam, FileType, Request};

pub const VARIANTS: VariantTable = &[("HTTP", http), ("Dio", dio)];

const SHORTHAND_METHODS: [&str; 6] = ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD"];

/// Dart single-quoted string; `$` is escaped to stop interpolation
pub fn repr_str(s: &str) -> String {
    format!("'{}'", backslash_escape(s, '\'', unicode_braced).replace('$', "\\$"))
}

/// `dart:` imports first, then packages
fn render_imports(imports: &BTreeSet<&str>) -> String {
    let (core, packages): (Vec<&str>, Vec<&str>) = imports.iter().copied().partition(|i| i.starts_with("dart:"));
    let mut code = String::new();
    for group in [core, packages] {
        if group.is_empty() {
            continue;
        }
        for uri in group {
            match uri.split_once(" as ") {
                Some((path, alias)) => code.push_str(&format!("import '{}' as {};\n", path, alias)),
                None => code.push_str(&format!("import '{}';\n", uri)),
            }
        }
        code.push('\n');
    }
    code
}

/// Expression for one file read, awaited when it reads stdin
fn read_file(filename: &str, imports: &mut BTreeSet<&'static str>) -> String {
    imports.insert("dart:io");
    if filename == "-" {
        imports.insert("dart:convert");
        "await stdin.transform(utf8.decoder).join()".to_string()
    } else {
        format!("File({}).readAsStringSync()", repr_str(filename))
    }
}

/// String expression for the data items
fn data_expr(params: &[DataParam], imports: &mut BTreeSet<&'static str>) -> String {
    if let Some(joined) = join_literals(params) {
        return repr_str(&joined);
    }
    let parts: Vec<String> = params
        .iter()
        .map(|param| match param {
            DataParam::Literal(s) => repr_str(s),
            DataParam::File(file) => {
                let read = read_file(&file.filename, imports);
                match file.filetype {
                    FileType::Data => format!("({}).replaceAll(RegExp(r'[\\r\\n]'), '')", read),
                    FileType::Binary | FileType::Json => read,
                    FileType::Urlencode => {
                        let encoded = format!("Uri.encodeQueryComponent({})", read);
                        match &file.name {
                            Some(name) => format!("{} + {}", repr_str(&format!("{}=", name)), encoded),
                            None => encoded,
                        }
                    }
                }
            }
        })
        .collect();
    if parts.len() == 1 {
        return parts.concat();
    }
    format!("[\n    {},\n  ].join('&')", parts.join(",\n    "))
}

/// Body expression for single-string targets, `None` for multipart or no body
fn text_body(request: &Request, imports: &mut BTreeSet<&'static str>) -> Option<String> {
    match request.body_source() {
        BodySource::Json(_) => request.json_text().map(|text| repr_str(&text)),
        BodySource::DataArray(_) | BodySource::Legacy(_) => {
            let params = request.data_params();
            match params.as_slice() {
                [DataParam::File(file)] if file.filetype == FileType::Binary && !file.is_stdin() => {
                    imports.insert("dart:io");
                    Some(format!("File({}).readAsBytesSync()", repr_str(&file.filename)))
                }
                _ => Some(data_expr(&params, imports)),
            }
        }
        BodySource::Empty => request.upload_file().map(|file| {
            imports.insert("dart:io");
            format!("File({}).readAsBytesSync()", repr_str(file))
        }),
        BodySource::Multipart(_) => None,
    }
}

/// Header map entries, with basic credentials as an Authorization header
fn header_entries(request: &Request, indent: &str, imports: &mut BTreeSet<&'static str>) -> Vec<String> {
    let multipart = matches!(request.body_source(), BodySource::Multipart(_));
    let mut entries: Vec<String> = request
        .headers
        .iter()
        .filter(|(k, _)| !(multipart && k.eq_ignore_ascii_case("content-type")))
        .map(|(k, v)| format!("{}{}: {},", indent, repr_str(k), repr_str(v)))
        .collect();
    if let Some(auth) = &request.auth {
        imports.insert("dart:convert");
        entries.push(format!(
            "{}'Authorization': 'Basic ' + base64Encode(utf8.encode({})),",
            indent,
            repr_str(&format!("{}:{}", auth.username, auth.password))
        ));
    }
    entries
}

fn auth_note(request: &Request) -> Option<String> {
    request
        .auth
        .as_ref()
        .filter(|auth| auth.auth_type != AuthType::Basic)
        .map(|auth| format!("  // {:?} authentication is not built in; sending basic credentials\n", auth.auth_type))
}

/// `package:http` top-level functions, or a `Request` for other methods
pub fn http(request: &Request) -> String {
    let mut imports = BTreeSet::from(["package:http/http.dart as http"]);
    let mut body = String::from("void main() async {\n");
    body.push_str(&format!("  final url = Uri.parse({});\n", repr_str(request.url())));

    let entries = header_entries(request, "    ", &mut imports);
    let has_headers = !entries.is_empty();
    if has_headers {
        body.push_str(&format!("  final headers = {{\n{}\n  }};\n", entries.join("\n")));
    }
    if let Some(note) = auth_note(request) {
        body.push_str(&note);
    }
    if request.insecure {
        body.push_str("  // certificate checks cannot be disabled with package:http\n");
    }
    body.push('\n');

    let timeout = request
        .timeout
        .map(|t| format!(".timeout(const Duration(milliseconds: {}))", (t * 1000.0).round() as u64))
        .unwrap_or_default();

    if let BodySource::Multipart(fields) = request.body_source() {
        body.push_str(&format!("  final req = http.MultipartRequest({}, url)", repr_str(&request.method)));
        if has_headers {
            body.push_str("\n    ..headers.addAll(headers)");
        }
        for field in fields {
            if field.is_file {
                body.push_str(&format!(
                    "\n    ..files.add(await http.MultipartFile.fromPath({}, {}))",
                    repr_str(&field.name),
                    repr_str(&field.content)
                ));
            } else {
                body.push_str(&format!("\n    ..fields[{}] = {}", repr_str(&field.name), repr_str(&field.content)));
            }
        }
        body.push_str(";\n");
        body.push_str(&format!("  final res = await http.Response.fromStream(await req.send(){});\n", timeout));
    } else {
        let data = text_body(request, &mut imports);
        if let Some(data) = &data {
            body.push_str(&format!("  final data = {};\n\n", data));
        }
        let method = request.method.to_ascii_uppercase();
        if SHORTHAND_METHODS.contains(&method.as_str()) {
            let mut args = vec!["url".to_string()];
            if has_headers {
                args.push("headers: headers".to_string());
            }
            if data.is_some() && method != "GET" && method != "HEAD" {
                args.push("body: data".to_string());
            }
            body.push_str(&format!(
                "  final res = await http.{}({}){};\n",
                method.to_ascii_lowercase(),
                args.join(", "),
                timeout
            ));
        } else {
            body.push_str(&format!("  final req = http.Request({}, url)", repr_str(&request.method)));
            if has_headers {
                body.push_str("\n    ..headers.addAll(headers)");
            }
            if data.is_some() {
                body.push_str("\n    ..body = data");
            }
            body.push_str(";\n");
            body.push_str(&format!("  final res = await http.Response.fromStream(await req.send(){});\n", timeout));
        }
    }

    body.push_str("  final status = res.statusCode;\n");
    body.push_str("  if (status != 200) throw Exception('http error: statusCode= $status');\n\n");
    body.push_str("  print(res.body);\n");
    body.push('}');

    let mut code = render_imports(&imports);
    code.push_str(&body);
    code
}

/// Dio `request` with an `Options` object
pub fn dio(request: &Request) -> String {
    let mut imports = BTreeSet::from(["package:dio/dio.dart"]);
    let mut body = String::from("void main() async {\n");

    let mut base = Vec::new();
    if let Some(timeout) = request.connect_timeout {
        base.push(format!("connectTimeout: const Duration(milliseconds: {})", (timeout * 1000.0).round() as u64));
    }
    if let Some(timeout) = request.timeout {
        base.push(format!("receiveTimeout: const Duration(milliseconds: {})", (timeout * 1000.0).round() as u64));
    }
    if base.is_empty() {
        body.push_str("  final dio = Dio();\n");
    } else {
        body.push_str(&format!("  final dio = Dio(BaseOptions({}));\n", base.join(", ")));
    }

    if request.insecure || request.proxy.is_some() {
        imports.insert("dart:io");
        imports.insert("package:dio/io.dart");
        body.push_str("  (dio.httpClientAdapter as IOHttpClientAdapter).createHttpClient = () {\n");
        body.push_str("    final client = HttpClient();\n");
        if request.insecure {
            body.push_str("    client.badCertificateCallback = (cert, host, port) => true;\n");
        }
        if let Some(proxy) = &request.proxy {
            let host = proxy.split_once("://").map(|(_, rest)| rest).unwrap_or(proxy);
            body.push_str(&format!("    client.findProxy = (uri) => {};\n", repr_str(&format!("PROXY {}", host))));
        }
        body.push_str("    return client;\n");
        body.push_str("  };\n");
    }
    if let Some(note) = auth_note(request) {
        body.push_str(&note);
    }
    body.push('\n');

    let data = match request.body_source() {
        BodySource::Multipart(fields) => {
            let entries: Vec<String> = fields
                .iter()
                .map(|field| {
                    let value = if field.is_file {
                        format!("await MultipartFile.fromFile({})", repr_str(&field.content))
                    } else {
                        repr_str(&field.content)
                    };
                    format!("    {}: {},", repr_str(&field.name), value)
                })
                .collect();
            Some(format!("FormData.fromMap({{\n{}\n  }})", entries.join("\n")))
        }
        _ => text_body(request, &mut imports),
    };
    if let Some(data) = &data {
        body.push_str(&format!("  final data = {};\n\n", data));
    }

    let mut options = vec![format!("      method: {},", repr_str(&request.method))];
    let entries = header_entries(request, "        ", &mut imports);
    if !entries.is_empty() {
        options.push(format!("      headers: {{\n{}\n      }},", entries.join("\n")));
    }
    if !request.follow_redirects {
        options.push("      followRedirects: false,".to_string());
    } else if let Some(max) = request.max_redirs {
        options.push(format!("      maxRedirects: {},", max));
    }

    body.push_str("  final response = await dio.request(\n");
    body.push_str(&format!("    {},\n", repr_str(request.url())));
    if data.is_some() {
        body.push_str("    data: data,\n");
    }
    body.push_str(&format!("    options: Options(\n{}\n    ),\n", options.join("\n")));
    body.push_str("  );\n");
    body.push_str("  print(response.data);\n");
    body.push('}');

    let mut code = render_imports(&imports);
    code.push_str(&body);
    code
}
