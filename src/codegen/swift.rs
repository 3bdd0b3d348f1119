//! Swift generators: Foundation `URLSession` and Alamofire
//!
//! Both emit top-level async code, as run by `swift script.swift`.

use super::common::{backslash_escape, field_summary, join_literals, unicode_braced};
use super::VariantTable;
use crate::curl::{AuthType, BodySource, DataParam, FileData, FileType, Request};

pub const VARIANTS: VariantTable = &[("URLSession", url_session), ("Alamofire", alamofire)];

/// Swift string literal
pub fn repr_str(s: &str) -> String {
    format!("\"{}\"", backslash_escape(s, '"', unicode_braced))
}

fn read_text(file: &FileData) -> String {
    if file.is_stdin() {
        "(String(data: FileHandle.standardInput.readDataToEndOfFile(), encoding: .utf8) ?? \"\")".to_string()
    } else {
        format!("(try String(contentsOfFile: {}, encoding: .utf8))", repr_str(&file.filename))
    }
}

fn read_data(filename: &str) -> String {
    if filename == "-" {
        "FileHandle.standardInput.readDataToEndOfFile()".to_string()
    } else {
        format!("try Data(contentsOf: URL(fileURLWithPath: {}))", repr_str(filename))
    }
}

/// String expression for the data items
fn data_expr(params: &[DataParam]) -> String {
    if let Some(joined) = join_literals(params) {
        return repr_str(&joined);
    }
    let parts: Vec<String> = params
        .iter()
        .map(|param| match param {
            DataParam::Literal(s) => repr_str(s),
            DataParam::File(file) => {
                let read = read_text(file);
                match file.filetype {
                    FileType::Data => format!("{}.components(separatedBy: .newlines).joined()", read),
                    FileType::Binary | FileType::Json => read,
                    FileType::Urlencode => {
                        let encoded = format!("({}.addingPercentEncoding(withAllowedCharacters: .alphanumerics) ?? \"\")", read);
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
    format!("[\n    {},\n].joined(separator: \"&\")", parts.join(",\n    "))
}

/// `httpBody` expression, `None` for multipart or no body
fn http_body(request: &Request) -> Option<String> {
    match request.body_source() {
        BodySource::Json(_) => request.json_text().map(|text| format!("Data({}.utf8)", repr_str(&text))),
        BodySource::DataArray(_) | BodySource::Legacy(_) => {
            let params = request.data_params();
            match params.as_slice() {
                [DataParam::File(file)] if matches!(file.filetype, FileType::Binary | FileType::Json) => {
                    Some(read_data(&file.filename))
                }
                _ => Some(format!("Data({}.utf8)", data_expr(&params))),
            }
        }
        BodySource::Empty => request.upload_file().map(read_data),
        BodySource::Multipart(_) => None,
    }
}

/// Lines building `var request = URLRequest(...)`, with method, headers and body
fn url_request(request: &Request, basic_header: bool) -> String {
    let mut code = format!("let url = URL(string: {})!\n", repr_str(request.url()));
    code.push_str("var request = URLRequest(url: url)\n");
    code.push_str(&format!("request.httpMethod = {}\n", repr_str(&request.method)));
    if let Some(timeout) = request.timeout {
        code.push_str(&format!("request.timeoutInterval = {}\n", timeout));
    }
    for (name, value) in &request.headers {
        code.push_str(&format!(
            "request.setValue({}, forHTTPHeaderField: {})\n",
            repr_str(value),
            repr_str(name)
        ));
    }
    if let (true, Some(auth)) = (basic_header, &request.auth) {
        if auth.auth_type != AuthType::Basic {
            code.push_str(&format!("// {:?} authentication needs a URLSessionDelegate; sending basic credentials\n", auth.auth_type));
        }
        code.push_str(&format!(
            "let credentials = Data({}.utf8).base64EncodedString()\n",
            repr_str(&format!("{}:{}", auth.username, auth.password))
        ));
        code.push_str("request.setValue(\"Basic \\(credentials)\", forHTTPHeaderField: \"Authorization\")\n");
    }
    if let Some(body) = http_body(request) {
        code.push_str(&format!("request.httpBody = {}\n", body));
    }
    code
}

fn multipart_comment(request: &Request) -> String {
    let mut code = String::from("// URLSession has no multipart encoder; fields:\n");
    if let BodySource::Multipart(fields) = request.body_source() {
        for field in fields {
            code.push_str(&format!("//   {}\n", field_summary(field)));
        }
    }
    code
}

/// `URLSession.shared.data(for:)`
pub fn url_session(request: &Request) -> String {
    let mut code = String::from("import Foundation\n\n");
    if request.insecure {
        code.push_str("// disabling certificate checks needs a URLSessionDelegate\n");
    }
    if matches!(request.body_source(), BodySource::Multipart(_)) {
        code.push_str(&multipart_comment(request));
    }
    code.push_str(&url_request(request, true));
    code.push('\n');
    code.push_str("let (data, response) = try await URLSession.shared.data(for: request)\n");
    code.push_str("if let http = response as? HTTPURLResponse, http.statusCode != 200 {\n");
    code.push_str("    print(\"status: \\(http.statusCode)\")\n");
    code.push_str("}\n");
    code.push_str("print(String(decoding: data, as: UTF8.self))");
    code
}

fn af_method(method: &str) -> String {
    match method {
        "GET" | "POST" | "PUT" | "PATCH" | "DELETE" | "HEAD" | "OPTIONS" => {
            format!(".{}", method.to_ascii_lowercase())
        }
        other => format!("HTTPMethod(rawValue: {})", repr_str(other)),
    }
}

/// `AF.request` on a prepared `URLRequest`, or `AF.upload` for multipart
pub fn alamofire(request: &Request) -> String {
    let mut code = String::from("import Alamofire\nimport Foundation\n\n");

    let mut chain = String::new();
    if let BodySource::Multipart(fields) = request.body_source() {
        let headers: Vec<String> = request
            .headers_without_content_type()
            .map(|(k, v)| format!("    {}: {},", repr_str(k), repr_str(v)))
            .collect();
        if headers.is_empty() {
            code.push_str("let headers: HTTPHeaders = [:]\n\n");
        } else {
            code.push_str(&format!("let headers: HTTPHeaders = [\n{}\n]\n\n", headers.join("\n")));
        }
        chain.push_str("AF.upload(\n    multipartFormData: { form in\n");
        for field in fields {
            if field.is_file {
                chain.push_str(&format!(
                    "        form.append(URL(fileURLWithPath: {}), withName: {})\n",
                    repr_str(&field.content),
                    repr_str(&field.name)
                ));
            } else {
                chain.push_str(&format!(
                    "        form.append(Data({}.utf8), withName: {})\n",
                    repr_str(&field.content),
                    repr_str(&field.name)
                ));
            }
        }
        chain.push_str(&format!(
            "    }},\n    to: {},\n    method: {},\n    headers: headers\n)",
            repr_str(request.url()),
            af_method(&request.method)
        ));
    } else {
        code.push_str(&url_request(request, false));
        code.push('\n');
        chain.push_str("AF.request(request)");
    }

    if let Some(auth) = &request.auth {
        chain.push_str(&format!(
            "\n    .authenticate(username: {}, password: {})",
            repr_str(&auth.username),
            repr_str(&auth.password)
        ));
    }
    if !request.follow_redirects {
        chain.push_str("\n    .redirect(using: .doNotFollow)");
    }
    if request.insecure {
        code.push_str("// disabling certificate checks needs a Session with a ServerTrustManager\n");
    }

    code.push_str(&format!("let body = try await {}\n    .serializingString()\n    .value\n", chain));
    code.push_str("print(body)");
    code
}
