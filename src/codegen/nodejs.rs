//! Node.js generators: the `http`/`https` modules, Axios and Got

use serde_json::Value;

use super::common::{field_summary, indent_tail, json_pretty, url_parts};
use super::javascript::repr_str;
use super::VariantTable;
use crate::curl::{AuthType, BodySource, DataParam, FileType, FormParam, Request};

pub const VARIANTS: VariantTable = &[("Native HTTP", native_http), ("Axios", axios), ("Got", got)];

/// Body expression reading files with `fs.readFileSync`
fn data_expr(params: &[DataParam]) -> String {
    let parts: Vec<String> = params
        .iter()
        .map(|param| match param {
            DataParam::Literal(s) => repr_str(s),
            DataParam::File(file) => {
                let source = if file.is_stdin() { "0".to_string() } else { repr_str(&file.filename) };
                match file.filetype {
                    FileType::Binary => format!("fs.readFileSync({})", source),
                    FileType::Data => format!("fs.readFileSync({}, 'utf8').replace(/[\\r\\n]/g, '')", source),
                    FileType::Json => format!("fs.readFileSync({}, 'utf8')", source),
                    FileType::Urlencode => {
                        let read = format!("encodeURIComponent(fs.readFileSync({}, 'utf8'))", source);
                        match &file.name {
                            Some(name) => format!("{} + {}", repr_str(&format!("{}=", name)), read),
                            None => read,
                        }
                    }
                }
            }
        })
        .collect();
    parts.join(" + '&' + ")
}

fn needs_fs(request: &Request) -> bool {
    match request.body_source() {
        BodySource::Multipart(fields) => fields.iter().any(|f| f.is_file),
        BodySource::DataArray(_) | BodySource::Legacy(_) => {
            request.data_params().iter().any(|p| p.as_file().is_some())
        }
        _ => request.upload_file().is_some(),
    }
}

/// Header object entries at the given indent
fn header_entries(request: &Request, indent: &str, skip_content_type: bool) -> Vec<String> {
    request
        .headers
        .iter()
        .filter(|(k, _)| !(skip_content_type && k.eq_ignore_ascii_case("content-type")))
        .map(|(k, v)| format!("{}{}: {}", indent, repr_str(k), repr_str(v)))
        .collect()
}

/// `form-data` construction shared by Axios and Got
fn form_data(fields: &[FormParam]) -> String {
    let mut code = String::from("const form = new FormData();\n");
    for field in fields {
        if field.is_file {
            code.push_str(&format!(
                "form.append({}, fs.createReadStream({}));\n",
                repr_str(&field.name),
                repr_str(&field.content)
            ));
        } else {
            code.push_str(&format!(
                "form.append({}, {});\n",
                repr_str(&field.name),
                repr_str(&field.content)
            ));
        }
    }
    code.push('\n');
    code
}

/// Text body for clients that write a string
fn text_body(request: &Request) -> Option<String> {
    match request.body_source() {
        BodySource::Json(Value::String(raw)) => Some(repr_str(raw)),
        BodySource::Json(value) => Some(format!("JSON.stringify({})", json_pretty(value, 4))),
        BodySource::DataArray(_) | BodySource::Legacy(_) => Some(data_expr(&request.data_params())),
        BodySource::Multipart(_) => None,
        BodySource::Empty => request
            .upload_file()
            .map(|file| format!("fs.readFileSync({})", repr_str(file))),
    }
}

/// `http.request` / `https.request` with manual response buffering
pub fn native_http(request: &Request) -> String {
    let parts = url_parts(request.url());
    let module = if parts.scheme == "https" { "https" } else { "http" };

    let mut code = format!("const {0} = require('{0}');\n", module);
    if needs_fs(request) {
        code.push_str("const fs = require('fs');\n");
    }
    code.push('\n');
    code.push_str(&format!("const url = new URL({});\n\n", repr_str(request.url())));

    let mut options = vec![
        format!("    method: {}", repr_str(&request.method)),
        "    hostname: url.hostname".to_string(),
        "    port: url.port".to_string(),
        "    path: url.pathname + url.search".to_string(),
    ];
    let headers = header_entries(request, "        ", false);
    if !headers.is_empty() {
        options.push(format!("    headers: {{\n{}\n    }}", headers.join(",\n")));
    }
    if let Some(auth) = request.auth.as_ref().filter(|a| a.auth_type == AuthType::Basic) {
        options.push(format!(
            "    auth: {}",
            repr_str(&format!("{}:{}", auth.username, auth.password))
        ));
    }
    if request.insecure && module == "https" {
        options.push("    rejectUnauthorized: false".to_string());
    }
    code.push_str(&format!("const options = {{\n{}\n}};\n\n", options.join(",\n")));

    code.push_str(&format!("const req = {}.request(options, (res) => {{\n", module));
    code.push_str("    let data = '';\n");
    code.push_str("    res.on('data', (chunk) => {\n");
    code.push_str("        data += chunk;\n");
    code.push_str("    });\n");
    code.push_str("    res.on('end', () => {\n");
    code.push_str("        console.log(data);\n");
    code.push_str("    });\n");
    code.push_str("});\n\n");

    code.push_str("req.on('error', (error) => {\n");
    code.push_str("    console.error(error);\n");
    code.push_str("});\n\n");

    if let BodySource::Multipart(fields) = request.body_source() {
        code.push_str("// Multipart form data needs the form-data package with http.request; fields:\n");
        for field in fields {
            code.push_str(&format!("//   {}\n", field_summary(field)));
        }
    } else if let Some(body) = text_body(request) {
        code.push_str(&format!("req.write({});\n", body));
    }
    code.push_str("req.end();");
    code
}

/// Axios with a config object
pub fn axios(request: &Request) -> String {
    let mut code = String::from("// Install: npm install axios\nconst axios = require('axios');\n");
    let multipart = matches!(request.body_source(), BodySource::Multipart(_));
    if multipart {
        code.push_str("const FormData = require('form-data');\n");
    }
    if needs_fs(request) {
        code.push_str("const fs = require('fs');\n");
    }
    if request.insecure {
        code.push_str("const https = require('https');\n");
    }
    code.push('\n');

    let mut config = vec![
        format!("    url: {}", repr_str(request.url())),
        format!("    method: {}", repr_str(&request.method.to_lowercase())),
    ];

    let mut headers = header_entries(request, "        ", multipart);
    if let BodySource::Multipart(fields) = request.body_source() {
        code.push_str(&form_data(fields));
        headers.push("        ...form.getHeaders()".to_string());
    }
    if !headers.is_empty() {
        config.push(format!("    headers: {{\n{}\n    }}", headers.join(",\n")));
    }

    match request.body_source() {
        BodySource::Multipart(_) => config.push("    data: form".to_string()),
        BodySource::Json(value) if !value.is_string() => {
            config.push(format!("    data: {}", indent_tail(&json_pretty(value, 4), "    ")));
        }
        _ => {
            if let Some(body) = text_body(request) {
                config.push(format!("    data: {}", body));
            }
        }
    }

    if let Some(auth) = request.auth.as_ref().filter(|a| a.auth_type == AuthType::Basic) {
        config.push(format!(
            "    auth: {{\n        username: {},\n        password: {}\n    }}",
            repr_str(&auth.username),
            repr_str(&auth.password)
        ));
    }
    if let Some(timeout) = request.timeout {
        config.push(format!("    timeout: {}", (timeout * 1000.0) as u64));
    }
    if request.insecure {
        config.push("    httpsAgent: new https.Agent({ rejectUnauthorized: false })".to_string());
    }

    code.push_str(&format!("const config = {{\n{}\n}};\n\n", config.join(",\n")));
    code.push_str("axios(config)\n");
    code.push_str("    .then(response => {\n");
    code.push_str("        console.log(response.data);\n");
    code.push_str("    })\n");
    code.push_str("    .catch(error => {\n");
    code.push_str("        console.error('Error:', error.response?.data || error.message);\n");
    code.push_str("    });");
    code
}

/// Got with an options object, or the method shortcut for a bare request
pub fn got(request: &Request) -> String {
    let mut code = String::from("// Install: npm install got\nconst got = require('got');\n");
    let multipart = matches!(request.body_source(), BodySource::Multipart(_));
    if multipart {
        code.push_str("const FormData = require('form-data');\n");
    }
    if needs_fs(request) {
        code.push_str("const fs = require('fs');\n");
    }
    code.push('\n');

    let method = request.method.to_lowercase();
    let mut options = vec![format!("    method: {}", repr_str(&request.method))];

    let structured_json = matches!(request.body_source(), BodySource::Json(v) if !v.is_string());
    let headers = header_entries(request, "        ", structured_json || multipart);
    if !headers.is_empty() {
        options.push(format!("    headers: {{\n{}\n    }}", headers.join(",\n")));
    }

    match request.body_source() {
        BodySource::Multipart(fields) => {
            code.push_str(&form_data(fields));
            options.push("    body: form".to_string());
        }
        BodySource::Json(value) if !value.is_string() => {
            options.push(format!("    json: {}", indent_tail(&json_pretty(value, 4), "    ")));
        }
        _ => {
            if let Some(body) = text_body(request) {
                options.push(format!("    body: {}", body));
            }
        }
    }

    if let Some(auth) = request.auth.as_ref().filter(|a| a.auth_type == AuthType::Basic) {
        options.push(format!("    username: {}", repr_str(&auth.username)));
        options.push(format!("    password: {}", repr_str(&auth.password)));
    }
    if request.insecure {
        options.push("    https: { rejectUnauthorized: false }".to_string());
    }
    if request.follow_redirects {
        options.push("    followRedirect: true".to_string());
    }

    let url = repr_str(request.url());
    let shortcut = ["get", "post", "put", "patch", "delete", "head"].contains(&method.as_str());
    if options.len() == 1 && shortcut {
        code.push_str(&format!("got.{}({})\n", method, url));
    } else {
        code.push_str(&format!("const options = {{\n{}\n}};\n\n", options.join(",\n")));
        code.push_str(&format!("got({}, options)\n", url));
    }
    code.push_str("    .then(response => {\n");
    code.push_str("        console.log(response.body);\n");
    code.push_str("    })\n");
    code.push_str("    .catch(error => {\n");
    code.push_str("        console.error('Error:', error.response?.body || error.message);\n");
    code.push_str("    });");
    code
}
