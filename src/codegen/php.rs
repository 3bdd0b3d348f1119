//! PHP generators: the curl extension and Guzzle

use serde_json::Value;

use super::common::join_literals;
use super::VariantTable;
use crate::curl::{AuthType, BodySource, DataParam, FileType, Request};

pub const VARIANTS: VariantTable = &[("cURL", curl_ext), ("Guzzle", guzzle)];

/// PHP single-quoted literal; only `\` and `'` are special
pub fn repr_str(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Short-array literal for a JSON value
fn php_array(value: &Value, level: usize) -> String {
    let pad = "    ".repeat(level + 1);
    let close = "    ".repeat(level);
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => repr_str(s),
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items
                .iter()
                .map(|item| format!("{}{}", pad, php_array(item, level + 1)))
                .collect();
            format!("[\n{}\n{}]", items.join(",\n"), close)
        }
        Value::Object(map) if map.is_empty() => "new \\stdClass()".to_string(),
        Value::Object(map) => {
            let items: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}{} => {}", pad, repr_str(k), php_array(v, level + 1)))
                .collect();
            format!("[\n{}\n{}]", items.join(",\n"), close)
        }
    }
}

/// Statements building `$data` from the data items
fn data_builder(params: &[DataParam]) -> String {
    if let Some(joined) = join_literals(params) {
        return format!("$data = {};\n", repr_str(&joined));
    }

    let mut code = String::from("$data = '';\n");
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            code.push_str("$data .= '&';\n");
        }
        match param {
            DataParam::Literal(s) => code.push_str(&format!("$data .= {};\n", repr_str(s))),
            DataParam::File(file) => {
                let source = if file.is_stdin() {
                    "'php://stdin'".to_string()
                } else {
                    repr_str(&file.filename)
                };
                let read = format!("file_get_contents({})", source);
                let value = match file.filetype {
                    FileType::Data => format!("str_replace([\"\\n\", \"\\r\"], '', {})", read),
                    FileType::Binary | FileType::Json => read,
                    FileType::Urlencode => match &file.name {
                        Some(name) => format!("{} . urlencode({})", repr_str(&format!("{}=", name)), read),
                        None => format!("urlencode({})", read),
                    },
                };
                code.push_str(&format!("$data .= {};\n", value));
            }
        }
    }
    code
}

/// `curl_init` / `curl_setopt` / `curl_exec`
pub fn curl_ext(request: &Request) -> String {
    let mut code = String::from("<?php\n\n$ch = curl_init();\n\n");
    code.push_str(&format!("curl_setopt($ch, CURLOPT_URL, {});\n", repr_str(request.url())));
    code.push_str("curl_setopt($ch, CURLOPT_RETURNTRANSFER, true);\n");

    let method = request.method.to_uppercase();
    match method.as_str() {
        "GET" => {}
        "HEAD" => code.push_str("curl_setopt($ch, CURLOPT_NOBODY, true);\n"),
        _ => code.push_str(&format!("curl_setopt($ch, CURLOPT_CUSTOMREQUEST, {});\n", repr_str(&method))),
    }

    if request.has_headers() {
        code.push_str("\n$headers = [\n");
        for (name, value) in &request.headers {
            code.push_str(&format!("    {},\n", repr_str(&format!("{}: {}", name, value))));
        }
        code.push_str("];\n");
        code.push_str("curl_setopt($ch, CURLOPT_HTTPHEADER, $headers);\n");
    }

    match request.body_source() {
        BodySource::Multipart(fields) => {
            code.push_str("\n$postFields = [\n");
            for field in fields {
                if field.is_file {
                    code.push_str(&format!(
                        "    {} => new CURLFile({}),\n",
                        repr_str(&field.name),
                        repr_str(&field.content)
                    ));
                } else {
                    code.push_str(&format!("    {} => {},\n", repr_str(&field.name), repr_str(&field.content)));
                }
            }
            code.push_str("];\n");
            code.push_str("curl_setopt($ch, CURLOPT_POSTFIELDS, $postFields);\n");
        }
        BodySource::Json(_) => {
            let text = request.json_text().unwrap_or_default();
            code.push_str(&format!("\n$data = {};\n", repr_str(&text)));
            code.push_str("curl_setopt($ch, CURLOPT_POSTFIELDS, $data);\n");
        }
        BodySource::DataArray(_) | BodySource::Legacy(_) => {
            code.push('\n');
            code.push_str(&data_builder(&request.data_params()));
            code.push_str("curl_setopt($ch, CURLOPT_POSTFIELDS, $data);\n");
        }
        BodySource::Empty => {
            if let Some(file) = request.upload_file() {
                code.push_str(&format!("\n$upload = fopen({}, 'r');\n", repr_str(file)));
                code.push_str("curl_setopt($ch, CURLOPT_UPLOAD, true);\n");
                code.push_str("curl_setopt($ch, CURLOPT_INFILE, $upload);\n");
            }
        }
    }

    if let Some(auth) = &request.auth {
        code.push('\n');
        code.push_str(&format!(
            "curl_setopt($ch, CURLOPT_USERPWD, {});\n",
            repr_str(&format!("{}:{}", auth.username, auth.password))
        ));
        let constant = match auth.auth_type {
            AuthType::Basic => None,
            AuthType::Digest => Some("CURLAUTH_DIGEST"),
            AuthType::Ntlm => Some("CURLAUTH_NTLM"),
            AuthType::Negotiate => Some("CURLAUTH_NEGOTIATE"),
        };
        if let Some(constant) = constant {
            code.push_str(&format!("curl_setopt($ch, CURLOPT_HTTPAUTH, {});\n", constant));
        }
    }

    let mut extra = Vec::new();
    if request.compressed {
        extra.push("curl_setopt($ch, CURLOPT_ENCODING, '');".to_string());
    }
    if request.insecure {
        extra.push("curl_setopt($ch, CURLOPT_SSL_VERIFYPEER, false);".to_string());
        extra.push("curl_setopt($ch, CURLOPT_SSL_VERIFYHOST, 0);".to_string());
    }
    if request.follow_redirects {
        extra.push("curl_setopt($ch, CURLOPT_FOLLOWLOCATION, true);".to_string());
    }
    if let Some(max) = request.max_redirs {
        extra.push(format!("curl_setopt($ch, CURLOPT_MAXREDIRS, {});", max));
    }
    if let Some(timeout) = request.timeout {
        extra.push(format!("curl_setopt($ch, CURLOPT_TIMEOUT_MS, {});", (timeout * 1000.0) as u64));
    }
    if let Some(timeout) = request.connect_timeout {
        extra.push(format!("curl_setopt($ch, CURLOPT_CONNECTTIMEOUT_MS, {});", (timeout * 1000.0) as u64));
    }
    if let Some(proxy) = &request.proxy {
        extra.push(format!("curl_setopt($ch, CURLOPT_PROXY, {});", repr_str(proxy)));
    }
    if !extra.is_empty() {
        code.push('\n');
        code.push_str(&extra.join("\n"));
        code.push('\n');
    }

    code.push_str("\n$result = curl_exec($ch);\n");
    code.push_str("if (curl_errno($ch)) {\n");
    code.push_str("    echo 'Error: ' . curl_error($ch);\n");
    code.push_str("}\n");
    code.push_str("curl_close($ch);\n");
    code.push_str("echo $result;");
    code
}

/// Guzzle client with a request options array
pub fn guzzle(request: &Request) -> String {
    let mut code = String::from("<?php\n\nrequire 'vendor/autoload.php';\n\nuse GuzzleHttp\\Client;\n\n");
    code.push_str("$client = new Client();\n\n");

    let structured_json = matches!(request.body_source(), BodySource::Json(v) if !v.is_string());
    let mut options = Vec::new();

    let headers: Vec<String> = request
        .headers
        .iter()
        .filter(|(k, _)| !(structured_json && k.eq_ignore_ascii_case("content-type")))
        .map(|(k, v)| format!("        {} => {}", repr_str(k), repr_str(v)))
        .collect();
    if !headers.is_empty() {
        options.push(format!("    'headers' => [\n{}\n    ]", headers.join(",\n")));
    }

    match request.body_source() {
        BodySource::Multipart(fields) => {
            let parts: Vec<String> = fields
                .iter()
                .map(|field| {
                    let contents = if field.is_file {
                        format!("fopen({}, 'r')", repr_str(&field.content))
                    } else {
                        repr_str(&field.content)
                    };
                    format!(
                        "        [\n            'name' => {},\n            'contents' => {}\n        ]",
                        repr_str(&field.name),
                        contents
                    )
                })
                .collect();
            options.push(format!("    'multipart' => [\n{}\n    ]", parts.join(",\n")));
        }
        BodySource::Json(Value::String(raw)) => {
            options.push(format!("    'body' => {}", repr_str(raw)));
        }
        BodySource::Json(value) => {
            options.push(format!("    'json' => {}", php_array(value, 1)));
        }
        BodySource::DataArray(_) | BodySource::Legacy(_) => {
            code.push_str(&data_builder(&request.data_params()));
            code.push('\n');
            options.push("    'body' => $data".to_string());
        }
        BodySource::Empty => {
            if let Some(file) = request.upload_file() {
                options.push(format!("    'body' => fopen({}, 'r')", repr_str(file)));
            }
        }
    }

    if let Some(auth) = &request.auth {
        let scheme = match auth.auth_type {
            AuthType::Basic => String::new(),
            AuthType::Digest => ", 'digest'".to_string(),
            AuthType::Ntlm => ", 'ntlm'".to_string(),
            AuthType::Negotiate => ", 'negotiate'".to_string(),
        };
        options.push(format!(
            "    'auth' => [{}, {}{}]",
            repr_str(&auth.username),
            repr_str(&auth.password),
            scheme
        ));
    }
    if request.insecure {
        options.push("    'verify' => false".to_string());
    }
    if let Some(timeout) = request.timeout {
        options.push(format!("    'timeout' => {}", timeout));
    }
    if let Some(proxy) = &request.proxy {
        options.push(format!("    'proxy' => {}", repr_str(proxy)));
    }
    if request.follow_redirects {
        options.push("    'allow_redirects' => true".to_string());
    }

    code.push_str(&format!(
        "$response = $client->request({}, {}",
        repr_str(&request.method.to_uppercase()),
        repr_str(request.url())
    ));
    if !options.is_empty() {
        code.push_str(&format!(", [\n{}\n]", options.join(",\n")));
    }
    code.push_str(");\n\n");
    code.push_str("echo $response->getBody();");
    code
}
