//! Perl generators: LWP::UserAgent and HTTP::Tiny

use super::common::{field_summary, join_literals, url_parts};
use super::VariantTable;
use crate::curl::{AuthType, BodySource, DataParam, FileData, FileType, Request};

pub const VARIANTS: VariantTable = &[("LWP", lwp), ("HTTPTiny", http_tiny)];

/// Perl string literal: single-quoted unless the text holds control
/// characters or whitespace other than a plain space
pub fn repr_str(s: &str) -> String {
    let needs_interpolation = s.chars().any(|c| c.is_control() || (c.is_whitespace() && c != ' '));
    if !needs_interpolation {
        return format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"));
    }

    let mut out = String::from("\"");
    for c in s.chars() {
        match c {
            '$' | '@' | '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() || (c.is_whitespace() && c != ' ') => {
                out.push_str(&format!("\\x{{{:x}}}", c as u32))
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Slurp expression for a file, or standard input
fn slurp(file: &FileData) -> String {
    if file.is_stdin() {
        "do { local $/; <STDIN> }".to_string()
    } else {
        format!(
            "do {{ local $/; open my $fh, '<', {} or die $!; <$fh> }}",
            repr_str(&file.filename)
        )
    }
}

/// String expression for the data items, with `use` lines it needs
fn data_expr(params: &[DataParam], uses: &mut Vec<&'static str>) -> String {
    if let Some(joined) = join_literals(params) {
        return repr_str(&joined);
    }
    let parts: Vec<String> = params
        .iter()
        .map(|param| match param {
            DataParam::Literal(s) => repr_str(s),
            DataParam::File(file) => {
                let read = slurp(file);
                match file.filetype {
                    FileType::Data => format!("({}) =~ s/[\\r\\n]//gr", read),
                    FileType::Binary | FileType::Json => read,
                    FileType::Urlencode => {
                        if !uses.contains(&"URI::Escape") {
                            uses.push("URI::Escape");
                        }
                        let encoded = format!("uri_escape({})", read);
                        match &file.name {
                            Some(name) => format!("{} . {}", repr_str(&format!("{}=", name)), encoded),
                            None => encoded,
                        }
                    }
                }
            }
        })
        .collect();
    parts.join(" . '&' . ")
}

fn text_body(request: &Request, uses: &mut Vec<&'static str>) -> Option<String> {
    match request.body_source() {
        BodySource::Json(_) => request.json_text().map(|text| repr_str(&text)),
        BodySource::DataArray(_) | BodySource::Legacy(_) => Some(data_expr(&request.data_params(), uses)),
        BodySource::Multipart(_) => None,
        BodySource::Empty => request.upload_file().map(|file| {
            slurp(&FileData {
                filetype: FileType::Binary,
                filename: file.to_string(),
                name: None,
            })
        }),
    }
}

fn preamble(uses: &[&str]) -> String {
    let mut code = String::from("use strict;\nuse warnings;\n");
    for module in uses {
        code.push_str(&format!("use {};\n", module));
    }
    code.push('\n');
    code
}

/// LWP::UserAgent with an HTTP::Request, or HTTP::Request::Common for forms
pub fn lwp(request: &Request) -> String {
    let mut uses = vec!["LWP::UserAgent", "HTTP::Request"];
    let mut body = String::from("my $ua = LWP::UserAgent->new;\n");
    if request.insecure {
        body.push_str("$ua->ssl_opts(verify_hostname => 0, SSL_verify_mode => 0);\n");
    }
    if let Some(timeout) = request.timeout {
        body.push_str(&format!("$ua->timeout({});\n", timeout));
    }
    if let Some(proxy) = &request.proxy {
        body.push_str(&format!("$ua->proxy(['http', 'https'], {});\n", repr_str(proxy)));
    }
    if !request.follow_redirects {
        body.push_str("$ua->max_redirect(0);\n");
    } else if let Some(max) = request.max_redirs {
        body.push_str(&format!("$ua->max_redirect({});\n", max));
    }
    body.push('\n');

    let multipart = matches!(request.body_source(), BodySource::Multipart(_));
    if let BodySource::Multipart(fields) = request.body_source() {
        uses.push("HTTP::Request::Common");
        body.push_str(&format!(
            "my $request = POST {},\n    Content_Type => 'form-data',\n    Content => [\n",
            repr_str(request.url())
        ));
        for field in fields {
            if field.is_file {
                body.push_str(&format!("        {} => [{}],\n", repr_str(&field.name), repr_str(&field.content)));
            } else {
                body.push_str(&format!("        {} => {},\n", repr_str(&field.name), repr_str(&field.content)));
            }
        }
        body.push_str("    ];\n");
        if request.method != "POST" {
            body.push_str(&format!("$request->method({});\n", repr_str(&request.method)));
        }
    } else {
        body.push_str(&format!(
            "my $request = HTTP::Request->new({} => {});\n",
            repr_str(&request.method),
            repr_str(request.url())
        ));
    }

    for (name, value) in &request.headers {
        if multipart && name.eq_ignore_ascii_case("content-type") {
            continue;
        }
        body.push_str(&format!("$request->header({} => {});\n", repr_str(name), repr_str(value)));
    }
    if let Some(content) = text_body(request, &mut uses) {
        body.push_str(&format!("$request->content({});\n", content));
    }
    if let Some(auth) = &request.auth {
        if auth.auth_type == AuthType::Basic {
            body.push_str(&format!(
                "$request->authorization_basic({}, {});\n",
                repr_str(&auth.username),
                repr_str(&auth.password)
            ));
        } else {
            let parts = url_parts(request.url());
            body.push_str(&format!(
                "$ua->credentials({}, '', {}, {});\n",
                repr_str(&format!("{}:{}", parts.host, parts.port)),
                repr_str(&auth.username),
                repr_str(&auth.password)
            ));
        }
    }

    body.push_str("\nmy $response = $ua->request($request);\n");
    body.push_str("if ($response->is_success) {\n");
    body.push_str("    print $response->decoded_content;\n");
    body.push_str("} else {\n");
    body.push_str("    die $response->status_line;\n");
    body.push('}');

    let mut code = preamble(&uses);
    code.push_str(&body);
    code
}

/// HTTP::Tiny `request` with an options hash
pub fn http_tiny(request: &Request) -> String {
    let mut uses = vec!["HTTP::Tiny"];
    let mut body = String::new();

    let mut agent_args = Vec::new();
    if request.insecure {
        agent_args.push("verify_SSL => 0".to_string());
    }
    if let Some(timeout) = request.timeout {
        agent_args.push(format!("timeout => {}", timeout));
    }
    if let Some(proxy) = &request.proxy {
        agent_args.push(format!("proxy => {}", repr_str(proxy)));
    }
    if !request.follow_redirects {
        agent_args.push("max_redirect => 0".to_string());
    }
    body.push_str(&format!("my $http = HTTP::Tiny->new({});\n\n", agent_args.join(", ")));

    let mut headers: Vec<String> = request
        .headers
        .iter()
        .map(|(k, v)| format!("        {} => {},", repr_str(k), repr_str(v)))
        .collect();
    if let Some(auth) = &request.auth {
        if !uses.contains(&"MIME::Base64") {
            uses.push("MIME::Base64");
        }
        if auth.auth_type != AuthType::Basic {
            body.push_str(&format!(
                "# HTTP::Tiny has no {:?} support; sending basic credentials\n",
                auth.auth_type
            ));
        }
        headers.push(format!(
            "        'Authorization' => 'Basic ' . encode_base64({}, ''),",
            repr_str(&format!("{}:{}", auth.username, auth.password))
        ));
    }

    let mut options = Vec::new();
    if !headers.is_empty() {
        options.push(format!("    headers => {{\n{}\n    }},", headers.join("\n")));
    }
    if let BodySource::Multipart(fields) = request.body_source() {
        body.push_str("# HTTP::Tiny does not build multipart bodies; fields:\n");
        for field in fields {
            body.push_str(&format!("#   {}\n", field_summary(field)));
        }
        body.push('\n');
    } else if let Some(content) = text_body(request, &mut uses) {
        options.push(format!("    content => {},", content));
    }

    if options.is_empty() {
        body.push_str(&format!(
            "my $response = $http->request({}, {});\n",
            repr_str(&request.method),
            repr_str(request.url())
        ));
    } else {
        body.push_str(&format!(
            "my $response = $http->request({}, {}, {{\n{}\n}});\n",
            repr_str(&request.method),
            repr_str(request.url()),
            options.join("\n")
        ));
    }

    body.push_str("\ndie \"$response->{status} $response->{reason}\\n\" unless $response->{success};\n");
    body.push_str("print $response->{content};");

    let mut code = preamble(&uses);
    code.push_str(&body);
    code
}
