//! Rust generators: blocking reqwest and ureq
//!
//! Each program opens with the dependency lines it needs in `Cargo.toml`.

use super::common::{backslash_escape, field_summary, join_literals, unicode_braced};
use super::VariantTable;
use crate::curl::{AuthType, BodySource, DataParam, FileType, Request};

pub const VARIANTS: VariantTable = &[("Reqwest", reqwest), ("Ureq", ureq)];

/// Rust string literal
pub fn repr_str(s: &str) -> String {
    format!("\"{}\"", backslash_escape(s, '"', unicode_braced))
}

/// Collects `use` lines and Cargo dependencies while the body is rendered
#[derive(Default)]
struct Prelude {
    uses: Vec<&'static str>,
    crates: Vec<&'static str>,
}

impl Prelude {
    fn add_use(&mut self, line: &'static str) {
        if !self.uses.contains(&line) {
            self.uses.push(line);
        }
    }

    fn add_crate(&mut self, line: &'static str) {
        if !self.crates.contains(&line) {
            self.crates.push(line);
        }
    }

    fn render(&self) -> String {
        let mut code = String::from("// [dependencies]\n");
        for line in &self.crates {
            code.push_str(&format!("// {}\n", line));
        }
        code.push('\n');
        let mut uses = self.uses.clone();
        uses.sort_unstable();
        for line in uses {
            code.push_str(&format!("use {};\n", line));
        }
        if !self.uses.is_empty() {
            code.push('\n');
        }
        code
    }
}

/// Statements binding `var` to the contents of a file or stdin
fn read_into(var: &str, filename: &str, prelude: &mut Prelude) -> String {
    if filename == "-" {
        prelude.add_use("std::io::Read");
        format!(
            "let mut {var} = String::new();\n    std::io::stdin().read_to_string(&mut {var})?;\n",
            var = var
        )
    } else {
        format!("let {} = std::fs::read_to_string({})?;\n", var, repr_str(filename))
    }
}

/// Statements building `body`, returning them with the body expression
fn body_statements(request: &Request, prelude: &mut Prelude) -> Option<(String, String)> {
    match request.body_source() {
        BodySource::Json(_) => request.json_text().map(|text| (String::new(), repr_str(&text))),
        BodySource::DataArray(_) | BodySource::Legacy(_) => {
            let params = request.data_params();
            if let Some(joined) = join_literals(&params) {
                return Some((String::new(), repr_str(&joined)));
            }
            if let [DataParam::File(file)] = params.as_slice() {
                if file.filetype == FileType::Binary && !file.is_stdin() {
                    return Some((
                        format!("let body = std::fs::read({})?;\n", repr_str(&file.filename)),
                        "body".to_string(),
                    ));
                }
            }

            let mut code = String::new();
            let mut parts = Vec::new();
            let mut count = 0;
            for param in &params {
                match param {
                    DataParam::Literal(s) => parts.push(format!("{}.to_string()", repr_str(s))),
                    DataParam::File(file) => {
                        count += 1;
                        let var = format!("content{}", count);
                        code.push_str("    ");
                        code.push_str(&read_into(&var, &file.filename, prelude));
                        parts.push(match file.filetype {
                            FileType::Data => format!("{}.replace(['\\r', '\\n'], \"\")", var),
                            FileType::Binary | FileType::Json => var,
                            FileType::Urlencode => {
                                prelude.add_crate("urlencoding = \"2\"");
                                match &file.name {
                                    Some(name) => format!(
                                        "format!(\"{}={{}}\", urlencoding::encode(&{}))",
                                        backslash_escape(name, '"', unicode_braced).replace('{', "{{").replace('}', "}}"),
                                        var
                                    ),
                                    None => format!("urlencoding::encode(&{}).into_owned()", var),
                                }
                            }
                        });
                    }
                }
            }
            code.push_str(&format!(
                "    let body = [\n        {},\n    ]\n    .join(\"&\");\n",
                parts.join(",\n        ")
            ));
            Some((code.trim_start().to_string(), "body".to_string()))
        }
        BodySource::Empty => request.upload_file().map(|file| {
            (format!("let body = std::fs::read({})?;\n", repr_str(file)), "body".to_string())
        }),
        BodySource::Multipart(_) => None,
    }
}

fn reqwest_method(method: &str) -> Option<&'static str> {
    match method {
        "GET" => Some("get"),
        "POST" => Some("post"),
        "PUT" => Some("put"),
        "PATCH" => Some("patch"),
        "DELETE" => Some("delete"),
        "HEAD" => Some("head"),
        _ => None,
    }
}

/// `reqwest::blocking::Client` with a builder chain
pub fn reqwest(request: &Request) -> String {
    let mut prelude = Prelude::default();
    let multipart = matches!(request.body_source(), BodySource::Multipart(_));
    prelude.add_crate(if multipart {
        "reqwest = { version = \"0.12\", features = [\"blocking\", \"multipart\"] }"
    } else {
        "reqwest = { version = \"0.12\", features = [\"blocking\"] }"
    });

    let mut body = String::from("fn main() -> Result<(), Box<dyn std::error::Error>> {\n");

    let mut builder = vec!["reqwest::blocking::Client::builder()".to_string()];
    if request.insecure {
        builder.push(".danger_accept_invalid_certs(true)".to_string());
    }
    if !request.follow_redirects {
        builder.push(".redirect(reqwest::redirect::Policy::none())".to_string());
    } else if let Some(max) = request.max_redirs {
        builder.push(format!(".redirect(reqwest::redirect::Policy::limited({}))", max));
    }
    if let Some(timeout) = request.timeout {
        prelude.add_use("std::time::Duration");
        builder.push(format!(".timeout(Duration::from_secs_f64({:?}))", timeout));
    }
    if let Some(timeout) = request.connect_timeout {
        prelude.add_use("std::time::Duration");
        builder.push(format!(".connect_timeout(Duration::from_secs_f64({:?}))", timeout));
    }
    if let Some(proxy) = &request.proxy {
        builder.push(format!(".proxy(reqwest::Proxy::all({})?)", repr_str(proxy)));
    }
    builder.push(".build()?".to_string());
    body.push_str(&format!("    let client = {};\n\n", builder.join("\n        ")));

    let data = body_statements(request, &mut prelude);
    if let Some((statements, _)) = &data {
        if !statements.is_empty() {
            body.push_str("    ");
            body.push_str(statements);
            body.push('\n');
        }
    }

    if let BodySource::Multipart(fields) = request.body_source() {
        let mut form = vec!["reqwest::blocking::multipart::Form::new()".to_string()];
        for field in fields {
            if field.is_file {
                form.push(format!(".file({}, {})?", repr_str(&field.name), repr_str(&field.content)));
            } else {
                form.push(format!(".text({}, {})", repr_str(&field.name), repr_str(&field.content)));
            }
        }
        body.push_str(&format!("    let form = {};\n\n", form.join("\n        ")));
    }

    let mut chain = vec![match reqwest_method(&request.method) {
        Some(method) => format!("client.{}({})", method, repr_str(request.url())),
        None => format!(
            "client.request(reqwest::Method::from_bytes({}.as_bytes())?, {})",
            repr_str(&request.method),
            repr_str(request.url())
        ),
    }];
    for (name, value) in &request.headers {
        if multipart && name.eq_ignore_ascii_case("content-type") {
            continue;
        }
        chain.push(format!(".header({}, {})", repr_str(name), repr_str(value)));
    }
    if let Some(auth) = &request.auth {
        if auth.auth_type != AuthType::Basic {
            body.push_str(&format!(
                "    // reqwest has no {:?} support; sending basic credentials\n",
                auth.auth_type
            ));
        }
        chain.push(format!(
            ".basic_auth({}, Some({}))",
            repr_str(&auth.username),
            repr_str(&auth.password)
        ));
    }
    if multipart {
        chain.push(".multipart(form)".to_string());
    } else if let Some((_, expr)) = &data {
        chain.push(format!(".body({})", expr));
    }
    chain.push(".send()?;".to_string());
    body.push_str(&format!("    let response = {}\n\n", chain.join("\n        ")));

    if let Some(path) = &request.output_path {
        body.push_str(&format!("    std::fs::write({}, response.bytes()?)?;\n", repr_str(path)));
    } else {
        body.push_str("    println!(\"{}\", response.text()?);\n");
    }
    body.push_str("    Ok(())\n}");

    let mut code = prelude.render();
    code.push_str(&body);
    code
}

/// `ureq` agent with `set` headers and a string or byte body
pub fn ureq(request: &Request) -> String {
    let mut prelude = Prelude::default();
    prelude.add_crate("ureq = \"2\"");

    let mut body = String::from("fn main() -> Result<(), Box<dyn std::error::Error>> {\n");

    if let BodySource::Multipart(fields) = request.body_source() {
        body.push_str("    // ureq does not build multipart bodies; fields:\n");
        for field in fields {
            body.push_str(&format!("    //   {}\n", field_summary(field)));
        }
        body.push('\n');
    }
    if request.insecure {
        body.push_str("    // disabling certificate checks needs a custom TLS config\n");
    }

    let mut agent = vec!["ureq::AgentBuilder::new()".to_string()];
    if !request.follow_redirects {
        agent.push(".redirects(0)".to_string());
    } else if let Some(max) = request.max_redirs {
        agent.push(format!(".redirects({})", max));
    }
    if let Some(timeout) = request.timeout {
        prelude.add_use("std::time::Duration");
        agent.push(format!(".timeout(Duration::from_secs_f64({:?}))", timeout));
    }
    if let Some(timeout) = request.connect_timeout {
        prelude.add_use("std::time::Duration");
        agent.push(format!(".timeout_connect(Duration::from_secs_f64({:?}))", timeout));
    }
    if let Some(proxy) = &request.proxy {
        agent.push(format!(".proxy(ureq::Proxy::new({})?)", repr_str(proxy)));
    }
    agent.push(".build();".to_string());
    body.push_str(&format!("    let agent = {}\n\n", agent.join("\n        ")));

    let data = body_statements(request, &mut prelude);
    if let Some((statements, _)) = &data {
        if !statements.is_empty() {
            body.push_str("    ");
            body.push_str(statements);
            body.push('\n');
        }
    }

    let mut chain = vec![format!(
        "agent.request({}, {})",
        repr_str(&request.method),
        repr_str(request.url())
    )];
    for (name, value) in &request.headers {
        chain.push(format!(".set({}, {})", repr_str(name), repr_str(value)));
    }
    if let Some(auth) = &request.auth {
        prelude.add_crate("base64 = \"0.22\"");
        prelude.add_use("base64::Engine");
        if auth.auth_type != AuthType::Basic {
            body.push_str(&format!(
                "    // ureq has no {:?} support; sending basic credentials\n",
                auth.auth_type
            ));
        }
        body.push_str(&format!(
            "    let credentials = base64::engine::general_purpose::STANDARD.encode({});\n\n",
            repr_str(&format!("{}:{}", auth.username, auth.password))
        ));
        chain.push(".set(\"Authorization\", &format!(\"Basic {}\", credentials))".to_string());
    }
    let send = match &data {
        Some((statements, expr)) if statements.contains("std::fs::read(") => format!(".send_bytes(&{})?;", expr),
        Some((_, expr)) if expr == "body" => ".send_string(&body)?;".to_string(),
        Some((_, expr)) => format!(".send_string({})?;", expr),
        None => ".call()?;".to_string(),
    };
    chain.push(send);
    body.push_str(&format!("    let response = {}\n\n", chain.join("\n        ")));

    if let Some(path) = &request.output_path {
        body.push_str(&format!(
            "    let mut file = std::fs::File::create({})?;\n    std::io::copy(&mut response.into_reader(), &mut file)?;\n",
            repr_str(path)
        ));
    } else {
        body.push_str("    println!(\"{}\", response.into_string()?);\n");
    }
    body.push_str("    Ok(())\n}");

    let mut code = prelude.render();
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
        assert_eq!(repr_str("\u{0}"), "\"\\u{0}\"");
    }

    #[test]
    fn test_reqwest_get() {
        let code = reqwest(&Request::get("https://example.com"));
        assert!(code.starts_with("// [dependencies]\n// reqwest = { version = \"0.12\", features = [\"blocking\"] }\n\nfn main()"));
        assert!(code.contains(".redirect(reqwest::redirect::Policy::none())"));
        assert!(code.contains("let response = client.get(\"https://example.com\")\n        .send()?;"));
    }

    #[test]
    fn test_reqwest_custom_method_with_data() {
        let request = parse("curl -L -X PURGE -d 'k=v' -H 'X-A: 1' https://example.com");
        let code = reqwest(&request);
        assert!(code.contains("client.request(reqwest::Method::from_bytes(\"PURGE\".as_bytes())?, \"https://example.com\")"));
        assert!(code.contains(".header(\"X-A\", \"1\")"));
        assert!(code.contains(".body(\"k=v\")"));
        assert!(!code.contains("Policy::none"));
    }

    #[test]
    fn test_reqwest_multipart() {
        let request = parse("curl -F 'f=@a.txt' -F 'n=1' https://example.com");
        let code = reqwest(&request);
        assert!(code.contains("features = [\"blocking\", \"multipart\"]"));
        assert!(code.contains(".file(\"f\", \"a.txt\")?"));
        assert!(code.contains(".text(\"n\", \"1\")"));
        assert!(code.contains(".multipart(form)"));
    }

    #[test]
    fn test_ureq_urlencoded_stdin() {
        let request = parse("curl --data-urlencode 'q@-' https://example.com");
        let code = ureq(&request);
        assert!(code.contains("// urlencoding = \"2\""));
        assert!(code.contains("use std::io::Read;"));
        assert!(code.contains("std::io::stdin().read_to_string(&mut content1)?;"));
        assert!(code.contains("format!(\"q={}\", urlencoding::encode(&content1))"));
        assert!(code.contains(".send_string(&body)?;"));
    }

    #[test]
    fn test_ureq_binary_file_and_auth() {
        let request = parse("curl -u me:pw --data-binary @blob.bin https://example.com");
        let code = ureq(&request);
        assert!(code.contains("let body = std::fs::read(\"blob.bin\")?;"));
        assert!(code.contains(".send_bytes(&body)?;"));
        assert!(code.contains("STANDARD.encode(\"me:pw\")"));
    }
}
