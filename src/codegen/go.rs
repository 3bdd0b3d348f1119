//! Go generators: `net/http` and Resty

use std::collections::BTreeSet;

use super::common::{backslash_escape, join_literals, unicode_u4};
use super::VariantTable;
use crate::curl::{AuthType, BodySource, DataParam, FileType, FormParam, Request};

pub const VARIANTS: VariantTable = &[("HTTP", net_http), ("Resty", resty)];

/// Go interpreted string literal
pub fn repr_str(s: &str) -> String {
    format!("\"{}\"", backslash_escape(s, '"', unicode_u4))
}

const CHECK_ERR: &str = "\tif err != nil {\n\t\tlog.Fatal(err)\n\t}\n";

/// Render an import block; third-party paths go in a second group
fn import_block(imports: &BTreeSet<&str>) -> String {
    let (std, external): (Vec<&str>, Vec<&str>) = imports.iter().copied().partition(|path| !path.contains('.'));
    let mut code = String::from("import (\n");
    for path in std {
        code.push_str(&format!("\t\"{}\"\n", path));
    }
    if !external.is_empty() {
        code.push('\n');
        for path in external {
            code.push_str(&format!("\t\"{}\"\n", path));
        }
    }
    code.push_str(")\n\n");
    code
}

/// Statements accumulating the data items into `body` (a `strings.Builder`)
fn data_builder(params: &[DataParam], imports: &mut BTreeSet<&'static str>) -> String {
    imports.insert("strings");
    let mut code = String::from("\tvar body strings.Builder\n");
    let mut reads = 0;
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            code.push_str("\tbody.WriteString(\"&\")\n");
        }
        match param {
            DataParam::Literal(s) => code.push_str(&format!("\tbody.WriteString({})\n", repr_str(s))),
            DataParam::File(file) => {
                reads += 1;
                let var = format!("content{}", reads);
                imports.insert("os");
                if file.is_stdin() {
                    imports.insert("io");
                    code.push_str(&format!("\t{}, err := io.ReadAll(os.Stdin)\n", var));
                } else {
                    code.push_str(&format!("\t{}, err := os.ReadFile({})\n", var, repr_str(&file.filename)));
                }
                code.push_str(CHECK_ERR);
                match file.filetype {
                    FileType::Data => code.push_str(&format!(
                        "\tbody.WriteString(strings.NewReplacer(\"\\n\", \"\", \"\\r\", \"\").Replace(string({})))\n",
                        var
                    )),
                    FileType::Binary | FileType::Json => code.push_str(&format!("\tbody.Write({})\n", var)),
                    FileType::Urlencode => {
                        imports.insert("net/url");
                        if let Some(name) = &file.name {
                            code.push_str(&format!("\tbody.WriteString({})\n", repr_str(&format!("{}=", name))));
                        }
                        code.push_str(&format!("\tbody.WriteString(url.QueryEscape(string({})))\n", var));
                    }
                }
            }
        }
    }
    code
}

/// Statements writing a multipart body into `body` with `writer`
fn multipart_builder(fields: &[FormParam], imports: &mut BTreeSet<&'static str>) -> String {
    imports.extend(["bytes", "mime/multipart"]);
    let mut code = String::from("\tbody := &bytes.Buffer{}\n\twriter := multipart.NewWriter(body)\n");
    let mut files = 0;
    for field in fields {
        if field.is_file {
            files += 1;
            imports.extend(["io", "os", "path/filepath"]);
            code.push_str(&format!("\tfile{}, err := os.Open({})\n", files, repr_str(&field.content)));
            code.push_str(CHECK_ERR);
            code.push_str(&format!("\tdefer file{}.Close()\n", files));
            code.push_str(&format!(
                "\tpart{}, err := writer.CreateFormFile({}, filepath.Base({}))\n",
                files,
                repr_str(&field.name),
                repr_str(&field.content)
            ));
            code.push_str(CHECK_ERR);
            code.push_str(&format!("\tio.Copy(part{0}, file{0})\n", files));
        } else {
            code.push_str(&format!(
                "\twriter.WriteField({}, {})\n",
                repr_str(&field.name),
                repr_str(&field.content)
            ));
        }
    }
    code.push_str("\twriter.Close()\n");
    code
}

/// `http.NewRequest` plus `http.Client.Do`
pub fn net_http(request: &Request) -> String {
    let mut imports: BTreeSet<&'static str> = ["fmt", "io", "log", "net/http"].into_iter().collect();
    let mut body = String::new();

    let mut client_fields = Vec::new();
    if request.insecure {
        imports.insert("crypto/tls");
        client_fields.push(
            "\t\tTransport: &http.Transport{\n\t\t\tTLSClientConfig: &tls.Config{InsecureSkipVerify: true},\n\t\t},\n"
                .to_string(),
        );
    }
    if let Some(timeout) = request.timeout {
        imports.insert("time");
        client_fields.push(format!(
            "\t\tTimeout: {} * time.Millisecond,\n",
            (timeout * 1000.0) as u64
        ));
    }
    if client_fields.is_empty() {
        body.push_str("\tclient := &http.Client{}\n");
    } else {
        body.push_str(&format!("\tclient := &http.Client{{\n{}\t}}\n", client_fields.concat()));
    }

    let reader = match request.body_source() {
        BodySource::Multipart(fields) => {
            body.push_str(&multipart_builder(fields, &mut imports));
            "body".to_string()
        }
        BodySource::Json(_) => {
            imports.insert("strings");
            format!("strings.NewReader({})", repr_str(&request.json_text().unwrap_or_default()))
        }
        BodySource::DataArray(_) | BodySource::Legacy(_) => {
            let params = request.data_params();
            match join_literals(&params) {
                Some(joined) => {
                    imports.insert("strings");
                    format!("strings.NewReader({})", repr_str(&joined))
                }
                None => {
                    body.push_str(&data_builder(&params, &mut imports));
                    "strings.NewReader(body.String())".to_string()
                }
            }
        }
        BodySource::Empty => match request.upload_file() {
            Some(file) => {
                imports.insert("os");
                body.push_str(&format!("\tupload, err := os.Open({})\n", repr_str(file)));
                body.push_str(CHECK_ERR);
                body.push_str("\tdefer upload.Close()\n");
                "upload".to_string()
            }
            None => "nil".to_string(),
        },
    };

    body.push_str(&format!(
        "\treq, err := http.NewRequest({}, {}, {})\n",
        repr_str(&request.method),
        repr_str(request.url()),
        reader
    ));
    body.push_str(CHECK_ERR);

    let multipart = matches!(request.body_source(), BodySource::Multipart(_));
    for (name, value) in &request.headers {
        if multipart && name.eq_ignore_ascii_case("content-type") {
            continue;
        }
        body.push_str(&format!("\treq.Header.Set({}, {})\n", repr_str(name), repr_str(value)));
    }
    if multipart {
        body.push_str("\treq.Header.Set(\"Content-Type\", writer.FormDataContentType())\n");
    }

    if let Some(auth) = &request.auth {
        if auth.auth_type != AuthType::Basic {
            body.push_str(&format!(
                "\t// {:?} authentication needs a custom transport; basic credentials shown\n",
                auth.auth_type
            ));
        }
        body.push_str(&format!(
            "\treq.SetBasicAuth({}, {})\n",
            repr_str(&auth.username),
            repr_str(&auth.password)
        ));
    }

    body.push_str("\tresp, err := client.Do(req)\n");
    body.push_str(CHECK_ERR);
    body.push_str("\tdefer resp.Body.Close()\n");
    body.push_str("\tbodyText, err := io.ReadAll(resp.Body)\n");
    body.push_str(CHECK_ERR);
    body.push_str("\tfmt.Printf(\"%s\\n\", bodyText)\n");

    let mut code = String::from("package main\n\n");
    code.push_str(&import_block(&imports));
    code.push_str("func main() {\n");
    code.push_str(&body);
    code.push('}');
    code
}

/// Resty request builder chain
pub fn resty(request: &Request) -> String {
    let mut imports: BTreeSet<&'static str> =
        ["fmt", "log", "github.com/go-resty/resty/v2"].into_iter().collect();
    let mut body = String::from("\tclient := resty.New()\n");
    if request.insecure {
        imports.insert("crypto/tls");
        body.push_str("\tclient.SetTLSClientConfig(&tls.Config{InsecureSkipVerify: true})\n");
    }
    if let Some(proxy) = &request.proxy {
        body.push_str(&format!("\tclient.SetProxy({})\n", repr_str(proxy)));
    }

    let mut chain: Vec<String> = request
        .headers
        .iter()
        .map(|(name, value)| format!("SetHeader({}, {})", repr_str(name), repr_str(value)))
        .collect();

    match request.body_source() {
        BodySource::Multipart(fields) => {
            let values: Vec<&FormParam> = fields.iter().filter(|f| !f.is_file).collect();
            if !values.is_empty() {
                let entries: Vec<String> = values
                    .iter()
                    .map(|f| format!("\t\t\t{}: {},\n", repr_str(&f.name), repr_str(&f.content)))
                    .collect();
                chain.push(format!("SetFormData(map[string]string{{\n{}\t\t}})", entries.concat()));
            }
            for field in fields.iter().filter(|f| f.is_file) {
                chain.push(format!("SetFile({}, {})", repr_str(&field.name), repr_str(&field.content)));
            }
        }
        BodySource::Json(_) => {
            chain.push(format!("SetBody({})", repr_str(&request.json_text().unwrap_or_default())));
        }
        BodySource::DataArray(_) | BodySource::Legacy(_) => {
            let params = request.data_params();
            match join_literals(&params) {
                Some(joined) => chain.push(format!("SetBody({})", repr_str(&joined))),
                None => {
                    body.push_str(&data_builder(&params, &mut imports));
                    chain.push("SetBody(body.String())".to_string());
                }
            }
        }
        BodySource::Empty => {
            if let Some(file) = request.upload_file() {
                imports.insert("os");
                body.push_str(&format!("\tupload, err := os.Open({})\n", repr_str(file)));
                body.push_str(CHECK_ERR);
                body.push_str("\tdefer upload.Close()\n");
                chain.push("SetBody(upload)".to_string());
            }
        }
    }

    if let Some(auth) = &request.auth {
        chain.push(format!(
            "SetBasicAuth({}, {})",
            repr_str(&auth.username),
            repr_str(&auth.password)
        ));
    }

    let url = repr_str(request.url());
    let call = match request.method.as_str() {
        "GET" => format!("Get({})", url),
        "POST" => format!("Post({})", url),
        "PUT" => format!("Put({})", url),
        "PATCH" => format!("Patch({})", url),
        "DELETE" => format!("Delete({})", url),
        "HEAD" => format!("Head({})", url),
        "OPTIONS" => format!("Options({})", url),
        other => format!("Execute({}, {})", repr_str(other), url),
    };
    chain.push(call);

    body.push_str("\n\tresp, err := client.R().\n");
    body.push_str(
        &chain
            .iter()
            .map(|link| format!("\t\t{}", link))
            .collect::<Vec<_>>()
            .join(".\n"),
    );
    body.push('\n');
    body.push_str(CHECK_ERR);
    body.push_str("\tfmt.Println(resp.String())\n");

    let mut code = String::from("package main\n\n");
    code.push_str(&import_block(&imports));
    code.push_str("func main() {\n");
    code.push_str(&body);
    code.push('}');
    code
}
