//! Normalized request model produced by the curl interpreter
//!
//! The body is kept in two parallel shapes. The legacy form (`data`) has one
//! record per data flag with the file marker already stripped. The enhanced
//! form (`data_array`) distinguishes literal strings from typed file
//! references. Every data-bearing flag fills both, so a generator can use
//! whichever one it understands.

use indexmap::IndexMap;
use serde::Serialize;

/// One URL given on the command line
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestUrl {
    pub original_url: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_list: Option<Vec<(String, String)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_file: Option<String>,
}

impl RequestUrl {
    /// Build an entry from raw command-line text, decoding any query string
    pub fn new(original: &str) -> Self {
        let query_list = original.split_once('?').map(|(_, query)| {
            let query = query.split('#').next().unwrap_or_default();
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect::<Vec<_>>()
        });

        Self {
            original_url: original.to_string(),
            url: original.to_string(),
            query_list,
            upload_file: None,
        }
    }
}

/// Legacy body record: one per `-d`-style flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyData {
    /// Literal data, or the file name when `is_file` is set
    pub content: String,
    pub is_file: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub binary: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub urlencode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl LegacyData {
    /// Reads from standard input rather than a literal or a file
    pub fn is_stdin(&self) -> bool {
        self.content == "-" && self.name.is_some() && self.urlencode && !self.is_file
    }

    /// Equivalent element of the enhanced form
    pub fn to_param(&self) -> DataParam {
        if !self.is_file && !self.is_stdin() {
            return DataParam::Literal(self.content.clone());
        }
        let filetype = if self.urlencode {
            FileType::Urlencode
        } else if self.binary {
            FileType::Binary
        } else {
            FileType::Data
        };
        DataParam::File(FileData {
            filetype,
            filename: self.content.clone(),
            name: self.name.clone(),
        })
    }
}

/// How a file-backed data item is processed when read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// `-d @file`: newlines stripped
    Data,
    /// `--data-binary @file`: sent as-is
    Binary,
    /// `--data-urlencode [name=]@file`: percent-encoded
    Urlencode,
    /// `--json @file`
    Json,
}

/// A typed file reference in the enhanced body form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileData {
    pub filetype: FileType,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl FileData {
    /// The file name `-` means standard input
    pub fn is_stdin(&self) -> bool {
        self.filename == "-"
    }
}

/// Element of the enhanced body form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DataParam {
    Literal(String),
    File(FileData),
}

impl DataParam {
    pub fn as_file(&self) -> Option<&FileData> {
        match self {
            DataParam::File(file) => Some(file),
            DataParam::Literal(_) => None,
        }
    }
}

/// A `-F` / `--form-string` field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormParam {
    pub name: String,
    /// Literal text, or the file name when `is_file` is set
    pub content: String,
    pub is_file: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_file: Option<String>,
}

/// Authentication scheme selected by `--basic`, `--digest`, etc.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    #[default]
    Basic,
    Digest,
    Ntlm,
    Negotiate,
}

/// Credentials from `-u user:password`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthConfig {
    #[serde(rename = "type")]
    pub auth_type: AuthType,
    pub username: String,
    pub password: String,
}

/// The parsed curl invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub urls: Vec<RequestUrl>,
    pub method: String,
    pub headers: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<LegacyData>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub data_array: Vec<DataParam>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_data_binary: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_data_raw: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_reads_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub multipart_uploads: Vec<FormParam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
    pub cookie_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    pub compressed: bool,
    pub insecure: bool,
    pub follow_redirects: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_redirs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_version: Option<String>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            method: "GET".to_string(),
            headers: IndexMap::new(),
            data: Vec::new(),
            data_array: Vec::new(),
            is_data_binary: false,
            is_data_raw: false,
            data_reads_file: None,
            json: None,
            multipart_uploads: Vec::new(),
            auth: None,
            cookie_files: Vec::new(),
            output_path: None,
            proxy: None,
            compressed: false,
            insecure: false,
            follow_redirects: false,
            max_redirs: None,
            timeout: None,
            connect_timeout: None,
            http_version: None,
        }
    }
}

/// Which body representation a generator should render
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodySource<'a> {
    Multipart(&'a [FormParam]),
    Json(&'a serde_json::Value),
    DataArray(&'a [DataParam]),
    Legacy(&'a [LegacyData]),
    Empty,
}

impl Request {
    /// Convenience constructor for a bare GET
    pub fn get(url: &str) -> Self {
        Self {
            urls: vec![RequestUrl::new(url)],
            ..Self::default()
        }
    }

    /// First URL, or the empty string
    pub fn url(&self) -> &str {
        self.urls.first().map(|u| u.url.as_str()).unwrap_or("")
    }

    pub fn has_headers(&self) -> bool {
        !self.headers.is_empty()
    }

    /// Body source by precedence: multipart > json > enhanced > legacy
    pub fn body_source(&self) -> BodySource<'_> {
        if !self.multipart_uploads.is_empty() {
            BodySource::Multipart(&self.multipart_uploads)
        } else if let Some(json) = &self.json {
            BodySource::Json(json)
        } else if !self.data_array.is_empty() {
            BodySource::DataArray(&self.data_array)
        } else if !self.data.is_empty() {
            BodySource::Legacy(&self.data)
        } else {
            BodySource::Empty
        }
    }

    /// Data items in enhanced form, converting the legacy records when the
    /// enhanced form is empty
    pub fn data_params(&self) -> Vec<DataParam> {
        if self.data_array.is_empty() {
            self.data.iter().map(LegacyData::to_param).collect()
        } else {
            self.data_array.clone()
        }
    }

    /// File given to `-T` for the first URL
    pub fn upload_file(&self) -> Option<&str> {
        self.urls.first().and_then(|u| u.upload_file.as_deref())
    }

    /// Whether the enhanced form references any file or stdin
    pub fn data_array_has_files(&self) -> bool {
        self.data_array.iter().any(|d| d.as_file().is_some())
    }

    /// Legacy contents joined with `&`
    pub fn legacy_body(&self) -> Option<String> {
        if self.data.is_empty() {
            return None;
        }
        Some(
            self.data
                .iter()
                .map(|d| d.content.as_str())
                .collect::<Vec<_>>()
                .join("&"),
        )
    }

    /// Enhanced contents joined with `&`, file names standing in for file
    /// contents
    pub fn flat_data_array(&self) -> String {
        self.data_array
            .iter()
            .map(|d| match d {
                DataParam::Literal(s) => s.as_str(),
                DataParam::File(f) => f.filename.as_str(),
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// JSON payload as compact text; a raw (unparsed) payload is returned verbatim
    pub fn json_text(&self) -> Option<String> {
        self.json.as_ref().map(|json| match json {
            serde_json::Value::String(raw) => raw.clone(),
            other => other.to_string(),
        })
    }

    /// Body as one string: json, else legacy data joined with `&`
    pub fn body_text(&self) -> Option<String> {
        self.json_text().or_else(|| self.legacy_body())
    }

    /// Text body for generators that only handle a flat string, following the
    /// json > enhanced > legacy order
    pub fn flat_body(&self) -> Option<String> {
        if let Some(json) = self.json_text() {
            Some(json)
        } else if !self.data_array.is_empty() {
            Some(self.flat_data_array())
        } else {
            self.legacy_body()
        }
    }

    /// Header lookup ignoring case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Headers without `Content-Type`, for targets that set it themselves
    pub fn headers_without_content_type(&self) -> impl Iterator<Item = (&String, &String)> {
        self.headers
            .iter()
            .filter(|(k, _)| !k.eq_ignore_ascii_case("content-type"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_method_is_get() {
        let request = Request::default();
        assert_eq!(request.method, "GET");
        assert_eq!(request.url(), "");
        assert_eq!(request.body_source(), BodySource::Empty);
    }

    #[test]
    fn test_query_list_decoded() {
        let url = RequestUrl::new("https://example.com/search?q=a+b&x=%2F#frag");
        assert_eq!(
            url.query_list,
            Some(vec![
                ("q".to_string(), "a b".to_string()),
                ("x".to_string(), "/".to_string()),
            ])
        );
        assert!(RequestUrl::new("https://example.com").query_list.is_none());
    }

    #[test]
    fn test_body_source_precedence() {
        let mut request = Request::get("https://example.com");
        request.data.push(LegacyData {
            content: "a=1".to_string(),
            ..Default::default()
        });
        assert!(matches!(request.body_source(), BodySource::Legacy(_)));

        request.data_array.push(DataParam::Literal("a=1".to_string()));
        assert!(matches!(request.body_source(), BodySource::DataArray(_)));

        request.json = Some(serde_json::json!({"a": 1}));
        assert!(matches!(request.body_source(), BodySource::Json(_)));

        request.multipart_uploads.push(FormParam {
            name: "f".to_string(),
            content: "v".to_string(),
            ..Default::default()
        });
        assert!(matches!(request.body_source(), BodySource::Multipart(_)));
    }

    #[test]
    fn test_legacy_converts_to_params() {
        let mut request = Request::get("https://example.com");
        request.data.push(LegacyData {
            content: "a=1".to_string(),
            ..Default::default()
        });
        request.data.push(LegacyData {
            content: "body.bin".to_string(),
            is_file: true,
            binary: true,
            ..Default::default()
        });
        request.data.push(LegacyData {
            content: "-".to_string(),
            urlencode: true,
            name: Some("q".to_string()),
            ..Default::default()
        });

        let params = request.data_params();
        assert_eq!(params[0], DataParam::Literal("a=1".to_string()));
        assert_eq!(params[1].as_file().unwrap().filetype, FileType::Binary);
        let stdin = params[2].as_file().unwrap();
        assert!(stdin.is_stdin());
        assert_eq!(stdin.name.as_deref(), Some("q"));
        assert_eq!(request.flat_data_array(), "");
    }

    #[test]
    fn test_json_text_raw_string_verbatim() {
        let mut request = Request::default();
        request.json = Some(serde_json::Value::String("{not json".to_string()));
        assert_eq!(request.json_text().as_deref(), Some("{not json"));

        request.json = Some(serde_json::json!({"b": 2, "a": 1}));
        assert_eq!(request.json_text().as_deref(), Some(r#"{"b":2,"a":1}"#));
    }

    #[test]
    fn test_serialize_camel_case() {
        let mut request = Request::get("https://example.com");
        request.data_reads_file = Some("f.txt".to_string());
        request.data_array.push(DataParam::File(FileData {
            filetype: FileType::Urlencode,
            filename: "f.txt".to_string(),
            name: Some("n".to_string()),
        }));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["dataReadsFile"], "f.txt");
        assert_eq!(value["dataArray"][0]["filetype"], "urlencode");
        assert_eq!(value["urls"][0]["originalUrl"], "https://example.com");
    }
}
