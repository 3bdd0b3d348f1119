//! Integration tests for the generator registry and string escapers

use curlport::codegen::{self, get_generators, supported_languages, Language};
use curlport::{generate, parse_curl_command, Request};

const TRICKY: &str = "say \"hi\" it's C:\\tmp\nnext\tline";

/// Undo C-style backslash escapes
fn unescape_backslash(s: &str) -> String {
    let mut out = String::new();
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|c| *c != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                let code = u32::from_str_radix(&hex, 16).unwrap();
                out.push(char::from_u32(code).unwrap());
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn strip_quotes(literal: &str) -> &str {
    &literal[1..literal.len() - 1]
}

fn parse(cmd: &str) -> Request {
    parse_curl_command(cmd).request.expect("should parse")
}

// =============================================================================
// Registry
// =============================================================================

#[test]
fn test_every_key_has_generators() {
    assert_eq!(supported_languages().len(), 14);
    for key in supported_languages() {
        let set = get_generators(key).expect(key);
        assert!(!set.is_empty(), "{} has no variants", key);
    }
}

#[test]
fn test_unknown_key_is_none() {
    assert!(get_generators("fortran").is_none());
    assert!(get_generators("PYTHON").is_none());
}

#[test]
fn test_registry_order() {
    assert_eq!(
        supported_languages(),
        vec![
            "curl", "javascript", "python", "php", "nodejs", "go", "java", "csharp", "perl", "powershell",
            "wget", "dart", "swift", "rust"
        ]
    );
}

#[test]
fn test_unknown_variant_lists_available() {
    let err = generate("php", Some("Laravel"), &Request::get("https://example.com")).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Laravel"));
    assert!(message.contains("cURL, Guzzle"));
}

// =============================================================================
// Every generator
// =============================================================================

#[test]
fn test_every_generator_renders_minimal_get() {
    let request = parse("curl https://api.example.com/v1/ping");
    for language in Language::ALL {
        for (name, generator) in language.generators().iter() {
            let code = generator(&request);
            assert!(
                code.contains("https://api.example.com/v1/ping"),
                "{} / {} lost the URL:\n{}",
                language.key(),
                name,
                code
            );
        }
    }
}

#[test]
fn test_every_generator_handles_every_body_shape() {
    let commands = [
        r#"curl -X POST -H 'Content-Type: application/json' -d '{"name":"John"}' https://example.com/api"#,
        r#"curl --json '{"a":[1,2]}' https://example.com/api"#,
        "curl -d 'a=1' -d @payload.txt --data-urlencode 'q@-' https://example.com/api",
        "curl -F 'name=John' -F 'avatar=@me.png' https://example.com/api",
        "curl -u alice:s3cret --digest -L -k -m 5 -x http://proxy:3128 https://example.com/api",
        "curl -T upload.bin https://example.com/api",
        "curl -X OPTIONS -b jar.txt --compressed https://example.com/api",
    ];
    for cmd in commands {
        let request = parse(cmd);
        for language in Language::ALL {
            for (name, generator) in language.generators().iter() {
                let code = generator(&request);
                assert!(!code.trim().is_empty(), "{} / {} empty for {}", language.key(), name, cmd);
                assert!(
                    code.contains("https://example.com/api"),
                    "{} / {} lost the URL for {}",
                    language.key(),
                    name,
                    cmd
                );
            }
        }
    }
}

#[test]
fn test_default_variant_is_first() {
    let request = Request::get("https://example.com");
    for language in Language::ALL {
        let set = language.generators();
        let (_, first) = set.default_variant().unwrap();
        assert_eq!(generate(language.key(), None, &request).unwrap(), first(&request));
    }
}

// =============================================================================
// Escapers
// =============================================================================

#[test]
fn test_backslash_escapers_round_trip() {
    let escapers: [(&str, fn(&str) -> String); 8] = [
        ("python", codegen::python::repr_str),
        ("javascript", codegen::javascript::repr_str),
        ("go", codegen::go::repr_str),
        ("java", codegen::java::repr_str),
        ("csharp", codegen::csharp::repr_str),
        ("rust", codegen::rust::repr_str),
        ("swift", codegen::swift::repr_str),
        ("dart", codegen::dart::repr_str),
    ];
    for (name, escape) in escapers {
        let literal = escape(TRICKY);
        assert!(!literal.contains('\n'), "{} left a raw newline", name);
        assert_eq!(unescape_backslash(strip_quotes(&literal)), TRICKY, "{}", name);
    }
}

#[test]
fn test_php_single_quoted_round_trip() {
    let literal = codegen::php::repr_str(TRICKY);
    let unescaped = strip_quotes(&literal).replace("\\'", "'").replace("\\\\", "\\");
    assert_eq!(unescaped, TRICKY);
}

#[test]
fn test_wget_single_quote_splice_round_trip() {
    let literal = codegen::wget::repr_str(TRICKY);
    let unescaped = strip_quotes(&literal).replace("'\"'\"'", "'");
    assert_eq!(unescaped, TRICKY);
}

#[test]
fn test_dart_escapes_interpolation() {
    assert_eq!(codegen::dart::repr_str("$name"), "'\\$name'");
}

#[test]
fn test_multipart_placeholder_comments_stay_comments() {
    let request = parse("curl -F 'a=x\ntouch /tmp/owned' -F 'f=@x\nrm -rf ~' https://example.com/api");
    let commented = [
        ("python", "HTTP Client"),
        ("wget", "Standard"),
        ("perl", "HTTPTiny"),
        ("nodejs", "Native HTTP"),
        ("java", "HttpClient"),
        ("java", "HttpURLConnection"),
        ("rust", "Ureq"),
        ("swift", "URLSession"),
    ];
    for (key, variant) in commented {
        let code = generate(key, Some(variant), &request).unwrap();
        assert!(code.contains("a=x\\ntouch /tmp/owned"), "{} / {}:\n{}", key, variant, code);
        for line in code.lines() {
            let line = line.trim_start();
            assert!(
                !line.starts_with("touch") && !line.starts_with("rm -rf"),
                "{} / {} leaked field text into code:\n{}",
                key,
                variant,
                code
            );
        }
    }
}
