//! Code generation from a parsed curl [`Request`]
//!
//! Each target language has its own module exposing a static table of
//! variants. A variant is a plain function from [`Request`] to source text;
//! generation never fails.

pub mod common;
pub mod csharp;
pub mod curl;
pub mod dart;
pub mod go;
pub mod java;
pub mod javascript;
pub mod nodejs;
pub mod perl;
pub mod php;
pub mod powershell;
pub mod python;
pub mod rust;
pub mod swift;
pub mod wget;

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::curl::Request;
use crate::errors::{CurlportError, Result};

/// A single code generator variant
pub type Generator = fn(&Request) -> String;

/// Variant table of one language: display name to generator, in display order
pub type VariantTable = &'static [(&'static str, Generator)];

/// Supported target languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Curl,
    JavaScript,
    Python,
    Php,
    NodeJs,
    Go,
    Java,
    CSharp,
    Perl,
    PowerShell,
    Wget,
    Dart,
    Swift,
    Rust,
}

impl Language {
    /// Every language, in registry order
    pub const ALL: [Language; 14] = [
        Language::Curl,
        Language::JavaScript,
        Language::Python,
        Language::Php,
        Language::NodeJs,
        Language::Go,
        Language::Java,
        Language::CSharp,
        Language::Perl,
        Language::PowerShell,
        Language::Wget,
        Language::Dart,
        Language::Swift,
        Language::Rust,
    ];

    /// Registry key
    pub fn key(self) -> &'static str {
        match self {
            Language::Curl => "curl",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Php => "php",
            Language::NodeJs => "nodejs",
            Language::Go => "go",
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::Perl => "perl",
            Language::PowerShell => "powershell",
            Language::Wget => "wget",
            Language::Dart => "dart",
            Language::Swift => "swift",
            Language::Rust => "rust",
        }
    }

    /// Human-readable name
    pub fn label(self) -> &'static str {
        match self {
            Language::Curl => "cURL",
            Language::JavaScript => "JavaScript",
            Language::Python => "Python",
            Language::Php => "PHP",
            Language::NodeJs => "Node.js",
            Language::Go => "Go",
            Language::Java => "Java",
            Language::CSharp => "C#",
            Language::Perl => "Perl",
            Language::PowerShell => "PowerShell",
            Language::Wget => "Wget",
            Language::Dart => "Dart",
            Language::Swift => "Swift",
            Language::Rust => "Rust",
        }
    }

    /// Line comment marker of the generated code
    pub fn comment_prefix(self) -> &'static str {
        match self {
            Language::Curl
            | Language::Python
            | Language::Perl
            | Language::PowerShell
            | Language::Wget => "#",
            _ => "//",
        }
    }

    /// File extension used to pick a highlighting syntax
    pub fn extension(self) -> &'static str {
        match self {
            Language::Curl | Language::Wget => "sh",
            Language::JavaScript | Language::NodeJs => "js",
            Language::Python => "py",
            Language::Php => "php",
            Language::Go => "go",
            Language::Java => "java",
            Language::CSharp => "cs",
            Language::Perl => "pl",
            Language::PowerShell => "ps1",
            Language::Dart => "dart",
            Language::Swift => "swift",
            Language::Rust => "rs",
        }
    }

    fn variants(self) -> VariantTable {
        match self {
            Language::Curl => curl::VARIANTS,
            Language::JavaScript => javascript::VARIANTS,
            Language::Python => python::VARIANTS,
            Language::Php => php::VARIANTS,
            Language::NodeJs => nodejs::VARIANTS,
            Language::Go => go::VARIANTS,
            Language::Java => java::VARIANTS,
            Language::CSharp => csharp::VARIANTS,
            Language::Perl => perl::VARIANTS,
            Language::PowerShell => powershell::VARIANTS,
            Language::Wget => wget::VARIANTS,
            Language::Dart => dart::VARIANTS,
            Language::Swift => swift::VARIANTS,
            Language::Rust => rust::VARIANTS,
        }
    }

    pub fn generators(self) -> GeneratorSet {
        GeneratorSet {
            language: self,
            variants: self.variants(),
        }
    }
}

impl FromStr for Language {
    type Err = CurlportError;

    fn from_str(s: &str) -> Result<Self> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.key() == s)
            .ok_or_else(|| {
                CurlportError::UnknownLanguage(s.to_string(), supported_languages().join(", "))
            })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered variant-name to generator mapping for one language
#[derive(Debug, Clone, Copy)]
pub struct GeneratorSet {
    language: Language,
    variants: VariantTable,
}

impl GeneratorSet {
    pub fn language(&self) -> Language {
        self.language
    }

    /// Look up a variant by its exact display name
    pub fn get(&self, name: &str) -> Option<Generator> {
        self.variants
            .iter()
            .find(|(variant, _)| *variant == name)
            .map(|(_, generator)| *generator)
    }

    /// The variant used when none is requested
    pub fn default_variant(&self) -> Option<(&'static str, Generator)> {
        self.variants.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Generator)> + '_ {
        self.variants.iter().copied()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.variants.iter().map(|(name, _)| *name).collect()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Generators registered under `key`, or `None` for an unknown key
pub fn get_generators(key: &str) -> Option<GeneratorSet> {
    key.parse::<Language>().ok().map(Language::generators)
}

/// Registry keys, in registry order
pub fn supported_languages() -> Vec<&'static str> {
    Language::ALL.iter().map(|lang| lang.key()).collect()
}

/// Render `request` with the named variant of `key`, or its first variant
pub fn generate(key: &str, variant: Option<&str>, request: &Request) -> Result<String> {
    let language: Language = key.parse()?;
    let set = language.generators();

    let (name, generator) = match variant {
        Some(name) => set.get(name).map(|generator| (name, generator)).ok_or_else(|| {
            CurlportError::UnknownVariant {
                language: key.to_string(),
                variant: name.to_string(),
                available: set.names().join(", "),
            }
        })?,
        None => set
            .default_variant()
            .ok_or_else(|| CurlportError::Config(format!("No generators registered for {}", key)))?,
    };

    debug!(language = key, variant = name, "generating code");
    Ok(generator(request))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_language_has_variants() {
        for key in supported_languages() {
            let set = get_generators(key).unwrap();
            assert!(!set.is_empty(), "{} has no variants", key);
            assert_eq!(set.language().key(), key);
        }
    }

    #[test]
    fn test_unknown_key() {
        assert!(get_generators("cobol").is_none());
        assert!(get_generators("Python").is_none());
        assert!(get_generators("").is_none());
    }

    #[test]
    fn test_variant_order() {
        let set = get_generators("nodejs").unwrap();
        assert_eq!(set.names(), vec!["Native HTTP", "Axios", "Got"]);
        assert_eq!(get_generators("java").unwrap().len(), 3);
    }

    #[test]
    fn test_generate_default_and_named() {
        let request = Request::get("https://example.com");
        let default = generate("python", None, &request).unwrap();
        assert!(default.contains("import requests"));

        let named = generate("python", Some("HTTP Client"), &request).unwrap();
        assert!(named.contains("http.client"));
    }

    #[test]
    fn test_generate_errors() {
        let request = Request::get("https://example.com");
        assert!(matches!(
            generate("cobol", None, &request),
            Err(CurlportError::UnknownLanguage(..))
        ));
        let err = generate("go", Some("Gin"), &request).unwrap_err();
        assert!(err.to_string().contains("HTTP, Resty"));
    }

    #[test]
    fn test_language_labels() {
        assert_eq!("csharp".parse::<Language>().unwrap().label(), "C#");
        assert_eq!(Language::NodeJs.to_string(), "Node.js");
    }
}
