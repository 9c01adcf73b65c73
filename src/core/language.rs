use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RevdocError;

/// How a language delimits its blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageFamily {
    /// Depth comes from leading whitespace
    Indentation,
    /// Depth is a running `{`/`}` counter
    Brace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLanguage {
    Python,
    JavaScript,
    Java,
    C,
    Cpp,
    CSharp,
    Php,
    Go,
    Rust,
}

impl SourceLanguage {
    /// Every supported language, in menu order
    pub const ALL: [SourceLanguage; 9] = [
        SourceLanguage::Python,
        SourceLanguage::JavaScript,
        SourceLanguage::Java,
        SourceLanguage::C,
        SourceLanguage::Cpp,
        SourceLanguage::CSharp,
        SourceLanguage::Php,
        SourceLanguage::Go,
        SourceLanguage::Rust,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SourceLanguage::Python => "python",
            SourceLanguage::JavaScript => "javascript",
            SourceLanguage::Java => "java",
            SourceLanguage::C => "c",
            SourceLanguage::Cpp => "cpp",
            SourceLanguage::CSharp => "csharp",
            SourceLanguage::Php => "php",
            SourceLanguage::Go => "go",
            SourceLanguage::Rust => "rust",
        }
    }

    pub fn family(&self) -> LanguageFamily {
        match self {
            SourceLanguage::Python => LanguageFamily::Indentation,
            _ => LanguageFamily::Brace,
        }
    }

    /// File extensions mapped to this language
    pub fn file_extensions(&self) -> &'static [&'static str] {
        match self {
            SourceLanguage::Python => &["py", "pyw"],
            SourceLanguage::JavaScript => &["js", "mjs", "cjs", "jsx", "ts", "tsx"],
            SourceLanguage::Java => &["java"],
            SourceLanguage::C => &["c", "h"],
            SourceLanguage::Cpp => &["cpp", "cc", "cxx", "hpp", "hh", "hxx"],
            SourceLanguage::CSharp => &["cs"],
            SourceLanguage::Php => &["php"],
            SourceLanguage::Go => &["go"],
            SourceLanguage::Rust => &["rs"],
        }
    }

    /// Prefixes that mark a whole line as a comment
    pub fn line_comment_markers(&self) -> &'static [&'static str] {
        match self {
            SourceLanguage::Python => &["#"],
            SourceLanguage::Php => &["//", "#", "/*"],
            _ => &["//", "/*"],
        }
    }

    /// Detect the language from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.file_extensions().contains(&extension.as_str()))
    }

    /// Resolve a user selection, clamping to `fallback` instead of failing.
    ///
    /// An explicit selector wins, then the path's extension, then the fallback.
    pub fn resolve(selector: Option<&str>, path: Option<&Path>, fallback: SourceLanguage) -> Self {
        if let Some(selector) = selector {
            match selector.parse::<SourceLanguage>() {
                Ok(lang) => return lang,
                Err(e) => warn!("{}, falling back to '{}'", e, fallback),
            }
        } else if let Some(lang) = path.and_then(Self::from_path) {
            return lang;
        }

        fallback
    }
}

impl FromStr for SourceLanguage {
    type Err = RevdocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let lang = match normalized.as_str() {
            "python" | "py" => SourceLanguage::Python,
            "javascript" | "js" | "typescript" | "ts" | "node" => SourceLanguage::JavaScript,
            "java" => SourceLanguage::Java,
            "c" => SourceLanguage::C,
            "cpp" | "c++" | "cxx" => SourceLanguage::Cpp,
            "csharp" | "cs" | "c#" => SourceLanguage::CSharp,
            "php" => SourceLanguage::Php,
            "go" | "golang" => SourceLanguage::Go,
            "rust" | "rs" => SourceLanguage::Rust,
            _ => return Err(RevdocError::Language(s.to_string())),
        };
        Ok(lang)
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Default for SourceLanguage {
    fn default() -> Self {
        SourceLanguage::Python
    }
}
