use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Structural role of a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Start,
    End,
    Function,
    If,
    Elif,
    Else,
    For,
    While,
    Do,
    Switch,
    Case,
    Default,
    Return,
    IoIn,
    IoOut,
    Process,
}

impl Category {
    /// Categories tested by the classifier, first match wins
    pub const PRIORITY: [Category; 13] = [
        Category::Function,
        Category::If,
        Category::Elif,
        Category::Else,
        Category::For,
        Category::While,
        Category::Do,
        Category::Switch,
        Category::Case,
        Category::Default,
        Category::Return,
        Category::IoIn,
        Category::IoOut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Start => "start",
            Category::End => "end",
            Category::Function => "function",
            Category::If => "if",
            Category::Elif => "elif",
            Category::Else => "else",
            Category::For => "for",
            Category::While => "while",
            Category::Do => "do",
            Category::Switch => "switch",
            Category::Case => "case",
            Category::Default => "default",
            Category::Return => "return",
            Category::IoIn => "io_in",
            Category::IoOut => "io_out",
            Category::Process => "process",
        }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self, Category::Start | Category::End)
    }

    /// Drawn as a diamond in the flowchart
    pub fn is_decision(&self) -> bool {
        matches!(
            self,
            Category::If
                | Category::Elif
                | Category::Else
                | Category::While
                | Category::Switch
                | Category::Case
                | Category::Default
        )
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Category::IoIn | Category::IoOut)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Words that can precede `(` without the line being a function signature
const SIGNATURE_RESERVED: &[&str] = &[
    "if", "elif", "else", "for", "foreach", "while", "do", "switch", "match", "case",
    "return", "new", "throw", "catch", "try", "await", "yield", "typeof", "delete",
    "in", "of", "not", "and", "or", "with", "using", "lock", "sizeof", "defer", "go",
    "select", "loop", "echo", "print", "let",
];

/// One independent recognizer inside a category's pattern set
#[derive(Debug, Clone)]
pub enum Recognizer {
    /// Plain regular expression search
    Pattern(Regex),
    /// `<word> <word>(...) {` shape whose two captured words must not be control keywords
    Signature {
        pattern: Regex,
        reserved: &'static [&'static str],
    },
}

impl Recognizer {
    pub fn matches(&self, line: &str) -> bool {
        match self {
            Recognizer::Pattern(regex) => regex.is_match(line),
            Recognizer::Signature { pattern, reserved } => pattern.captures_iter(line).any(|caps| {
                (1..caps.len())
                    .filter_map(|i| caps.get(i))
                    .all(|word| !reserved.contains(&word.as_str()))
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub category: Category,
    pub recognizers: Vec<Recognizer>,
}

/// Brace-family block delimiters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDelimiters {
    pub open: char,
    pub close: char,
}

impl Default for BlockDelimiters {
    fn default() -> Self {
        Self { open: '{', close: '}' }
    }
}

/// Read-only recognizer table, in classification priority order
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    entries: Vec<CatalogEntry>,
    closing_keywords: Regex,
    delimiters: BlockDelimiters,
}

// Optional leading `}` so `} else {` style lines are still recognized.
const LEAD: &str = r"^(?:\}\s*)?";

impl PatternCatalog {
    pub fn new() -> Result<Self> {
        let mut entries = Vec::with_capacity(Category::PRIORITY.len());
        for category in Category::PRIORITY {
            entries.push(CatalogEntry {
                category,
                recognizers: Self::recognizers_for(category)?,
            });
        }

        Ok(Self {
            entries,
            closing_keywords: Regex::new(r"(?i)\b(?:end\s*if|end\s*for|end\s*while|end|break)\b")?,
            delimiters: BlockDelimiters::default(),
        })
    }

    /// Entries in the order the classifier must test them
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Whether any recognizer of `category` matches the line
    pub fn matches(&self, category: Category, line: &str) -> bool {
        self.entries
            .iter()
            .find(|entry| entry.category == category)
            .map_or(false, |entry| entry.recognizers.iter().any(|r| r.matches(line)))
    }

    /// Explicit closing-keyword evidence (`end if`, `endfor`, `break`...), case-insensitive
    pub fn has_closing_keyword(&self, line: &str) -> bool {
        self.closing_keywords.is_match(line)
    }

    pub fn delimiters(&self) -> BlockDelimiters {
        self.delimiters
    }

    fn recognizers_for(category: Category) -> Result<Vec<Recognizer>> {
        let patterns: Vec<String> = match category {
            Category::Function => {
                return Ok(vec![
                    pattern(r"\bdef\s+\w+\s*\(")?,
                    pattern(r"\bfunction\s+\w+\s*\(")?,
                    pattern(r"\bfn\s+\w+\s*[(<]")?,
                    pattern(r"\bfunc\s+(?:\([^)]*\)\s*)?\w+\s*[(\[]")?,
                    Recognizer::Signature {
                        pattern: Regex::new(r"\b(\w+)\s+(\w+)\s*\([^;]*\)\s*\{")?,
                        reserved: SIGNATURE_RESERVED,
                    },
                ]);
            }
            Category::If => vec![
                format!(r"{LEAD}if\s*\("),
                format!(r"{LEAD}if\s+[^:]+:"),
                format!(r"{LEAD}if\s+.+\{{\s*$"),
            ],
            Category::Elif => vec![format!(r"{LEAD}else\s+if\b"), r"^elif\b".to_string()],
            Category::Else => vec![format!(r"{LEAD}else\b")],
            Category::For => vec![
                format!(r"{LEAD}for(?:each)?\s*\("),
                r"^(?:async\s+)?for\s+.+\s+in\s+.+:".to_string(),
                r"^for\s+.+\{\s*$".to_string(),
            ],
            Category::While => vec![
                format!(r"{LEAD}while\s*\("),
                r"^while\b\s*.+:".to_string(),
                r"^while\s+.+\{\s*$".to_string(),
            ],
            Category::Do => vec![r"^do\s*(?:\{\s*)?$".to_string(), r"^loop\s*\{\s*$".to_string()],
            Category::Switch => vec![
                format!(r"{LEAD}switch\s*\("),
                r"^switch\b.*\{\s*$".to_string(),
                r"^match\s+.+[:{]\s*$".to_string(),
            ],
            Category::Case => vec![r"^case\b".to_string()],
            Category::Default => vec![r"^default\b".to_string()],
            Category::Return => vec![r"\breturn\b".to_string()],
            Category::IoIn => vec![
                r"\binput\s*\(".to_string(),
                r"\bscanf\s*\(".to_string(),
                r"\bcin\s*>>".to_string(),
                r"\bConsole\.Read(?:Line)?\s*\(".to_string(),
                r"\breadline\s*\(".to_string(),
                r"\bprompt\s*\(".to_string(),
                r"\bread\s*\(".to_string(),
                r"\bread_line\s*\(".to_string(),
                r"\bgets\s*\(".to_string(),
                r"\bgetline\s*\(".to_string(),
                r"\bBufferedReader\b.*readLine\s*\(".to_string(),
                r"\.next(?:Int|Line|Double|Float|Long|Boolean)\s*\(".to_string(),
                r"\$_(?:GET|POST|REQUEST)\b".to_string(),
                r"\bfmt\.Scan[fln]?\s*\(".to_string(),
            ],
            Category::IoOut => vec![
                r"\bprint\s*\(".to_string(),
                r"\bprintf\s*\(".to_string(),
                r"\bcout\s*<<".to_string(),
                r"\bConsole\.Write(?:Line)?\s*\(".to_string(),
                r"\bSystem\.out\.print(?:ln|f)?\s*\(".to_string(),
                r"\bconsole\.log\s*\(".to_string(),
                r"\becho\b".to_string(),
                r"\bfmt\.Print[fln]?\s*\(".to_string(),
                r"\be?print(?:ln)?!\s*\(".to_string(),
                r"\bputs\s*\(".to_string(),
            ],
            Category::Start | Category::End | Category::Process => Vec::new(),
        };

        patterns.iter().map(|p| pattern(p)).collect()
    }
}

fn pattern(source: &str) -> Result<Recognizer> {
    Ok(Recognizer::Pattern(Regex::new(source)?))
}
