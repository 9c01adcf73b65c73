use tracing::debug;

use super::catalog::{BlockDelimiters, PatternCatalog};
use super::language::{LanguageFamily, SourceLanguage};
use super::steps::NormalizedLine;

const DOCSTRING_DELIMITERS: [&str; 2] = ["\"\"\"", "'''"];

/// Tracks multi-line comment state while scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentState {
    Code,
    BlockComment,
    Docstring(&'static str),
}

struct NoiseFilter {
    language: SourceLanguage,
    state: CommentState,
}

impl NoiseFilter {
    fn new(language: SourceLanguage) -> Self {
        Self {
            language,
            state: CommentState::Code,
        }
    }

    /// Whether a trimmed line is blank or comment-only
    fn is_noise(&mut self, stripped: &str) -> bool {
        match self.state {
            CommentState::BlockComment => {
                if stripped.contains("*/") {
                    self.state = CommentState::Code;
                }
                return true;
            }
            CommentState::Docstring(delimiter) => {
                if stripped.contains(delimiter) {
                    self.state = CommentState::Code;
                }
                return true;
            }
            CommentState::Code => {}
        }

        if stripped.is_empty() {
            return true;
        }

        match self.language.family() {
            LanguageFamily::Indentation => {
                if let Some(delimiter) = DOCSTRING_DELIMITERS.into_iter().find(|d| stripped.starts_with(*d)) {
                    if !stripped[delimiter.len()..].contains(delimiter) {
                        self.state = CommentState::Docstring(delimiter);
                    }
                    return true;
                }
            }
            LanguageFamily::Brace => {
                if let Some(rest) = stripped.strip_prefix("/*") {
                    if !rest.contains("*/") {
                        self.state = CommentState::BlockComment;
                    }
                    return true;
                }
            }
        }

        self.language
            .line_comment_markers()
            .iter()
            .any(|marker| stripped.starts_with(*marker))
    }
}

pub struct BlockNormalizer<'a> {
    catalog: &'a PatternCatalog,
    indent_width: usize,
    tab_width: usize,
}

impl<'a> BlockNormalizer<'a> {
    pub fn new(catalog: &'a PatternCatalog, indent_width: usize, tab_width: usize) -> Self {
        Self {
            catalog,
            indent_width: indent_width.max(1),
            tab_width: tab_width.max(1),
        }
    }

    pub fn normalize<S: AsRef<str>>(&self, raw_lines: &[S], language: SourceLanguage) -> Vec<NormalizedLine> {
        let mut filter = NoiseFilter::new(language);
        let code_lines = raw_lines.iter().filter_map(|raw| {
            let line = raw.as_ref().trim_end_matches(['\n', '\r']);
            let stripped = line.trim();
            if filter.is_noise(stripped) {
                None
            } else {
                Some((line, stripped))
            }
        });

        let normalized: Vec<NormalizedLine> = match language.family() {
            LanguageFamily::Indentation => code_lines
                .map(|(line, stripped)| NormalizedLine::new(self.indent_depth(line), stripped))
                .collect(),
            LanguageFamily::Brace => brace_depths(code_lines.map(|(_, stripped)| stripped), self.catalog.delimiters()),
        };

        debug!(
            "Normalized {} raw lines into {} {} lines",
            raw_lines.len(),
            normalized.len(),
            language
        );
        normalized
    }

    /// Leading whitespace columns divided by the indent width
    fn indent_depth(&self, line: &str) -> usize {
        let mut columns = 0;
        for ch in line.chars() {
            match ch {
                ' ' => columns += 1,
                '\t' => columns += self.tab_width - (columns % self.tab_width),
                _ => break,
            }
        }
        columns / self.indent_width
    }
}

/// Running-counter depth for brace-delimited languages
fn brace_depths<'l>(lines: impl Iterator<Item = &'l str>, delimiters: BlockDelimiters) -> Vec<NormalizedLine> {
    let BlockDelimiters { open, close } = delimiters;
    let mut out = Vec::new();
    let mut depth: usize = 0;

    for stripped in lines {
        let closers = stripped.matches(close).count();
        let openers = stripped.matches(open).count();

        if is_pure_closer(stripped, close) {
            depth = depth.saturating_sub(closers);
            continue;
        }

        if stripped.len() == open.len_utf8() && stripped.starts_with(open) {
            depth += 1;
            continue;
        }

        // `} else {`, `} while (x);`: the closer belongs to the previous block
        if stripped.starts_with(close) {
            depth = depth.saturating_sub(1);
        }

        out.push(NormalizedLine::new(depth, stripped));

        if stripped.ends_with(open) {
            depth += 1;
        } else if stripped.ends_with(&format!("{};", close)) && closers > openers {
            depth = depth.saturating_sub(1);
        }
    }

    out
}

/// Only closing punctuation, with at least one block closer: `}`, `};`, `});`, `}}`
fn is_pure_closer(stripped: &str, close: char) -> bool {
    stripped.contains(close)
        && stripped
            .chars()
            .all(|c| c == close || matches!(c, ')' | ']' | ';' | ',') || c.is_whitespace())
}
