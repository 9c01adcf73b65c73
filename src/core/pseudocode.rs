use regex::Regex;
use tracing::trace;

use super::catalog::{Category, PatternCatalog};
use super::steps::Step;

const CONDITION_PLACEHOLDER: &str = "<condition>";
const LOOP_PLACEHOLDER: &str = "<loop>";
const VALUE_PLACEHOLDER: &str = "<value>";
const DEFAULT_PROCEDURE: &str = "procedure";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    If,
    For,
    While,
    Do,
    Switch,
    Case,
}

impl BlockKind {
    pub fn closer(&self) -> &'static str {
        match self {
            BlockKind::If => "END IF",
            BlockKind::For => "END FOR",
            BlockKind::While => "END WHILE",
            BlockKind::Do => "END DO",
            BlockKind::Switch => "END SWITCH",
            BlockKind::Case => "// END CASE",
        }
    }
}

/// Regexes that pull display fragments out of a line
#[derive(Debug, Clone)]
pub struct TextExtractors {
    procedure_keyword: Regex,
    procedure_call: Regex,
    return_expr: Regex,
    paren_condition: Regex,
    colon_condition: Regex,
    brace_condition: Regex,
    any_paren: Regex,
    paren_loop: Regex,
    iterator_loop: Regex,
    bare_loop: Regex,
    case_value: Regex,
}

impl TextExtractors {
    pub fn new() -> crate::error::Result<Self> {
        Ok(Self {
            procedure_keyword: Regex::new(r"\b(?:def|function|fn|func)\s+(?:\([^)]*\)\s*)?(\w+)")?,
            procedure_call: Regex::new(r"\b(\w+)\s*\(")?,
            return_expr: Regex::new(r"(?i)\breturn\b(.*)")?,
            paren_condition: Regex::new(r"\b(?:if|elif|while|switch)\s*\((.*)\)")?,
            colon_condition: Regex::new(r"\b(?:if|elif|while|match)\s+(.+):")?,
            brace_condition: Regex::new(r"\b(?:if|while|switch|match)\s+(.+?)\s*\{\s*$")?,
            any_paren: Regex::new(r"\((.*)\)")?,
            paren_loop: Regex::new(r"\bfor(?:each)?\s*\((.*)\)")?,
            iterator_loop: Regex::new(r"\bfor\s+(.+?)\s+in\s+(.+?)\s*[:{]?\s*$")?,
            bare_loop: Regex::new(r"\bfor\s+(.+?)\s*\{\s*$")?,
            case_value: Regex::new(r"(?i)\bcase\s+([^:]+):?")?,
        })
    }

    pub fn procedure_name(&self, text: &str) -> String {
        self.procedure_keyword
            .captures(text)
            .or_else(|| self.procedure_call.captures(text))
            .and_then(|caps| caps.get(1))
            .map_or_else(|| DEFAULT_PROCEDURE.to_string(), |m| m.as_str().to_string())
    }

    pub fn return_value(&self, text: &str) -> Option<String> {
        let value = self.return_expr.captures(text)?.get(1)?.as_str().trim();
        let value = value.trim_end_matches(';').trim_end();
        (!value.is_empty()).then(|| value.to_string())
    }

    pub fn condition(&self, text: &str) -> String {
        if let Some(caps) = self.paren_condition.captures(text) {
            return non_empty_or(caps[1].trim().trim_end_matches('{').trim(), CONDITION_PLACEHOLDER);
        }
        for regex in [&self.colon_condition, &self.brace_condition, &self.any_paren] {
            if let Some(caps) = regex.captures(text) {
                return non_empty_or(caps[1].trim(), CONDITION_PLACEHOLDER);
            }
        }
        CONDITION_PLACEHOLDER.to_string()
    }

    pub fn loop_header(&self, text: &str) -> String {
        if let Some(caps) = self.paren_loop.captures(text) {
            return non_empty_or(caps[1].trim(), LOOP_PLACEHOLDER);
        }
        if let Some(caps) = self.iterator_loop.captures(text) {
            return format!("{} IN {}", caps[1].trim(), caps[2].trim());
        }
        if let Some(caps) = self.bare_loop.captures(text) {
            return non_empty_or(caps[1].trim(), LOOP_PLACEHOLDER);
        }
        LOOP_PLACEHOLDER.to_string()
    }

    pub fn case_value(&self, text: &str) -> String {
        self.case_value
            .captures(text)
            .map_or_else(|| VALUE_PLACEHOLDER.to_string(), |caps| non_empty_or(caps[1].trim(), VALUE_PLACEHOLDER))
    }
}

fn non_empty_or(value: &str, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

fn compact(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone)]
struct ControlFrame {
    kind: BlockKind,
    depth: usize,
    opened: usize,
}

#[derive(Debug, Clone)]
struct ProcedureFrame {
    name: String,
    depth: usize,
    opened: usize,
}

enum Innermost<'f> {
    Control(&'f ControlFrame),
    Procedure(&'f ProcedureFrame),
}

/// Output buffer plus the two block stacks
#[derive(Default)]
struct PseudocodeWriter {
    lines: Vec<String>,
    indent: usize,
    controls: Vec<ControlFrame>,
    procedures: Vec<ProcedureFrame>,
}

impl PseudocodeWriter {
    fn write(&mut self, line: &str) {
        self.lines.push(format!("{}{}", "  ".repeat(self.indent), line));
    }

    fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1).max(1);
    }

    fn open_control(&mut self, kind: BlockKind, depth: usize, opened: usize) {
        self.controls.push(ControlFrame { kind, depth, opened });
        self.indent += 1;
    }

    fn open_procedure(&mut self, name: String, depth: usize, opened: usize) {
        self.write(&format!("PROCEDURE {}(...)", name));
        self.procedures.push(ProcedureFrame { name, depth, opened });
        self.indent += 1;
    }

    fn close_control(&mut self) {
        if let Some(frame) = self.controls.pop() {
            self.dedent();
            self.write(frame.kind.closer());
        }
    }

    fn close_procedure(&mut self) {
        if let Some(frame) = self.procedures.pop() {
            self.dedent();
            self.write(&format!("END PROCEDURE  // {}", frame.name));
        }
    }

    fn innermost(&self) -> Option<Innermost<'_>> {
        match (self.controls.last(), self.procedures.last()) {
            (Some(c), Some(p)) if p.opened > c.opened => Some(Innermost::Procedure(p)),
            (Some(c), _) => Some(Innermost::Control(c)),
            (None, Some(p)) => Some(Innermost::Procedure(p)),
            (None, None) => None,
        }
    }

    fn top_control(&self) -> Option<BlockKind> {
        self.controls.last().map(|frame| frame.kind)
    }

    /// Close every block the incoming step has left by dedenting
    fn close_for_depth(&mut self, category: Category, depth: usize, do_trailer: bool) {
        loop {
            let close_control = match self.innermost() {
                None => return,
                Some(Innermost::Procedure(frame)) => {
                    if depth > frame.depth {
                        return;
                    }
                    false
                }
                Some(Innermost::Control(frame)) => {
                    let keep = match frame.kind {
                        BlockKind::If if matches!(category, Category::Elif | Category::Else) => depth >= frame.depth,
                        BlockKind::Case if matches!(category, Category::Case | Category::Default) => depth > frame.depth,
                        // brace switches keep case bodies at the case label's depth
                        BlockKind::Case => depth >= frame.depth,
                        BlockKind::Do if do_trailer => depth >= frame.depth,
                        _ => depth > frame.depth,
                    };
                    if keep {
                        return;
                    }
                    true
                }
            };

            if close_control {
                self.close_control();
            } else {
                self.close_procedure();
            }
        }
    }

    /// Explicit closing keyword: close the innermost control block
    fn close_explicit(&mut self) {
        let Some(opened) = self.controls.last().map(|frame| frame.opened) else {
            return;
        };
        while self.procedures.last().map_or(false, |p| p.opened > opened) {
            self.close_procedure();
        }
        self.close_control();
    }

    fn close_all(&mut self) {
        loop {
            let control = match self.innermost() {
                Some(Innermost::Control(_)) => true,
                Some(Innermost::Procedure(_)) => false,
                None => return,
            };
            if control {
                self.close_control();
            } else {
                self.close_procedure();
            }
        }
    }
}

/// Renders steps as indented pseudocode.
///
/// A block closes when the nesting depth falls back to its opener's depth,
/// when the line carries an explicit closing keyword, or at end of input.
pub struct PseudocodeRenderer<'a> {
    catalog: &'a PatternCatalog,
    extractors: &'a TextExtractors,
}

impl<'a> PseudocodeRenderer<'a> {
    pub fn new(catalog: &'a PatternCatalog, extractors: &'a TextExtractors) -> Self {
        Self { catalog, extractors }
    }

    pub fn render(&self, steps: &[Step]) -> String {
        let mut out = PseudocodeWriter::default();
        out.write("BEGIN");
        out.indent += 1;

        for (index, step) in steps.iter().enumerate() {
            if step.category.is_terminator() {
                continue;
            }

            let text = step.text.as_str();
            let do_trailer = step.category == Category::While && text.trim_end().ends_with(';');
            out.close_for_depth(step.category, step.depth, do_trailer);
            self.emit(&mut out, step, index, do_trailer);

            if self.catalog.has_closing_keyword(text) && !out.controls.is_empty() {
                trace!("Explicit block close at {}", step.id);
                out.close_explicit();
            }
        }

        out.close_all();
        out.indent = 0;
        out.write("END");
        out.lines.join("\n")
    }

    fn emit(&self, out: &mut PseudocodeWriter, step: &Step, index: usize, do_trailer: bool) {
        let ex = self.extractors;
        let text = step.text.as_str();
        let depth = step.depth;

        match step.category {
            Category::Function => out.open_procedure(ex.procedure_name(text), depth, index),
            Category::Return => match ex.return_value(text) {
                Some(value) => out.write(&format!("RETURN {}", value)),
                None => out.write("RETURN"),
            },
            Category::If => {
                out.write(&format!("IF {} THEN", ex.condition(text)));
                out.open_control(BlockKind::If, depth, index);
            }
            Category::Elif | Category::Else => {
                let line = match step.category {
                    Category::Elif => format!("ELSE IF {} THEN", ex.condition(text)),
                    _ => "ELSE".to_string(),
                };
                if out.top_control() == Some(BlockKind::If) {
                    out.controls.pop();
                    out.dedent();
                    out.write(&line);
                    out.open_control(BlockKind::If, depth, index);
                } else {
                    out.write(&line);
                }
            }
            Category::For => {
                out.write(&format!("FOR {} DO", ex.loop_header(text)));
                out.open_control(BlockKind::For, depth, index);
            }
            Category::While if do_trailer && out.top_control() == Some(BlockKind::Do) => {
                out.controls.pop();
                out.dedent();
                out.write(&format!("END DO WHILE {}", ex.condition(text)));
            }
            Category::While => {
                out.write(&format!("WHILE {} DO", ex.condition(text)));
                out.open_control(BlockKind::While, depth, index);
            }
            Category::Do => {
                out.write("DO");
                out.open_control(BlockKind::Do, depth, index);
            }
            Category::Switch => {
                out.write(&format!("SWITCH {}", ex.condition(text)));
                out.open_control(BlockKind::Switch, depth, index);
            }
            Category::Case => {
                out.write(&format!("CASE {}:", ex.case_value(text)));
                out.open_control(BlockKind::Case, depth, index);
            }
            Category::Default => {
                out.write("DEFAULT:");
                out.open_control(BlockKind::Case, depth, index);
            }
            Category::IoIn => out.write(&format!("INPUT  ←  {}", compact(text))),
            Category::IoOut => out.write(&format!("OUTPUT ←  {}", compact(text))),
            Category::Process | Category::Start | Category::End => out.write(&format!("PROCESS {}", text)),
        }
    }
}
