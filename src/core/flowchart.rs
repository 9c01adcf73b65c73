use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::Category;
use super::steps::{truncate_label, Step};

/// Replacement label for text that sanitizes down to nothing
pub const EMPTY_LABEL: &str = "NO-OP";

const NODE_STYLE: &str = "stroke:#000,stroke-width:1.5px,fill:#fff,color:#000;";

/// Which characters labels (and the HTML page) may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelCharset {
    /// Unicode look-alikes stand in for grammar characters
    #[default]
    Unicode,
    /// Printable ASCII only
    Ascii,
}

impl LabelCharset {
    /// Whether `c` may appear in an embedded document
    pub fn allows(&self, c: char) -> bool {
        match c {
            '\t' | '\n' | '\r' | '\u{20}'..='\u{7e}' => true,
            _ => match self {
                LabelCharset::Ascii => false,
                LabelCharset::Unicode => matches!(c, '\u{a0}'..='\u{d7ff}' | '\u{e000}'..='\u{fffd}'),
            },
        }
    }

    fn substitute(&self, c: char) -> Option<&'static str> {
        let unicode = *self == LabelCharset::Unicode;
        let replacement = match c {
            '[' | ']' | '{' | '}' | '(' | ')' | '"' | '\u{201c}' | '\u{201d}' => "",
            '<' if unicode => "‹",
            '<' => " lt ",
            '>' if unicode => "›",
            '>' => " gt ",
            ';' if unicode => "；",
            ';' => ",",
            '\\' if unicode => "⧵",
            '\\' => "/",
            '`' if unicode => "ˋ",
            '`' => "'",
            _ => return None,
        };
        Some(replacement)
    }
}

/// Flowchart shape class of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Terminator,
    Decision,
    InputOutput,
    Process,
}

impl NodeShape {
    pub fn for_category(category: Category) -> Self {
        if category.is_terminator() {
            NodeShape::Terminator
        } else if category.is_decision() {
            NodeShape::Decision
        } else if category.is_io() {
            NodeShape::InputOutput
        } else {
            NodeShape::Process
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            NodeShape::Terminator => "term",
            NodeShape::Decision => "decision",
            NodeShape::InputOutput => "io",
            NodeShape::Process => "process",
        }
    }
}

/// Make `text` safe to place inside a Mermaid node label.
///
/// Strips control characters, rewrites or drops characters that carry
/// meaning in the flowchart grammar, collapses whitespace, and only then
/// truncates to `limit` characters so substitutions cannot overrun it.
pub fn sanitize_label(text: &str, limit: usize, charset: LabelCharset) -> String {
    let mut mapped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '\t' | '\n' | '\r' => mapped.push(' '),
            c if c.is_control() => {}
            c => {
                if let Some(replacement) = charset.substitute(c) {
                    mapped.push_str(replacement);
                } else if charset.allows(c) {
                    mapped.push(c);
                }
            }
        }
    }

    let collapsed = mapped.split_whitespace().collect::<Vec<_>>().join(" ");
    let label = truncate_label(&collapsed, limit);
    if label.trim().is_empty() {
        EMPTY_LABEL.to_string()
    } else {
        label
    }
}

/// Linear Mermaid chart: one node per step, one edge per consecutive pair
#[derive(Debug, Clone)]
pub struct FlowchartRenderer {
    label_limit: usize,
    iso_shapes: bool,
    charset: LabelCharset,
}

impl FlowchartRenderer {
    pub fn new(label_limit: usize, iso_shapes: bool, charset: LabelCharset) -> Self {
        Self {
            label_limit,
            iso_shapes,
            charset,
        }
    }

    pub fn render(&self, steps: &[Step]) -> String {
        let mut out = vec!["flowchart TD".to_string()];

        for step in steps {
            out.push(format!("  {}", self.node(step)));
        }

        for pair in steps.windows(2) {
            out.push(format!("  {} --> {}", pair[0].id, pair[1].id));
        }

        for class in ["default", "term", "io", "decision", "process"] {
            out.push(format!("  classDef {} {}", class, NODE_STYLE));
        }

        let terminators = [steps.first(), steps.last()];
        for step in terminators.into_iter().flatten() {
            out.push(format!("  class {} term;", step.id));
        }
        for step in steps.iter().filter(|s| !s.category.is_terminator()) {
            out.push(format!("  class {} {};", step.id, NodeShape::for_category(step.category).class_name()));
        }

        out.push("  linkStyle default stroke:#000,stroke-width:1.5px;".to_string());

        debug!("Rendered flowchart with {} nodes", steps.len());
        out.join("\n")
    }

    fn node(&self, step: &Step) -> String {
        let label = sanitize_label(&step.text, self.label_limit, self.charset);
        let id = &step.id;

        match NodeShape::for_category(step.category) {
            NodeShape::Terminator => format!("{}({})", id, label),
            NodeShape::Decision => format!("{}{{{}}}", id, label),
            NodeShape::InputOutput if self.iso_shapes => format!("{}[/{}/]", id, label),
            NodeShape::InputOutput => {
                let prefix = if step.category == Category::IoIn { "INPUT" } else { "OUTPUT" };
                format!("{}[{}: {}]", id, prefix, label)
            }
            NodeShape::Process => format!("{}[{}]", id, label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(index: usize, category: Category, text: &str) -> Step {
        Step {
            id: format!("N{}", index),
            category,
            text: text.to_string(),
            depth: 0,
        }
    }

    fn renderer() -> FlowchartRenderer {
        FlowchartRenderer::new(120, true, LabelCharset::Unicode)
    }

    #[test]
    fn test_empty_program_graph() {
        let steps = vec![step(0, Category::Start, "START"), step(1, Category::End, "END")];
        let graph = renderer().render(&steps);
        let lines: Vec<&str> = graph.lines().collect();

        assert_eq!(lines[0], "flowchart TD");
        assert_eq!(lines[1], "  N0(START)");
        assert_eq!(lines[2], "  N1(END)");
        assert_eq!(lines[3], "  N0 --> N1");
        assert_eq!(graph.matches("-->").count(), 1);
        assert!(graph.contains("  class N0 term;\n  class N1 term;"));
        assert!(graph.ends_with("linkStyle default stroke:#000,stroke-width:1.5px;"));
    }

    #[test]
    fn test_shapes_by_category() {
        let steps = vec![
            step(0, Category::Start, "START"),
            step(1, Category::For, "for (i=0;i<10;i++) {"),
            step(2, Category::IoOut, "printf(\"hi\");"),
            step(3, Category::While, "while x:"),
            step(4, Category::End, "END"),
        ];
        let graph = renderer().render(&steps);

        assert!(graph.contains("  N1[for i=0；i‹10；i++]"));
        assert!(graph.contains("  N2[/printfhi；/]"));
        assert!(graph.contains("  N3{while x:}"));
        assert!(graph.contains("  class N1 process;"));
        assert!(graph.contains("  class N2 io;"));
        assert!(graph.contains("  class N3 decision;"));
        assert_eq!(graph.matches("-->").count(), 4);
    }

    #[test]
    fn test_non_iso_io_uses_prefix() {
        let steps = vec![step(0, Category::IoIn, "x = input()")];
        let graph = FlowchartRenderer::new(120, false, LabelCharset::Unicode).render(&steps);
        assert!(graph.contains("N0[INPUT: x = input]"));
    }

    #[test]
    fn test_sanitize_strips_grammar_characters() {
        let label = sanitize_label("if (a[0] < b) { s = \"x\\y\"; }", 120, LabelCharset::Unicode);
        for forbidden in ['[', ']', '{', '}', '(', ')', '<', '>', '"', ';', '\\'] {
            assert!(!label.contains(forbidden), "{} in {}", forbidden, label);
        }
        assert_eq!(label, "if a0 ‹ b s = x⧵y；");
    }

    #[test]
    fn test_sanitize_ascii_charset() {
        let label = sanitize_label("a<b; `c` → d", 120, LabelCharset::Ascii);
        assert_eq!(label, "a lt b, 'c' d");
        assert!(label.is_ascii());
    }

    #[test]
    fn test_sanitize_control_and_whitespace() {
        assert_eq!(sanitize_label("a\t\tb\u{7}\n  c", 120, LabelCharset::Unicode), "a b c");
        assert_eq!(sanitize_label("a\u{7}b\u{1b}c", 120, LabelCharset::Unicode), "abc");
        assert_eq!(sanitize_label("()[]{}", 120, LabelCharset::Unicode), EMPTY_LABEL);
        assert_eq!(sanitize_label("   ", 120, LabelCharset::Unicode), EMPTY_LABEL);
    }

    #[test]
    fn test_sanitize_truncates_with_ellipsis() {
        let long = "x".repeat(200);
        let label = sanitize_label(&long, 120, LabelCharset::Unicode);
        assert_eq!(label.chars().count(), 120);
        assert!(label.ends_with("..."));
    }

    #[test]
    fn test_ascii_substitutions_respect_limit() {
        let label = sanitize_label(&"<".repeat(200), 120, LabelCharset::Ascii);
        assert_eq!(label.chars().count(), 120);
        assert!(label.starts_with("lt lt"));
        assert!(label.ends_with("..."));

        assert_eq!(sanitize_label("a > b", 120, LabelCharset::Ascii), "a gt b");
    }

    #[test]
    fn test_charset_allows() {
        assert!(LabelCharset::Unicode.allows('‹'));
        assert!(!LabelCharset::Ascii.allows('‹'));
        assert!(!LabelCharset::Unicode.allows('\u{1F600}'));
        assert!(LabelCharset::Ascii.allows('~'));
    }
}
