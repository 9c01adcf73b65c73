use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::Category;
use super::classifier::LineClassifier;

/// Marker appended when a label is cut
pub const ELLIPSIS: &str = "...";

/// A non-noise source line with its reconstructed nesting depth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedLine {
    pub depth: usize,
    pub text: String,
}

impl NormalizedLine {
    pub fn new(depth: usize, text: impl Into<String>) -> Self {
        Self { depth, text: text.into() }
    }
}

/// Classified, identified unit consumed by both renderers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Sequential identifier, `N0`, `N1`, ...
    pub id: String,
    pub category: Category,
    pub text: String,
    pub depth: usize,
}

/// Cut `text` to at most `limit` characters, ending in [`ELLIPSIS`] when cut
pub fn truncate_label(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    if limit <= ELLIPSIS.len() {
        return text.chars().take(limit).collect();
    }

    let keep = limit - ELLIPSIS.len();
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Wraps normalized lines with synthetic start/end markers
pub struct StepBuilder<'a> {
    classifier: LineClassifier<'a>,
    label_limit: usize,
}

impl<'a> StepBuilder<'a> {
    pub fn new(classifier: LineClassifier<'a>, label_limit: usize) -> Self {
        Self { classifier, label_limit }
    }

    pub fn build(&self, normalized: &[NormalizedLine]) -> Vec<Step> {
        let mut steps = Vec::with_capacity(normalized.len() + 2);
        steps.push(Step {
            id: step_id(0),
            category: Category::Start,
            text: "START".to_string(),
            depth: 0,
        });

        for line in normalized {
            steps.push(Step {
                id: step_id(steps.len()),
                category: self.classifier.classify(&line.text),
                text: truncate_label(&line.text, self.label_limit),
                depth: line.depth,
            });
        }

        steps.push(Step {
            id: step_id(steps.len()),
            category: Category::End,
            text: "END".to_string(),
            depth: 0,
        });

        debug!("Built {} steps from {} normalized lines", steps.len(), normalized.len());
        steps
    }
}

fn step_id(index: usize) -> String {
    format!("N{}", index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::PatternCatalog;

    #[test]
    fn test_empty_input_yields_start_and_end() {
        let catalog = PatternCatalog::new().unwrap();
        let builder = StepBuilder::new(LineClassifier::new(&catalog), 140);
        let steps = builder.build(&[]);

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].id, "N0");
        assert_eq!(steps[0].category, Category::Start);
        assert_eq!(steps[1].id, "N1");
        assert_eq!(steps[1].category, Category::End);
    }

    #[test]
    fn test_ids_are_dense_and_depth_is_kept() {
        let catalog = PatternCatalog::new().unwrap();
        let builder = StepBuilder::new(LineClassifier::new(&catalog), 140);
        let lines = vec![
            NormalizedLine::new(0, "def f(x):"),
            NormalizedLine::new(1, "return x"),
        ];
        let steps = builder.build(&lines);

        let ids: Vec<&str> = steps.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["N0", "N1", "N2", "N3"]);
        assert_eq!(steps[1].category, Category::Function);
        assert_eq!(steps[2].category, Category::Return);
        assert_eq!(steps[2].depth, 1);
        assert_eq!(steps[3].depth, 0);
    }

    #[test]
    fn test_long_text_is_truncated() {
        let catalog = PatternCatalog::new().unwrap();
        let builder = StepBuilder::new(LineClassifier::new(&catalog), 10);
        let steps = builder.build(&[NormalizedLine::new(0, "x = aaaaaaaaaaaaaaaa")]);
        assert_eq!(steps[1].text, "x = aaa...");
        assert_eq!(steps[1].text.chars().count(), 10);
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_label("héllo wörld", 11), "héllo wörld");
        assert_eq!(truncate_label("héllo wörld!", 8), "héllo...");
        assert_eq!(truncate_label("short", 140), "short");
    }

    #[test]
    fn test_truncate_below_ellipsis_width() {
        assert_eq!(truncate_label("abcdef", 3), "abc");
        assert_eq!(truncate_label("abcdef", 1), "a");
        assert_eq!(truncate_label("abcdef", 0), "");
        assert_eq!(truncate_label("ab", 2), "ab");
    }
}
