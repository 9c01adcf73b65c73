use proptest::prelude::*;

use revdoc::config::GenerationConfig;
use revdoc::core::{sanitize_label, Category, Generator, LabelCharset, SourceLanguage};

fn generator() -> Generator {
    Generator::new(&GenerationConfig::default()).unwrap()
}

fn any_language() -> impl Strategy<Value = SourceLanguage> {
    prop::sample::select(SourceLanguage::ALL.to_vec())
}

const BLOCK_LINES: &[&str] = &[
    "if (x) {",
    "} else if (y) {",
    "} else {",
    "for (i = 0; i < n; i++) {",
    "while (z) {",
    "do {",
    "} while (k);",
    "switch (v) {",
    "case 1:",
    "default:",
    "break;",
    "}",
    "int f(int a) {",
    "return a;",
    "x = 1;",
    "if a:",
    "elif b:",
    "else:",
    "for i in xs:",
    "while c:",
    "def g(p):",
    "end",
];

fn block_line() -> impl Strategy<Value = String> {
    (0usize..4, prop::sample::select(BLOCK_LINES.to_vec()))
        .prop_map(|(indent, line)| format!("{}{}", "    ".repeat(indent), line))
}

fn is_opener(line: &str) -> bool {
    ["IF ", "FOR ", "WHILE ", "SWITCH ", "CASE ", "PROCEDURE "]
        .iter()
        .any(|prefix| line.starts_with(prefix))
        || line == "DO"
        || line == "DEFAULT:"
}

fn is_closer(line: &str) -> bool {
    line.starts_with("END ") || line == "// END CASE"
}

fn code_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ \t]{0,8}[a-z_=(){};: ]{0,20}",
        Just("}".to_string()),
        Just("} else {".to_string()),
        Just("if (x) {".to_string()),
        Just("    while y:".to_string()),
        Just("/* open".to_string()),
        Just("close */".to_string()),
        Just("\"\"\"".to_string()),
        ".{0,30}",
    ]
}

proptest! {
    #[test]
    fn test_generation_is_total(lines in prop::collection::vec(code_line(), 0..40), language in any_language()) {
        let docs = generator().generate(&lines, language);

        prop_assert!(docs.steps.len() >= 2);
        prop_assert_eq!(docs.steps[0].category, Category::Start);
        prop_assert_eq!(docs.steps[docs.steps.len() - 1].category, Category::End);
        prop_assert!(docs.pseudocode.starts_with("BEGIN"));
        prop_assert!(docs.pseudocode.ends_with("END"));
        prop_assert_eq!(docs.flowchart.matches(" --> ").count(), docs.steps.len() - 1);
    }

    #[test]
    fn test_unbalanced_closers_keep_depth_at_zero(closers in 1usize..20, language in any_language()) {
        let mut lines = vec!["}".to_string(); closers];
        lines.push("x = 1;".to_string());

        let steps = generator().steps(&lines, language);
        let last_body = &steps[steps.len() - 2];
        prop_assert_eq!(last_body.depth, 0);
    }

    #[test]
    fn test_labels_are_graph_safe(text in ".{0,200}", ascii in any::<bool>()) {
        let charset = if ascii { LabelCharset::Ascii } else { LabelCharset::Unicode };
        let label = sanitize_label(&text, 120, charset);

        prop_assert!(!label.is_empty());
        for forbidden in ['[', ']', '{', '}', '(', ')', '<', '>', '"'] {
            prop_assert!(!label.contains(forbidden));
        }
        prop_assert!(!label.chars().any(char::is_control));
        prop_assert!(label.chars().count() <= 120);
        if ascii {
            prop_assert!(label.is_ascii());
        }
    }

    #[test]
    fn test_every_opened_block_is_closed(
        lines in prop::collection::vec(block_line(), 0..40),
        python in any::<bool>(),
    ) {
        let language = if python { SourceLanguage::Python } else { SourceLanguage::C };
        let docs = generator().generate(&lines, language);
        let body: Vec<&str> = docs.pseudocode.lines().map(str::trim).collect();

        let opened = body.iter().filter(|l| is_opener(l)).count();
        let closed = body.iter().filter(|l| is_closer(l)).count();
        prop_assert_eq!(opened, closed, "{}", docs.pseudocode);
        prop_assert_eq!(body.last().copied(), Some("END"));
    }

    #[test]
    fn test_step_count_matches_kept_lines(lines in prop::collection::vec("[ ]{0,8}[a-z=(): ]{0,12}", 0..30)) {
        let kept = lines.iter().filter(|l| !l.trim().is_empty()).count();
        let steps = generator().steps(&lines, SourceLanguage::Python);
        prop_assert_eq!(steps.len(), kept + 2);
    }

    #[test]
    fn test_generation_is_deterministic(lines in prop::collection::vec(code_line(), 0..30), language in any_language()) {
        let generator = generator();
        prop_assert_eq!(generator.generate(&lines, language), generator.generate(&lines, language));
    }
}
