use tera::{Context, Tera};

use crate::error::Result;
use super::flowchart::LabelCharset;
use super::language::SourceLanguage;

const FLOWCHART_TEMPLATE: &str = include_str!("templates/flowchart.html");

const SCRIPT_END: &str = "</script";

/// Filter graph text so it can sit inside a `<script type="text/plain">` block
pub fn prepare_for_embedding(flowchart: &str, charset: LabelCharset) -> String {
    let normalized = flowchart.replace("\r\n", "\n").replace('\r', "\n");

    let mut filtered = String::with_capacity(normalized.len());
    for c in normalized.chars() {
        match c {
            '\t' => filtered.push_str("  "),
            c if charset.allows(c) => filtered.push(c),
            _ => {}
        }
    }

    escape_script_end(&filtered)
}

/// Rewrite every case-insensitive `</script` as `<\/script`
fn escape_script_end(text: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `text`
    let lowered = text.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for (pos, _) in lowered.match_indices(SCRIPT_END) {
        out.push_str(&text[last..pos]);
        out.push_str("<\\/");
        out.push_str(&text[pos + 2..pos + SCRIPT_END.len()]);
        last = pos + SCRIPT_END.len();
    }
    out.push_str(&text[last..]);
    out
}

/// Standalone page that renders the flowchart in a browser
pub fn render_flowchart_page(
    flowchart: &str,
    title: &str,
    language: SourceLanguage,
    charset: LabelCharset,
) -> Result<String> {
    let mut context = Context::new();
    context.insert("title", title);
    context.insert("language", language.name());
    context.insert("flowchart", &prepare_for_embedding(flowchart, charset));

    Ok(Tera::one_off(FLOWCHART_TEMPLATE, &context, false)?)
}
