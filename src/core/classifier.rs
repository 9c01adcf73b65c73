use super::catalog::{Category, PatternCatalog};

/// Assigns exactly one category to a line by walking the catalog in priority order
#[derive(Debug, Clone, Copy)]
pub struct LineClassifier<'a> {
    catalog: &'a PatternCatalog,
}

impl<'a> LineClassifier<'a> {
    pub fn new(catalog: &'a PatternCatalog) -> Self {
        Self { catalog }
    }

    /// First matching category wins; `Process` when nothing matches
    pub fn classify(&self, line: &str) -> Category {
        self.catalog
            .entries()
            .iter()
            .find(|entry| entry.recognizers.iter().any(|r| r.matches(line)))
            .map_or(Category::Process, |entry| entry.category)
    }
}
