use serde::Serialize;
use tracing::debug;

use crate::config::GenerationConfig;
use crate::error::Result;
use super::catalog::PatternCatalog;
use super::classifier::LineClassifier;
use super::flowchart::FlowchartRenderer;
use super::language::SourceLanguage;
use super::normalizer::BlockNormalizer;
use super::pseudocode::{PseudocodeRenderer, TextExtractors};
use super::steps::{Step, StepBuilder};

/// Both artifacts derived from one source, plus the steps they were rendered from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedDocs {
    pub language: SourceLanguage,
    pub steps: Vec<Step>,
    pub pseudocode: String,
    pub flowchart: String,
}

/// Runs the line pipeline: normalize, build steps, render both outputs
pub struct Generator {
    catalog: PatternCatalog,
    extractors: TextExtractors,
    config: GenerationConfig,
}

impl Generator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        Ok(Self {
            catalog: PatternCatalog::new()?,
            extractors: TextExtractors::new()?,
            config: config.clone(),
        })
    }

    pub fn steps<S: AsRef<str>>(&self, source: &[S], language: SourceLanguage) -> Vec<Step> {
        let normalizer = BlockNormalizer::new(&self.catalog, self.config.indent_width, self.config.tab_width);
        let normalized = normalizer.normalize(source, language);

        StepBuilder::new(LineClassifier::new(&self.catalog), self.config.step_label_limit).build(&normalized)
    }

    pub fn generate<S: AsRef<str>>(&self, source: &[S], language: SourceLanguage) -> GeneratedDocs {
        let steps = self.steps(source, language);

        let pseudocode = PseudocodeRenderer::new(&self.catalog, &self.extractors).render(&steps);
        let flowchart = FlowchartRenderer::new(
            self.config.graph_label_limit,
            self.config.iso_shapes,
            self.config.label_charset,
        )
        .render(&steps);

        debug!(
            "Generated {} pseudocode lines and {} flowchart lines",
            pseudocode.lines().count(),
            flowchart.lines().count()
        );

        GeneratedDocs {
            language,
            steps,
            pseudocode,
            flowchart,
        }
    }
}
