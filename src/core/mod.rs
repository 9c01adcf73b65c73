mod catalog;
mod classifier;
mod engine;
mod flowchart;
mod generator;
mod html;
mod language;
mod normalizer;
mod pseudocode;
mod steps;
mod writer;

pub use catalog::{BlockDelimiters, CatalogEntry, Category, PatternCatalog, Recognizer};
pub use classifier::LineClassifier;
pub use language::{LanguageFamily, SourceLanguage};
pub use normalizer::BlockNormalizer;
pub use steps::{truncate_label, NormalizedLine, Step, StepBuilder, ELLIPSIS};
pub use pseudocode::{BlockKind, PseudocodeRenderer, TextExtractors};
pub use flowchart::{sanitize_label, FlowchartRenderer, LabelCharset, NodeShape, EMPTY_LABEL};
pub use generator::{GeneratedDocs, Generator};
pub use html::{prepare_for_embedding, render_flowchart_page};
pub use writer::{content_hash, Manifest, OutputWriter, WrittenArtifacts};

// Export the main engine
pub use engine::{artifact_dir_name, split_lines, Engine, SourceFile};
