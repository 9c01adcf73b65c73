use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::{GenerationConfig, OutputConfig};
use crate::error::Result;
use super::generator::GeneratedDocs;
use super::html::render_flowchart_page;

/// Metadata written next to the artifacts
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub source: PathBuf,
    pub language: String,
    pub content_sha256: String,
    pub step_count: usize,
    pub categories: BTreeMap<String, usize>,
    pub generated_at: String,
    pub tool_version: String,
}

impl Manifest {
    pub fn new(source: &Path, content: &[u8], docs: &GeneratedDocs) -> Self {
        let mut categories = BTreeMap::new();
        for step in &docs.steps {
            *categories.entry(step.category.as_str().to_string()).or_insert(0) += 1;
        }

        Self {
            source: source.to_path_buf(),
            language: docs.language.name().to_string(),
            content_sha256: content_hash(content),
            step_count: docs.steps.len(),
            categories,
            generated_at: chrono::Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// SHA-256 of the raw source bytes
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Paths of everything one generation wrote
#[derive(Debug, Clone, Default)]
pub struct WrittenArtifacts {
    pub pseudocode: PathBuf,
    pub flowchart: PathBuf,
    pub html: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
}

impl WrittenArtifacts {
    pub fn paths(&self) -> Vec<&Path> {
        let mut paths = vec![self.pseudocode.as_path(), self.flowchart.as_path()];
        paths.extend(self.html.as_deref());
        paths.extend(self.manifest.as_deref());
        paths
    }
}

/// Persists generated docs into an output directory
pub struct OutputWriter {
    output: OutputConfig,
    generation: GenerationConfig,
}

impl OutputWriter {
    pub fn new(output: &OutputConfig, generation: &GenerationConfig) -> Self {
        Self {
            output: output.clone(),
            generation: generation.clone(),
        }
    }

    pub async fn write(
        &self,
        out_dir: &Path,
        docs: &GeneratedDocs,
        source: &Path,
        content: &[u8],
        write_html: bool,
    ) -> Result<WrittenArtifacts> {
        tokio::fs::create_dir_all(out_dir).await?;

        let pseudocode = out_dir.join(&self.output.pseudocode_file);
        tokio::fs::write(&pseudocode, &docs.pseudocode).await?;

        let flowchart = out_dir.join(&self.output.flowchart_file);
        tokio::fs::write(&flowchart, docs.flowchart.replace("\r\n", "\n")).await?;

        let html = if write_html {
            let title = source
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| "source".to_string());
            let page = render_flowchart_page(&docs.flowchart, &title, docs.language, self.generation.label_charset)?;
            let path = out_dir.join(&self.output.html_file);
            tokio::fs::write(&path, page).await?;
            Some(path)
        } else {
            None
        };

        let manifest = if self.output.include_metadata {
            let manifest = Manifest::new(source, content, docs);
            let path = out_dir.join("manifest.json");
            tokio::fs::write(&path, serde_json::to_string_pretty(&manifest)?).await?;
            Some(path)
        } else {
            None
        };

        debug!("Wrote artifacts for {} into {}", source.display(), out_dir.display());

        Ok(WrittenArtifacts {
            pseudocode,
            flowchart,
            html,
            manifest,
        })
    }
}
