use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::{LabelCharset, SourceLanguage};
use crate::error::{RevdocError, Result};

/// Config file names checked when no explicit path is given
pub const CONFIG_CANDIDATES: [&str; 3] = ["Revdoc.toml", "revdoc.toml", ".revdoc.toml"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source language selection
    pub language: LanguageConfig,

    /// Pipeline settings shared by both renderers
    pub generation: GenerationConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Used when the selector is missing or unrecognized
    pub default: SourceLanguage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Maximum characters kept in a step's display text
    pub step_label_limit: usize,

    /// Maximum characters in a flowchart node label
    pub graph_label_limit: usize,

    /// Spaces per nesting level for indentation-delimited languages
    pub indent_width: usize,

    /// Columns a tab advances to
    pub tab_width: usize,

    /// Draw I/O steps as parallelograms instead of prefixed boxes
    pub iso_shapes: bool,

    /// Characters allowed in labels and the HTML page
    pub label_charset: LabelCharset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output directory
    pub dir: PathBuf,

    pub pseudocode_file: String,

    pub flowchart_file: String,

    pub html_file: String,

    /// Write the standalone browser page
    pub write_html: bool,

    /// Write manifest.json next to the artifacts
    pub include_metadata: bool,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            default: SourceLanguage::Python,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            step_label_limit: 140,
            graph_label_limit: 120,
            indent_width: 4,
            tab_width: 4,
            iso_shapes: true,
            label_charset: LabelCharset::Unicode,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            pseudocode_file: "pseudocode.txt".to_string(),
            flowchart_file: "flowchart.mmd".to_string(),
            html_file: "flowchart.html".to_string(),
            write_html: true,
            include_metadata: true,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| RevdocError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RevdocError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                for candidate in &CONFIG_CANDIDATES {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let generation = &self.generation;
        if generation.step_label_limit < 4 || generation.graph_label_limit < 4 {
            return Err(RevdocError::Config(format!(
                "label limits must be at least 4 characters (step: {}, graph: {})",
                generation.step_label_limit, generation.graph_label_limit
            )));
        }
        if generation.indent_width == 0 || generation.tab_width == 0 {
            return Err(RevdocError::Config("indent_width and tab_width must be positive".to_string()));
        }
        for name in [&self.output.pseudocode_file, &self.output.flowchart_file, &self.output.html_file] {
            if name.trim().is_empty() {
                return Err(RevdocError::Config("output file names must not be empty".to_string()));
            }
        }
        Ok(())
    }
}
