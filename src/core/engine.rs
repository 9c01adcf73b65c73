use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use ignore::WalkBuilder;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::RevdocError;
use super::generator::Generator;
use super::language::SourceLanguage;
use super::steps::Step;
use super::writer::{OutputWriter, WrittenArtifacts};

/// Source file contents: raw bytes for hashing, decoded lines for the pipeline
pub struct SourceFile {
    pub bytes: Vec<u8>,
    pub lines: Vec<String>,
}

impl SourceFile {
    pub async fn read(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let lines = split_lines(&String::from_utf8_lossy(&bytes));
        Ok(Self { bytes, lines })
    }
}

/// Split on `\n`, dropping the `\r` of CRLF endings
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// Output directory name for a file found during a directory walk
pub fn artifact_dir_name(relative: &Path) -> PathBuf {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().replace('.', "_"))
        .collect()
}

/// Orchestrates reading sources, running the generator, and writing artifacts
pub struct Engine {
    config: Config,
    generator: Generator,
    writer: OutputWriter,
}

impl Engine {
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;
        debug!("Loaded configuration: {:?}", config);
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let generator = Generator::new(&config.generation)?;
        let writer = OutputWriter::new(&config.output, &config.generation);

        Ok(Self {
            config,
            generator,
            writer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn resolve_language(&self, selector: Option<&str>, path: &Path) -> SourceLanguage {
        SourceLanguage::resolve(selector, Some(path), self.config.language.default)
    }

    /// Generate artifacts for one file or every supported file under a directory
    pub async fn generate(
        &self,
        source: &Path,
        language: Option<&str>,
        output: Option<PathBuf>,
        no_html: bool,
    ) -> Result<Vec<WrittenArtifacts>> {
        let output_dir = output.unwrap_or_else(|| self.config.output.dir.clone());
        let write_html = self.config.output.write_html && !no_html;

        info!("🔍 Generating documentation for {}", source.display());
        info!("Output: {}", output_dir.display());

        if !source.exists() {
            return Err(RevdocError::FileSystem(format!("{} does not exist", source.display())).into());
        }

        if source.is_file() {
            let written = self.generate_file(source, language, &output_dir, write_html).await?;
            info!("🎉 Wrote {} artifacts", written.paths().len());
            return Ok(vec![written]);
        }

        let mut results = Vec::new();
        let walker = WalkBuilder::new(source)
            .hidden(false)
            .git_ignore(true)
            .require_git(false)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("⚠️ Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();

            if !path.is_file() || SourceLanguage::from_path(path).is_none() {
                continue;
            }

            let relative = path.strip_prefix(source).unwrap_or(path);
            let file_output = output_dir.join(artifact_dir_name(relative));

            match self.generate_file(path, language, &file_output, write_html).await {
                Ok(written) => results.push(written),
                Err(e) => warn!("⚠️ Skipping {}: {:#}", path.display(), e),
            }
        }

        info!("🎉 Generated documentation for {} files", results.len());
        Ok(results)
    }

    pub async fn generate_file(
        &self,
        path: &Path,
        language: Option<&str>,
        output_dir: &Path,
        write_html: bool,
    ) -> Result<WrittenArtifacts> {
        let source = SourceFile::read(path).await?;
        let language = self.resolve_language(language, path);

        info!("📝 {} ({}, {} lines)", path.display(), language, source.lines.len());
        let docs = self.generator.generate(&source.lines, language);

        let written = self
            .writer
            .write(output_dir, &docs, path, &source.bytes, write_html)
            .await
            .with_context(|| format!("Failed to write artifacts into {}", output_dir.display()))?;

        Ok(written)
    }

    /// Step sequence for a file, as produced before rendering
    pub async fn steps(&self, source: &Path, language: Option<&str>) -> Result<Vec<Step>> {
        let file = SourceFile::read(source).await?;
        let language = self.resolve_language(language, source);
        Ok(self.generator.steps(&file.lines, language))
    }

    pub async fn print_steps(&self, source: &Path, language: Option<&str>) -> Result<()> {
        let steps = self.steps(source, language).await?;
        println!("{}", serde_json::to_string_pretty(&steps)?);
        Ok(())
    }

    pub async fn languages(&self) -> Result<()> {
        for language in SourceLanguage::ALL {
            let marker = if language == self.config.language.default { " (default)" } else { "" };
            println!(
                "{:<12} {:<12} {}{}",
                language.name(),
                format!("{:?}", language.family()).to_lowercase(),
                language.file_extensions().join(", "),
                marker
            );
        }
        Ok(())
    }

    /// Write a default configuration file, returning its path
    pub async fn init(&self, path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
        let target_dir = match path {
            Some(path) => path,
            None => std::env::current_dir()?,
        };
        info!("Initializing revdoc in: {}", target_dir.display());

        tokio::fs::create_dir_all(&target_dir).await?;
        let config_path = target_dir.join("revdoc.toml");

        if config_path.exists() && !force {
            bail!(
                "{} already exists (use --force to overwrite)",
                config_path.display()
            );
        }

        Config::default().save(&config_path)?;
        info!("✅ Wrote {}", config_path.display());
        Ok(config_path)
    }
}
