use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;

use crate::core::Engine;

#[derive(Parser)]
#[command(name = "revdoc")]
#[command(about = "Reverse-engineer source code into pseudocode and a Mermaid flowchart")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate pseudocode and flowchart artifacts
    Generate {
        /// Source file or directory
        #[arg(short, long)]
        source: PathBuf,

        /// Source language (defaults to extension, then config)
        #[arg(short, long)]
        language: Option<String>,

        /// Output directory for artifacts
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the standalone HTML page
        #[arg(long)]
        no_html: bool,
    },

    /// Print the step sequence as JSON
    Steps {
        /// Source file
        #[arg(short, long)]
        source: PathBuf,

        #[arg(short, long)]
        language: Option<String>,
    },

    /// List supported languages
    Languages,

    /// Write a default revdoc.toml
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub async fn execute(self, engine: Engine) -> Result<()> {
        match self.command {
            Commands::Generate { source, language, output, no_html } => {
                engine.generate(&source, language.as_deref(), output, no_html).await?;
                Ok(())
            }
            Commands::Steps { source, language } => {
                engine.print_steps(&source, language.as_deref()).await
            }
            Commands::Languages => engine.languages().await,
            Commands::Init { path, force } => {
                engine.init(path, force).await?;
                Ok(())
            }
        }
    }
}
