use thiserror::Error;

/// Main error type for revdoc operations
#[derive(Error, Debug)]
pub enum RevdocError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported source language: {0}")]
    Language(String),

    #[error("Pattern catalog error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    FileSystem(String),
}

pub type Result<T> = std::result::Result<T, RevdocError>;
