use std::path::PathBuf;
use thiserror::Error;

/// Main error type for docsai operations
#[derive(Error, Debug)]
pub enum DocsaiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API key not found. Please configure it using 'docsai config --api-key'.")]
    NotConfigured,

    #[error("Configuration file not found at {}, please create one.", .0.display())]
    ConfigFileMissing(PathBuf),

    #[error("The file {} doesn't exist", .0.display())]
    SourceMissing(PathBuf),

    #[error("Model request failed: {0}")]
    Model(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DocsaiError>;
