//! Error types for the extraction and batch engine.

/// Top-level error enum for the extractor library.
#[derive(Debug, thiserror::Error)]
pub enum ExtractorError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Checkout failed: {0}")]
    Checkout(String),

    #[error("Dataset query failed: {0}")]
    Dataset(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ExtractorResult<T> = Result<T, ExtractorError>;
