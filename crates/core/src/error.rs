//! Error types for the conversion pipeline

use thiserror::Error;

/// Core pipeline errors
///
/// Record-level problems (missing identifiers, dangling connectors, empty
/// boards) never surface here: they are skipped and counted instead.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
