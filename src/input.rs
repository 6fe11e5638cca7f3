//! Reading template and answer-set documents
//!
//! Documents are JSON by default. Templates may also be written in TOML,
//! which is picked by the `.toml` extension and converted to the same JSON
//! value before validation.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when loading a document
#[derive(Error, Debug)]
pub enum InputError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Serialization of a document on disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentFormat {
    #[default]
    Json,
    Toml,
}

impl DocumentFormat {
    /// Guess the format from a file extension, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Json,
        }
    }
}

/// Load a document from a file
pub fn read_document(path: &Path) -> Result<Value, InputError> {
    let content = fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "read document");
    parse_document(&content, DocumentFormat::from_path(path))
}

/// Parse a document from a string
pub fn parse_document(content: &str, format: DocumentFormat) -> Result<Value, InputError> {
    match format {
        DocumentFormat::Json => Ok(serde_json::from_str(content)?),
        DocumentFormat::Toml => Ok(toml::from_str(content)?),
    }
}
