//! Error types for containers and layout documents
//!
//! Covers:
//! - Layout parsing (JSON, YAML, TOML)
//! - Layout compilation (patterns, structural problems)
//! - List item management

use std::path::PathBuf;

/// Errors raised while loading layouts or managing list items
#[derive(Debug, thiserror::Error)]
pub enum BlocksError {
    /// No parser for the file extension
    #[error("unsupported layout format: '{0}'")]
    UnsupportedFormat(String),

    /// IO error while reading a layout
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON layout
    #[error("json layout error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed YAML layout
    #[error("yaml layout error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed TOML layout
    #[error("toml layout error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Field pattern does not compile
    #[error("invalid pattern for field '{field}': {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// Structurally invalid layout
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// List already holds its maximum number of items
    #[error("list '{name}' is full ({max} items)")]
    ListFull { name: String, max: usize },

    /// List item index out of range
    #[error("list '{name}' has no item {index} (len {len})")]
    IndexOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },
}

impl BlocksError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create invalid layout error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidLayout(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = BlocksError::ListFull {
            name: "items".to_string(),
            max: 3,
        };
        assert_eq!(err.to_string(), "list 'items' is full (3 items)");

        let err = BlocksError::invalid("list without item");
        assert!(err.to_string().contains("list without item"));
    }

    #[test]
    fn pattern_error_keeps_source() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = BlocksError::InvalidPattern {
            field: "zip".to_string(),
            source,
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
