//! Error types for the CRUD state machine

use formtree_binding::BindingError;
use formtree_node::{DataMode, ValidationError};

/// Errors returned by [`crate::CrudForm`] operations
///
/// A failed operation leaves mode, baseline and form values as they were.
#[derive(Debug, thiserror::Error)]
pub enum CrudError {
    /// Action not legal in the current mode
    #[error("cannot {action} while in {mode} mode")]
    IllegalTransition {
        /// Attempted action
        action: &'static str,
        /// Mode at the time of the attempt
        mode: DataMode,
    },

    /// Action switched off by configuration
    #[error("{action} is disabled")]
    Disabled {
        /// Attempted action
        action: &'static str,
    },

    /// Edit requested without a loaded record
    #[error("no record loaded")]
    NoBaseline,

    /// Form failed validation; errors are stored on the nodes
    #[error("form is invalid: {0}")]
    Invalid(ValidationError),

    /// A load or save is already in flight
    #[error("a load or save is already in progress")]
    Busy,

    /// Load collaborator failed
    #[error("load failed: {0}")]
    Load(#[source] anyhow::Error),

    /// Save collaborator failed
    #[error("save failed: {0}")]
    Save(#[source] anyhow::Error),

    /// Edit addressed a node that is missing or not a data node
    #[error(transparent)]
    Binding(#[from] BindingError),
}

impl CrudError {
    /// Create illegal transition error
    #[inline]
    pub(crate) fn illegal(action: &'static str, mode: DataMode) -> Self {
        Self::IllegalTransition { action, mode }
    }

    /// Check if retrying later could succeed without other changes
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy | Self::Load(_) | Self::Save(_))
    }
}

/// Errors reading a [`crate::CrudConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML syntax or shape error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON syntax or shape error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let err = CrudError::illegal("edit", DataMode::Insert);
        assert_eq!(err.to_string(), "cannot edit while in insert mode");

        let err = CrudError::Save(anyhow::anyhow!("disk full"));
        assert_eq!(err.to_string(), "save failed: disk full");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn retryable() {
        assert!(CrudError::Busy.is_retryable());
        assert!(CrudError::Load(anyhow::anyhow!("timeout")).is_retryable());
        assert!(!CrudError::NoBaseline.is_retryable());
        assert!(!CrudError::illegal("save", DataMode::Unspecified).is_retryable());
    }
}
