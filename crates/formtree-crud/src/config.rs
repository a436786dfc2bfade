//! CRUD behaviour configuration

use crate::error::ConfigError;
use formtree_node::DataValue;
use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::CrudForm`]
///
/// Every field has a default, so partial documents are accepted:
///
/// ```toml
/// allow_insert = false
/// busy_label = "Saving person"
/// save_scope = "save"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrudConfig {
    /// Whether New is offered
    pub allow_insert: bool,

    /// Whether Edit is offered
    pub allow_update: bool,

    /// Distribute the save handler's result back into the form before taking
    /// the new baseline (for server-assigned keys, timestamps)
    pub apply_save_result: bool,

    /// Value distributed by New
    pub insert_defaults: DataValue,

    /// Label passed to the busy indicator
    pub busy_label: String,

    /// Scope of the validation pass run by Save
    pub save_scope: Option<String>,
}

impl CrudConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML document
    ///
    /// # Errors
    /// - `ConfigError::Toml` on syntax or shape errors
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Parse from a JSON document
    ///
    /// # Errors
    /// - `ConfigError::Json` on syntax or shape errors
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// With insert allowed or not
    #[inline]
    #[must_use]
    pub fn with_insert(mut self, allow: bool) -> Self {
        self.allow_insert = allow;
        self
    }

    /// With update allowed or not
    #[inline]
    #[must_use]
    pub fn with_update(mut self, allow: bool) -> Self {
        self.allow_update = allow;
        self
    }

    /// With save results distributed back into the form
    #[inline]
    #[must_use]
    pub fn with_apply_save_result(mut self, apply: bool) -> Self {
        self.apply_save_result = apply;
        self
    }

    /// With defaults for new records
    #[inline]
    #[must_use]
    pub fn with_insert_defaults(mut self, defaults: DataValue) -> Self {
        self.insert_defaults = defaults;
        self
    }

    /// With validation scope for Save
    #[inline]
    #[must_use]
    pub fn with_save_scope(mut self, scope: impl Into<String>) -> Self {
        self.save_scope = Some(scope.into());
        self
    }
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self {
            allow_insert: true,
            allow_update: true,
            apply_save_result: false,
            insert_defaults: DataValue::Null,
            busy_label: "Working".to_string(),
            save_scope: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = CrudConfig::from_toml_str(
            r#"
            allow_insert = false
            busy_label = "Saving person"

            [insert_defaults]
            Country = "NO"
            "#,
        )
        .unwrap();

        assert!(!config.allow_insert);
        assert!(config.allow_update);
        assert_eq!(config.busy_label, "Saving person");
        assert_eq!(config.insert_defaults, json!({"Country": "NO"}));
        assert_eq!(config.save_scope, None);
    }

    #[test]
    fn json_and_builders_agree() {
        let parsed =
            CrudConfig::from_json_str(r#"{"apply_save_result": true, "save_scope": "save"}"#)
                .unwrap();
        let built = CrudConfig::new()
            .with_apply_save_result(true)
            .with_save_scope("save");
        assert_eq!(parsed, built);
    }

    #[test]
    fn rejects_bad_documents() {
        assert!(matches!(
            CrudConfig::from_toml_str("allow_insert = \"maybe\""),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            CrudConfig::from_json_str("{"),
            Err(ConfigError::Json(_))
        ));
    }
}
