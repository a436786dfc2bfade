//! Validation errors
//!
//! A [`ValidationError`] is a tree: leaf errors come from fields or from a
//! container's cross-field hook, composite errors wrap every error found in
//! one container. A composite with no causes is never built.

use serde::{Deserialize, Serialize};

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Field-level rule failure (required, range, type, ...)
    Field,

    /// Container-level rule spanning several fields
    CrossField,

    /// Batch wrapping all errors of one container
    Composite,

    /// A validator failed unexpectedly; reported like a field error
    Unexpected,
}

/// Validation error with nested causes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{title}: {message}")]
pub struct ValidationError {
    /// Error classification
    pub kind: ErrorKind,

    /// Schema of the node that produced the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_schema: Option<String>,

    /// Binding name of the node that produced the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,

    /// Validation scope the error was found under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Short caption (usually the field label)
    pub title: String,

    /// Human-readable description
    pub message: String,

    /// Nested errors (composite errors only, plus appended cross-field errors)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<ValidationError>,
}

impl ValidationError {
    fn leaf(kind: ErrorKind, field_name: Option<String>, title: String, message: String) -> Self {
        Self {
            kind,
            source_schema: None,
            field_name,
            scope: None,
            title,
            message,
            causes: Vec::new(),
        }
    }

    /// Create field-level error
    #[must_use]
    pub fn field(
        field_name: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::leaf(
            ErrorKind::Field,
            Some(field_name.into()),
            title.into(),
            message.into(),
        )
    }

    /// Create cross-field error
    ///
    /// `field_name` names the field the message should be shown next to, if any.
    #[must_use]
    pub fn cross_field(
        field_name: Option<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::leaf(ErrorKind::CrossField, field_name, title.into(), message.into())
    }

    /// Create error for a validator that failed unexpectedly
    #[must_use]
    pub fn unexpected(field_name: Option<String>, source: &anyhow::Error) -> Self {
        let title = field_name.clone().unwrap_or_else(|| "validation".to_string());
        Self::leaf(
            ErrorKind::Unexpected,
            field_name,
            title,
            format!("validator failed: {source:#}"),
        )
    }

    /// Wrap a non-empty batch as one composite error
    ///
    /// Returns `None` for an empty batch: a composite without causes means
    /// "valid" and is never surfaced.
    #[must_use]
    pub fn composite(origin: &crate::ErrorOrigin, causes: Vec<ValidationError>) -> Option<Self> {
        if causes.is_empty() {
            return None;
        }
        let count = causes.len();
        Some(Self {
            kind: ErrorKind::Composite,
            source_schema: origin.schema.clone(),
            field_name: origin.name.clone(),
            scope: None,
            title: origin.title.clone(),
            message: if count == 1 {
                "1 error".to_string()
            } else {
                format!("{count} errors")
            },
            causes,
        })
    }

    /// Set scope
    #[inline]
    #[must_use]
    pub fn with_scope(mut self, scope: Option<&str>) -> Self {
        self.scope = scope.map(str::to_string);
        self
    }

    /// Set source schema
    #[inline]
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.source_schema = Some(schema.into());
        self
    }

    /// Check if this is a composite error
    #[inline]
    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self.kind, ErrorKind::Composite)
    }

    /// Leaf errors in display order (depth-first, causes in order)
    #[must_use]
    pub fn flatten(&self) -> Vec<&ValidationError> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into<'a>(&'a self, out: &mut Vec<&'a ValidationError>) {
        if self.is_composite() {
            for cause in &self.causes {
                cause.flatten_into(out);
            }
        } else {
            out.push(self);
        }
    }

    /// Number of field-level errors (unexpected failures count as field errors)
    #[must_use]
    pub fn field_errors(&self) -> usize {
        self.flatten()
            .iter()
            .filter(|e| matches!(e.kind, ErrorKind::Field | ErrorKind::Unexpected))
            .count()
    }

    /// Find first leaf error bound to `field_name`
    #[must_use]
    pub fn find(&self, field_name: &str) -> Option<&ValidationError> {
        self.flatten()
            .into_iter()
            .find(|e| e.field_name.as_deref() == Some(field_name))
    }
}

/// Mutable error collector handed to cross-field hooks
///
/// Holds the child errors found so far in traversal order. Hooks inspect it
/// and append container-level errors; order is always push order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBatch {
    errors: Vec<ValidationError>,
}

impl ErrorBatch {
    /// Create empty batch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append error
    #[inline]
    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Number of collected errors
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Check if batch is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate collected errors
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// Check if any collected error (at any depth) is bound to `field_name`
    #[must_use]
    pub fn has_error_for(&self, field_name: &str) -> bool {
        self.errors.iter().any(|e| {
            e.field_name.as_deref() == Some(field_name) || e.find(field_name).is_some()
        })
    }

    /// Consume into the underlying list
    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl From<Vec<ValidationError>> for ErrorBatch {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}
