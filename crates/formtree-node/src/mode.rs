//! Form data mode and the reserved mode tag

use crate::value::DataValue;
use serde::{Deserialize, Serialize};

/// Reserved key under which a form attaches its mode to collected values
pub const MODE_TAG: &str = "$mode";

/// Edit mode owned by a form
///
/// `Unspecified` is the read/view state; the other two denote an open edit
/// session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    /// View mode, no edit session
    #[default]
    Unspecified,

    /// Creating a new record
    Insert,

    /// Updating an existing record
    Update,
}

impl DataMode {
    /// Check if an edit session is open
    #[inline]
    #[must_use]
    pub fn is_editing(self) -> bool {
        !matches!(self, Self::Unspecified)
    }

    /// Tag string written under [`MODE_TAG`]
    #[inline]
    #[must_use]
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::Insert => "insert",
            Self::Update => "update",
        }
    }

    /// Parse a tag string; unknown tags read as `Unspecified`
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "insert" => Self::Insert,
            "update" => Self::Update,
            _ => Self::Unspecified,
        }
    }

    /// Read the mode a value was collected under
    #[must_use]
    pub fn of(value: &DataValue) -> Self {
        value
            .get(MODE_TAG)
            .and_then(DataValue::as_str)
            .map_or(Self::Unspecified, Self::from_tag)
    }
}

impl std::fmt::Display for DataMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Attach the mode tag to an object value
///
/// Nothing is attached for `Unspecified` or for non-object values.
#[must_use]
pub fn tag(mut value: DataValue, mode: DataMode) -> DataValue {
    if !mode.is_editing() {
        return value;
    }
    if let DataValue::Object(map) = &mut value {
        map.insert(MODE_TAG.to_string(), DataValue::String(mode.as_tag().to_string()));
    }
    value
}

/// Remove the mode tag, if present
#[must_use]
pub fn strip_tag(mut value: DataValue) -> DataValue {
    if let DataValue::Object(map) = &mut value {
        map.shift_remove(MODE_TAG);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_is_view() {
        assert_eq!(DataMode::default(), DataMode::Unspecified);
        assert!(!DataMode::Unspecified.is_editing());
        assert!(DataMode::Insert.is_editing());
        assert!(DataMode::Update.is_editing());
    }

    #[test]
    fn tag_roundtrip() {
        for mode in [DataMode::Insert, DataMode::Update] {
            let tagged = tag(json!({"a": 1}), mode);
            assert_eq!(DataMode::of(&tagged), mode);
            assert_eq!(strip_tag(tagged), json!({"a": 1}));
        }
    }

    #[test]
    fn view_mode_is_never_tagged() {
        let tagged = tag(json!({"a": 1}), DataMode::Unspecified);
        assert!(tagged.get(MODE_TAG).is_none());
        assert_eq!(DataMode::of(&tagged), DataMode::Unspecified);
    }

    #[test]
    fn non_objects_are_left_alone() {
        assert_eq!(tag(json!([1, 2]), DataMode::Insert), json!([1, 2]));
        assert_eq!(strip_tag(json!("x")), json!("x"));
    }

    #[test]
    fn tag_goes_last() {
        let tagged = tag(json!({"b": 1, "a": 2}), DataMode::Update);
        let keys: Vec<_> = tagged.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a", MODE_TAG]);
    }
}
