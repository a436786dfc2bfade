//! Data value tree

/// Nested, JSON-like value produced by collect and consumed by apply.
///
/// Objects keep insertion order (`serde_json` is built with
/// `preserve_order`), so collected documents are deterministic.
/// [`serde_json::Value::Null`] stands for an absent value.
pub type DataValue = serde_json::Value;

/// Check whether a value counts as "nothing entered"
///
/// Null, empty strings (after trimming), empty arrays and empty objects are
/// all absent for the purpose of `Required` checks.
#[must_use]
pub fn is_absent(value: &DataValue) -> bool {
    match value {
        DataValue::Null => true,
        DataValue::String(s) => s.trim().is_empty(),
        DataValue::Array(items) => items.is_empty(),
        DataValue::Object(map) => map.is_empty(),
        DataValue::Bool(_) | DataValue::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_values() {
        assert!(is_absent(&json!(null)));
        assert!(is_absent(&json!("   ")));
        assert!(is_absent(&json!([])));
        assert!(is_absent(&json!({})));
    }

    #[test]
    fn present_values() {
        assert!(!is_absent(&json!(false)));
        assert!(!is_absent(&json!(0)));
        assert!(!is_absent(&json!("x")));
        assert!(!is_absent(&json!([null])));
    }
}
