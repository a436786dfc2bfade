//! Validation cascade
//!
//! Validation always covers the full subtree: every member is validated
//! even after the first failure, so every invalid field can be shown at
//! once. Errors never escape as panics or `Err`; they are returned as data.
//!
//! # Modes
//! - `apply = true`: the result is stored on the container (and on each
//!   member by the member itself) and a re-render is requested
//! - `apply = false`: dry run, nothing stored and nothing re-rendered

use crate::value;
use crate::walker;
use formtree_node::{Container, ErrorBatch, ValidationContext, ValidationError};

/// Validate `container` and its data members
///
/// 1. Each member validates itself (containers recurse through their own
///    cascade); unexpected failures become errors of kind `Unexpected`.
/// 2. Non-empty results are batched in traversal order.
/// 3. The container's cross-field hook may inspect and extend the batch.
/// 4. An empty batch means valid: with `apply`, the stored error is cleared.
/// 5. Otherwise the batch is wrapped in one composite error tagged with the
///    container's identity and scope; with `apply`, it is stored.
pub fn validate<C: Container>(
    container: &mut C,
    ctx: &ValidationContext,
    scope: Option<&str>,
    apply: bool,
) -> Option<ValidationError> {
    let mut batch = ErrorBatch::new();

    walker::for_each_member_mut(container, true, &mut |member| {
        match member.validate(ctx, scope, apply) {
            Ok(Some(error)) => batch.push(error),
            Ok(None) => {}
            Err(source) => {
                let name = member.name().map(str::to_string);
                tracing::warn!(
                    field = name.as_deref().unwrap_or("<unnamed>"),
                    error = %source,
                    "validator failed unexpectedly"
                );
                batch.push(ValidationError::unexpected(name, &source).with_scope(scope));
            }
        }
    });

    let collected = value::collect(&*container);
    container.check(&collected, ctx, scope, &mut batch);

    let origin = container.origin();
    let count = batch.len();
    let result = ValidationError::composite(&origin, batch.into_vec())
        .map(|error| error.with_scope(scope));

    tracing::debug!(
        container = %origin.title,
        errors = count,
        apply,
        "validated container"
    );

    if apply {
        container.store_error(result.clone());
    }
    result
}

/// Check validity without touching stored errors
#[must_use]
pub fn is_valid<C: Container>(container: &mut C, ctx: &ValidationContext, scope: Option<&str>) -> bool {
    validate(container, ctx, scope, false).is_none()
}

/// Drop every stored error in the subtree without validating
pub fn clear<C: Container>(container: &mut C) {
    walker::for_each_member_mut(container, true, &mut |member| member.clear_errors());
    container.store_error(None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{failing_leaf, group, group_with, leaf, required_leaf, Group};
    use formtree_node::{DataNode, ErrorKind, Node};

    fn ctx() -> ValidationContext {
        ValidationContext::default()
    }

    fn person(first: &str, last: &str) -> Group {
        Group::new(
            "person",
            vec![required_leaf("FirstName", first), required_leaf("LastName", last)],
        )
    }

    #[test]
    fn valid_tree_returns_none() {
        let mut root = person("Ada", "Lovelace");
        assert!(validate(&mut root, &ctx(), None, true).is_none());
        assert!(root.error().is_none());
    }

    #[test]
    fn one_missing_field_gives_one_cause() {
        let mut root = person("", "Doe");
        let error = validate(&mut root, &ctx(), None, true).unwrap();

        assert!(error.is_composite());
        assert_eq!(error.causes.len(), 1);
        assert_eq!(error.causes[0].field_name.as_deref(), Some("FirstName"));
        assert_eq!(root.error(), Some(&error));
    }

    #[test]
    fn no_short_circuit() {
        let mut root = Group::new(
            "root",
            vec![
                required_leaf("a", ""),
                required_leaf("b", "ok"),
                required_leaf("c", ""),
                group("inner", vec![required_leaf("d", ""), required_leaf("e", "")]),
            ],
        );
        let error = validate(&mut root, &ctx(), None, true).unwrap();
        assert_eq!(error.field_errors(), 4);
    }

    #[test]
    fn dry_run_leaves_state_alone() {
        let mut root = person("", "");
        let epoch = root.render_epoch();

        let error = validate(&mut root, &ctx(), None, false);
        assert!(error.is_some());
        assert!(root.error().is_none());
        assert_eq!(root.render_epoch(), epoch);
        for member in walker::members(&root, true) {
            assert!(member.error().is_none());
        }
    }

    #[test]
    fn apply_then_clear_on_success() {
        let mut root = person("", "Doe");
        validate(&mut root, &ctx(), None, true);
        assert!(root.error().is_some());

        root.children_mut()[0]
            .as_data_mut()
            .unwrap()
            .set_value(serde_json::json!("Jane"));
        assert!(validate(&mut root, &ctx(), None, true).is_none());
        assert!(root.error().is_none());
    }

    #[test]
    fn unexpected_failure_becomes_error() {
        let mut root = Group::new("root", vec![failing_leaf("boom"), required_leaf("ok", "1")]);
        let error = validate(&mut root, &ctx(), None, true).unwrap();
        assert_eq!(error.causes.len(), 1);
        assert_eq!(error.causes[0].kind, ErrorKind::Unexpected);

        // dry runs report it too
        assert!(validate(&mut root, &ctx(), None, false).is_some());
    }

    #[test]
    fn hook_sees_child_errors_and_appends_after_them() {
        let mut root = group_with(
            "root",
            vec![required_leaf("a", ""), leaf("b", "x"), leaf("c", "x")],
            |value, batch| {
                assert!(batch.has_error_for("a"));
                if value["b"] == value["c"] {
                    batch.push(ValidationError::cross_field(
                        Some("c".to_string()),
                        "Root",
                        "b and c must differ",
                    ));
                }
            },
        );

        let error = validate(&mut root, &ctx(), None, true).unwrap();
        let kinds: Vec<_> = error.causes.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ErrorKind::Field, ErrorKind::CrossField]);

        // same order every time
        let again = validate(&mut root, &ctx(), None, true).unwrap();
        assert_eq!(again, error);
    }

    #[test]
    fn scope_is_stamped() {
        let mut root = person("", "x");
        let error = validate(&mut root, &ctx(), Some("submit"), true).unwrap();
        assert_eq!(error.scope.as_deref(), Some("submit"));
    }

    #[test]
    fn clear_drops_every_error() {
        let mut root = person("", "");
        validate(&mut root, &ctx(), None, true);
        clear(&mut root);
        assert!(root.error().is_none());
        for member in walker::members(&root, true) {
            assert!(member.error().is_none());
        }
    }

    #[test]
    fn is_valid_is_dry() {
        let mut root = person("", "");
        assert!(!is_valid(&mut root, &ctx(), None));
        assert!(root.error().is_none());
    }
}
