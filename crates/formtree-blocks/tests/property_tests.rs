use formtree_binding::{validation, value, walker};
use formtree_blocks::{Block, Field, Form, Wrapper};
use formtree_node::{DataNode, DataValue, Node, ValidationContext};
use proptest::prelude::*;
use serde_json::{json, Map};

/// Wrap `node` in `depth` layers of transparent wrappers
fn wrapped(node: Field, depth: usize) -> Box<dyn Node> {
    let mut boxed: Box<dyn Node> = Box::new(node);
    for _ in 0..depth {
        let mut wrapper = Wrapper::new();
        wrapper.push(boxed);
        boxed = Box::new(wrapper);
    }
    boxed
}

fn form_of(fields: Vec<Box<dyn Node>>) -> Form {
    let mut block = Block::unnamed();
    for field in fields {
        block.push(field);
    }
    Form::from_block(block)
}

fn leaf_value() -> impl Strategy<Value = DataValue> {
    prop_oneof![
        Just(DataValue::Null),
        "[a-zA-Z0-9 ]{0,8}".prop_map(DataValue::from),
        any::<i32>().prop_map(DataValue::from),
        any::<bool>().prop_map(DataValue::from),
    ]
}

proptest! {
    #[test]
    fn prop_roundtrip_is_idempotent(
        values in prop::collection::vec(leaf_value(), 1..8),
        depths in prop::collection::vec(0usize..3, 8),
    ) {
        let fields = (0..values.len())
            .map(|i| wrapped(Field::new(format!("f{i}")), depths[i]))
            .collect();
        let mut form = form_of(fields);

        let mut input = Map::new();
        for (i, v) in values.iter().enumerate() {
            input.insert(format!("f{i}"), v.clone());
        }
        let input = DataValue::Object(input);

        form.set_value(input.clone());
        prop_assert_eq!(form.value(), input.clone());
        prop_assert!(!form.set_value(input));
    }

    #[test]
    fn prop_same_name_siblings_roundtrip(
        values in prop::collection::vec("[a-z]{1,4}", 1..6),
    ) {
        let fields = (0..values.len())
            .map(|i| wrapped(Field::new("Status"), i % 2))
            .collect();
        let mut form = form_of(fields);
        let input = json!({ "Status": values });

        form.set_value(input.clone());
        prop_assert_eq!(form.value(), input);
    }

    #[test]
    fn prop_wrappers_are_transparent(
        filled in prop::collection::vec(any::<bool>(), 1..8),
        depths in prop::collection::vec(0usize..4, 8),
    ) {
        let build = |wrap: bool| {
            let fields = filled
                .iter()
                .enumerate()
                .map(|(i, &f)| {
                    let field = Field::new(format!("f{i}"))
                        .required()
                        .with_value(if f { "x" } else { "" });
                    wrapped(field, if wrap { depths[i] } else { 0 })
                })
                .collect();
            form_of(fields)
        };
        let mut flat = build(false);
        let mut deep = build(true);
        let ctx = ValidationContext::default();

        prop_assert_eq!(value::collect(&flat), value::collect(&deep));
        prop_assert_eq!(
            validation::validate(&mut flat, &ctx, None, false),
            validation::validate(&mut deep, &ctx, None, false)
        );
    }

    #[test]
    fn prop_validation_is_complete(
        filled in prop::collection::vec(any::<bool>(), 1..12),
    ) {
        let fields = filled
            .iter()
            .enumerate()
            .map(|(i, &f)| {
                let field = Field::new(format!("f{i}"))
                    .required()
                    .with_value(if f { "x" } else { "" });
                wrapped(field, i % 3)
            })
            .collect();
        let mut form = form_of(fields);
        let invalid = filled.iter().filter(|f| !**f).count();

        let result = validation::validate(&mut form, &ValidationContext::default(), None, true);
        match result {
            None => prop_assert_eq!(invalid, 0),
            Some(error) => {
                prop_assert_eq!(error.field_errors(), invalid);
                prop_assert_eq!(error.causes.len(), invalid);
            }
        }
    }

    #[test]
    fn prop_dry_run_never_mutates(
        filled in prop::collection::vec(any::<bool>(), 1..8),
    ) {
        let fields = filled
            .iter()
            .enumerate()
            .map(|(i, &f)| {
                let field = Field::new(format!("f{i}"))
                    .required()
                    .with_value(if f { "x" } else { "" });
                wrapped(field, i % 2)
            })
            .collect();
        let mut form = form_of(fields);
        let epochs: Vec<u64> = walker::descendants(&form).iter().map(|n| n.render_epoch()).collect();

        validation::validate(&mut form, &ValidationContext::default(), None, false);

        let after: Vec<u64> = walker::descendants(&form).iter().map(|n| n.render_epoch()).collect();
        prop_assert_eq!(epochs, after);
        prop_assert!(form.error().is_none());
        for member in walker::members(&form, true) {
            prop_assert!(member.error().is_none());
        }
    }
}
