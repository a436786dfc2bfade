use formtree_binding::{value, walker};
use formtree_node::{
    DataNode, DataValue, Node, NodeId, NodeKind, ValidationContext, ValidationError,
};
use proptest::prelude::*;

#[derive(Debug)]
struct Shell {
    id: NodeId,
    children: Vec<Box<dyn Node>>,
}

impl Node for Shell {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Wrapper
    }

    fn children(&self) -> &[Box<dyn Node>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Node>] {
        &mut self.children
    }
}

#[derive(Debug)]
struct Cell {
    id: NodeId,
    name: String,
    value: DataValue,
}

impl Node for Cell {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Field
    }

    fn as_data(&self) -> Option<&dyn DataNode> {
        Some(self)
    }

    fn as_data_mut(&mut self) -> Option<&mut dyn DataNode> {
        Some(self)
    }
}

impl DataNode for Cell {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn set_name(&mut self, name: Option<String>) {
        if let Some(name) = name {
            self.name = name;
        }
    }

    fn value(&self) -> DataValue {
        self.value.clone()
    }

    fn set_value(&mut self, value: DataValue) -> bool {
        let changed = self.value != value;
        self.value = value;
        changed
    }

    fn validate(
        &mut self,
        _ctx: &ValidationContext,
        _scope: Option<&str>,
        _apply: bool,
    ) -> anyhow::Result<Option<ValidationError>> {
        Ok(None)
    }

    fn error(&self) -> Option<&ValidationError> {
        None
    }

    fn clear_errors(&mut self) {}

    fn is_dirty(&self) -> bool {
        false
    }

    fn mark_clean(&mut self) {}
}

#[derive(Debug, Clone)]
enum Shape {
    Leaf(u8),
    Shell(Vec<Shape>),
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = (0u8..6).prop_map(Shape::Leaf);
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Shape::Shell)
    })
}

fn build(shape: &Shape, next: &mut i64) -> Box<dyn Node> {
    match shape {
        Shape::Leaf(n) => {
            *next += 1;
            Box::new(Cell {
                id: NodeId::new(),
                name: format!("f{n}"),
                value: DataValue::from(*next),
            })
        }
        Shape::Shell(children) => Box::new(Shell {
            id: NodeId::new(),
            children: children.iter().map(|child| build(child, next)).collect(),
        }),
    }
}

fn leaf_names(shape: &Shape, out: &mut Vec<String>) {
    match shape {
        Shape::Leaf(n) => out.push(format!("f{n}")),
        Shape::Shell(children) => {
            for child in children {
                leaf_names(child, out);
            }
        }
    }
}

fn root_of(shapes: &[Shape]) -> Box<dyn Node> {
    build(&Shape::Shell(shapes.to_vec()), &mut 0)
}

proptest! {
    #[test]
    fn prop_members_follow_document_order(shapes in prop::collection::vec(shape(), 0..5)) {
        let root = root_of(&shapes);
        let mut expected = Vec::new();
        for shape in &shapes {
            leaf_names(shape, &mut expected);
        }

        let names: Vec<String> = walker::members(root.as_ref(), true)
            .iter()
            .filter_map(|member| member.name().map(str::to_string))
            .collect();
        prop_assert_eq!(names, expected);
    }

    #[test]
    fn prop_every_member_is_locatable(shapes in prop::collection::vec(shape(), 0..5)) {
        let root = root_of(&shapes);
        for member in walker::members(root.as_ref(), true) {
            let path = walker::locate(root.as_ref(), member.id());
            prop_assert!(path.is_some());
            let path = path.unwrap_or_default();
            let found = walker::node_at(root.as_ref(), path.indices()).map(|node| node.id());
            prop_assert_eq!(found, Some(member.id()));
            prop_assert!(walker::data_ancestors(root.as_ref(), &path).is_empty());
        }
    }

    #[test]
    fn prop_apply_of_collect_changes_nothing(shapes in prop::collection::vec(shape(), 0..5)) {
        let mut root = root_of(&shapes);
        let collected = value::collect(root.as_ref());
        prop_assert!(!value::apply(root.as_mut(), &collected));
        prop_assert_eq!(value::collect(root.as_ref()), collected);
    }
}
