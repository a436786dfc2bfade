//! Minimal node implementations for unit tests

use crate::{validation, value};
use formtree_node::{
    is_absent, ChangeEvent, Container, DataNode, DataValue, ErrorBatch, ErrorOrigin, Node,
    NodeId, NodeKind, RenderSignal, ValidationContext, ValidationError,
};
use std::sync::{Arc, Mutex};

/// Shared record of received notifications
#[derive(Debug, Clone, Default)]
pub(crate) struct Log(Arc<Mutex<Vec<(String, DataValue)>>>);

impl Log {
    fn record(&self, name: &str, value: DataValue) {
        self.0.lock().unwrap().push((name.to_string(), value));
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }

    pub(crate) fn values(&self) -> Vec<DataValue> {
        self.0.lock().unwrap().iter().map(|(_, v)| v.clone()).collect()
    }
}

#[derive(Debug, Clone)]
struct Listener {
    log: Log,
    cancel: bool,
}

impl Listener {
    fn notify(&self, event: &mut ChangeEvent) {
        let name = event.detail.name.clone().unwrap_or_default();
        self.log.record(&name, event.detail.value.clone());
        if self.cancel {
            event.cancel();
        }
    }
}

#[derive(Debug)]
pub(crate) struct Wrapper {
    id: NodeId,
    children: Vec<Box<dyn Node>>,
}

impl Node for Wrapper {
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
pub(crate) struct Leaf {
    id: NodeId,
    name: Option<String>,
    value: DataValue,
    baseline: DataValue,
    required: bool,
    failing: bool,
    error: Option<ValidationError>,
    render: RenderSignal,
    listener: Option<Listener>,
}

impl Leaf {
    fn new(name: Option<&str>, value: &str) -> Self {
        let value = DataValue::String(value.to_string());
        Self {
            id: NodeId::new(),
            name: name.map(str::to_string),
            baseline: value.clone(),
            value,
            required: false,
            failing: false,
            error: None,
            render: RenderSignal::default(),
            listener: None,
        }
    }
}

impl Node for Leaf {
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

    fn render_epoch(&self) -> u64 {
        self.render.epoch()
    }
}

impl DataNode for Leaf {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    fn value(&self) -> DataValue {
        self.value.clone()
    }

    fn set_value(&mut self, value: DataValue) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        true
    }

    fn validate(
        &mut self,
        _ctx: &ValidationContext,
        scope: Option<&str>,
        apply: bool,
    ) -> anyhow::Result<Option<ValidationError>> {
        if self.failing {
            anyhow::bail!("validator exploded");
        }
        let name = self.name.clone().unwrap_or_default();
        let error = (self.required && is_absent(&self.value))
            .then(|| ValidationError::field(&name, &name, "is required").with_scope(scope));
        if apply {
            self.error = error.clone();
            self.render.request();
        }
        Ok(error)
    }

    fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    fn clear_errors(&mut self) {
        self.error = None;
    }

    fn is_dirty(&self) -> bool {
        self.value != self.baseline
    }

    fn mark_clean(&mut self) {
        self.baseline = self.value.clone();
    }

    fn on_value_changed(&mut self, event: &mut ChangeEvent) {
        if let Some(listener) = &self.listener {
            listener.notify(event);
        }
    }
}

type Hook = Box<dyn Fn(&DataValue, &mut ErrorBatch) + Send>;

pub(crate) struct Group {
    id: NodeId,
    kind: NodeKind,
    name: Option<String>,
    children: Vec<Box<dyn Node>>,
    baseline: DataValue,
    error: Option<ValidationError>,
    render: RenderSignal,
    hook: Option<Hook>,
    listener: Option<Listener>,
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

impl Group {
    pub(crate) fn new(name: &str, children: Vec<Box<dyn Node>>) -> Self {
        let mut group = Self {
            id: NodeId::new(),
            kind: NodeKind::Block,
            name: Some(name.to_string()),
            children,
            baseline: DataValue::Null,
            error: None,
            render: RenderSignal::default(),
            hook: None,
            listener: None,
        };
        group.baseline = value::collect(&group);
        group
    }
}

impl Node for Group {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> NodeKind {
        self.kind
    }

    fn children(&self) -> &[Box<dyn Node>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Node>] {
        &mut self.children
    }

    fn as_data(&self) -> Option<&dyn DataNode> {
        Some(self)
    }

    fn as_data_mut(&mut self) -> Option<&mut dyn DataNode> {
        Some(self)
    }

    fn render_epoch(&self) -> u64 {
        self.render.epoch()
    }
}

impl DataNode for Group {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    fn value(&self) -> DataValue {
        value::collect(self)
    }

    fn set_value(&mut self, value: DataValue) -> bool {
        value::apply(self, &value)
    }

    fn validate(
        &mut self,
        ctx: &ValidationContext,
        scope: Option<&str>,
        apply: bool,
    ) -> anyhow::Result<Option<ValidationError>> {
        Ok(validation::validate(self, ctx, scope, apply))
    }

    fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    fn clear_errors(&mut self) {
        validation::clear(self);
    }

    fn is_dirty(&self) -> bool {
        self.value() != self.baseline
    }

    fn mark_clean(&mut self) {
        self.baseline = self.value();
    }

    fn on_value_changed(&mut self, event: &mut ChangeEvent) {
        if let Some(listener) = &self.listener {
            listener.notify(event);
        }
    }
}

impl Container for Group {
    fn origin(&self) -> ErrorOrigin {
        ErrorOrigin {
            name: self.name.clone(),
            schema: None,
            title: self.name.clone().unwrap_or_default(),
        }
    }

    fn check(
        &self,
        value: &DataValue,
        _ctx: &ValidationContext,
        _scope: Option<&str>,
        batch: &mut ErrorBatch,
    ) {
        if let Some(hook) = &self.hook {
            hook(value, batch);
        }
    }

    fn store_error(&mut self, error: Option<ValidationError>) {
        self.error = error;
        self.render.request();
    }
}

pub(crate) fn wrap(children: Vec<Box<dyn Node>>) -> Box<dyn Node> {
    Box::new(Wrapper {
        id: NodeId::new(),
        children,
    })
}

pub(crate) fn leaf(name: &str, value: &str) -> Box<dyn Node> {
    Box::new(Leaf::new(Some(name), value))
}

pub(crate) fn unnamed_leaf(value: &str) -> Box<dyn Node> {
    Box::new(Leaf::new(None, value))
}

pub(crate) fn required_leaf(name: &str, value: &str) -> Box<dyn Node> {
    let mut leaf = Leaf::new(Some(name), value);
    leaf.required = true;
    Box::new(leaf)
}

pub(crate) fn failing_leaf(name: &str) -> Box<dyn Node> {
    let mut leaf = Leaf::new(Some(name), "");
    leaf.failing = true;
    Box::new(leaf)
}

pub(crate) fn listening_leaf(name: &str, value: &str, log: &Log, cancel: bool) -> Box<dyn Node> {
    let mut leaf = Leaf::new(Some(name), value);
    leaf.listener = Some(Listener {
        log: log.clone(),
        cancel,
    });
    Box::new(leaf)
}

pub(crate) fn group(name: &str, children: Vec<Box<dyn Node>>) -> Box<dyn Node> {
    Box::new(Group::new(name, children))
}

pub(crate) fn unnamed_group(children: Vec<Box<dyn Node>>) -> Box<dyn Node> {
    let mut group = Group::new("", children);
    group.name = None;
    Box::new(group)
}

pub(crate) fn group_with(
    name: &str,
    children: Vec<Box<dyn Node>>,
    hook: impl Fn(&DataValue, &mut ErrorBatch) + Send + 'static,
) -> Group {
    let mut group = Group::new(name, children);
    group.hook = Some(Box::new(hook));
    group
}

pub(crate) fn listening_group(
    name: &str,
    children: Vec<Box<dyn Node>>,
    log: &Log,
    cancel: bool,
) -> Box<dyn Node> {
    let mut group = Group::new(name, children);
    group.listener = Some(Listener {
        log: log.clone(),
        cancel,
    });
    Box::new(group)
}

pub(crate) fn form(name: &str, children: Vec<Box<dyn Node>>) -> Box<dyn Node> {
    let mut group = Group::new(name, children);
    group.kind = NodeKind::Form;
    Box::new(group)
}
