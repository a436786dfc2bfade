//! Grouping containers
//!
//! A [`Block`] binds the data members found beneath it (through any number
//! of wrappers) into one nested value, runs the validation cascade over
//! them and stores the resulting composite error for display.
//!
//! A block without a name still runs the validation cascade over its
//! members but has no key of its own in the parent value. Its named members
//! are bound directly into the enclosing value.

use crate::listener::{self, ChangeListener};
use formtree_binding::{validation, value, walker};
use formtree_node::{
    is_absent, is_reserved_name, ChangeEvent, Container, DataNode, DataValue, ErrorBatch,
    ErrorOrigin, Node, NodeId, NodeKind, RenderSignal, ValidationContext, ValidationError,
};

/// Cross-field hook
///
/// Receives the block's collected value and the batch of member errors,
/// and may append block-level errors to it.
pub type BlockHook =
    Box<dyn Fn(&DataValue, &ValidationContext, Option<&str>, &mut ErrorBatch) + Send>;

/// Grouping container
pub struct Block {
    id: NodeId,
    name: Option<String>,
    schema: Option<String>,
    title: String,
    children: Vec<Box<dyn Node>>,
    hooks: Vec<BlockHook>,
    listeners: Vec<ChangeListener>,
    error: Option<ValidationError>,
    render: RenderSignal,
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("children", &self.children)
            .field("hooks", &self.hooks.len())
            .field("listeners", &self.listeners.len())
            .field("error", &self.error)
            .finish()
    }
}

impl Block {
    /// Create new block bound to `name`
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut block = Self::unnamed();
        block.title = name.clone();
        block.name = Some(name);
        block
    }

    /// Create new block without a binding name
    #[must_use]
    pub fn unnamed() -> Self {
        Self {
            id: NodeId::new(),
            name: None,
            schema: None,
            title: String::new(),
            children: Vec::new(),
            hooks: Vec::new(),
            listeners: Vec::new(),
            error: None,
            render: RenderSignal::default(),
        }
    }

    /// Set caption
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set schema name stamped on composite errors
    #[inline]
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Add child
    #[inline]
    #[must_use]
    pub fn with_child(mut self, child: impl Node + 'static) -> Self {
        self.children.push(Box::new(child));
        self
    }

    /// Add cross-field hook
    #[must_use]
    pub fn with_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&DataValue, &ValidationContext, Option<&str>, &mut ErrorBatch) + Send + 'static,
    {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Add change listener
    #[must_use]
    pub fn with_listener(mut self, listener: ChangeListener) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Add boxed child
    pub fn push(&mut self, child: Box<dyn Node>) {
        self.children.push(child);
    }

    /// Add boxed hook
    pub fn push_hook(&mut self, hook: BlockHook) {
        self.hooks.push(hook);
    }

    /// Caption
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Schema name
    #[inline]
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// First data member named `name`
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&dyn DataNode> {
        walker::bound_members(self)
            .into_iter()
            .find(|member| member.name() == Some(name))
    }

    /// Ask the presentation layer to redraw this block
    #[inline]
    pub fn request_render(&mut self) {
        self.render.request();
    }

    fn listeners(block: &mut Self) -> &mut Vec<ChangeListener> {
        &mut block.listeners
    }
}

impl Node for Block {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Block
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

impl DataNode for Block {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn set_name(&mut self, name: Option<String>) {
        if name.as_deref().is_some_and(is_reserved_name) {
            tracing::warn!(name = name.as_deref(), "ignoring reserved block name");
            return;
        }
        self.name = name;
    }

    fn value(&self) -> DataValue {
        value::collect(self)
    }

    fn set_value(&mut self, value: DataValue) -> bool {
        let changed = value::apply(self, &value);
        if changed {
            self.render.request();
        }
        changed
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
        walker::members(self, true).iter().any(|member| member.is_dirty())
    }

    fn mark_clean(&mut self) {
        walker::for_each_member_mut(self, true, &mut |member| member.mark_clean());
    }

    fn on_value_changed(&mut self, event: &mut ChangeEvent) {
        listener::dispatch(self, Self::listeners, event);
    }
}

impl Container for Block {
    fn origin(&self) -> ErrorOrigin {
        ErrorOrigin {
            name: self.name.clone(),
            schema: self.schema.clone(),
            title: self.title.clone(),
        }
    }

    fn check(
        &self,
        value: &DataValue,
        ctx: &ValidationContext,
        scope: Option<&str>,
        batch: &mut ErrorBatch,
    ) {
        for hook in &self.hooks {
            hook(value, ctx, scope, batch);
        }
    }

    fn store_error(&mut self, error: Option<ValidationError>) {
        self.error = error;
        self.render.request();
    }
}

fn present<'a>(value: &DataValue, fields: &'a [String]) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|name| value.get(name.as_str()).is_some_and(|v| !is_absent(v)))
        .map(String::as_str)
        .collect()
}

/// Hook allowing at most one of `fields` to hold a value
#[must_use]
pub fn exclusive(title: impl Into<String>, fields: Vec<String>, message: Option<String>) -> BlockHook {
    let title = title.into();
    Box::new(
        move |value: &DataValue, _: &ValidationContext, scope: Option<&str>, batch: &mut ErrorBatch| {
        let set = present(value, &fields);
        if set.len() > 1 {
            let message = message
                .clone()
                .unwrap_or_else(|| format!("only one of {} may be set", fields.join(", ")));
            let field = set.last().map(|name| (*name).to_string());
            batch.push(ValidationError::cross_field(field, &title, message).with_scope(scope));
        }
    })
}

/// Hook requiring at least one of `fields` to hold a value
#[must_use]
pub fn require_one(title: impl Into<String>, fields: Vec<String>, message: Option<String>) -> BlockHook {
    let title = title.into();
    Box::new(
        move |value: &DataValue, _: &ValidationContext, scope: Option<&str>, batch: &mut ErrorBatch| {
        if present(value, &fields).is_empty() {
            let message = message
                .clone()
                .unwrap_or_else(|| format!("one of {} is required", fields.join(", ")));
            batch.push(
                ValidationError::cross_field(fields.first().cloned(), &title, message)
                    .with_scope(scope),
            );
        }
    })
}
