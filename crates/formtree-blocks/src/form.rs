//! Forms
//!
//! A [`Form`] is a [`Block`] that owns a [`DataMode`]. While an edit
//! session is open its collected value carries the reserved mode tag, so a
//! save handler can tell create from update without extra parameters.

use crate::block::{Block, BlockHook};
use crate::listener::ChangeListener;
use formtree_binding::validation;
use formtree_node::{
    strip_tag, tag, ChangeEvent, Container, DataMode, DataNode, DataValue, ErrorBatch,
    ErrorOrigin, Node, NodeId, NodeKind, ValidationContext, ValidationError,
};

/// Mode-owning block
#[derive(Debug)]
pub struct Form {
    block: Block,
    mode: DataMode,
}

impl Form {
    /// Create new form without a binding name
    #[must_use]
    pub fn new() -> Self {
        Self::from_block(Block::unnamed())
    }

    /// Create form around an existing block
    #[inline]
    #[must_use]
    pub fn from_block(block: Block) -> Self {
        Self {
            block,
            mode: DataMode::Unspecified,
        }
    }

    /// Set caption
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.block = self.block.with_title(title);
        self
    }

    /// Set schema name
    #[inline]
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.block = self.block.with_schema(schema);
        self
    }

    /// Add child
    #[inline]
    #[must_use]
    pub fn with_child(mut self, child: impl Node + 'static) -> Self {
        self.block.push(Box::new(child));
        self
    }

    /// Add cross-field hook
    #[must_use]
    pub fn with_hook(mut self, hook: BlockHook) -> Self {
        self.block.push_hook(hook);
        self
    }

    /// Add change listener
    #[must_use]
    pub fn with_listener(mut self, listener: ChangeListener) -> Self {
        self.block = self.block.with_listener(listener);
        self
    }

    /// Current mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> DataMode {
        self.mode
    }

    /// Change mode; returns `true` iff it changed
    ///
    /// The only way the mode ever changes: children cannot reach it.
    pub fn set_mode(&mut self, mode: DataMode) -> bool {
        if self.mode == mode {
            return false;
        }
        tracing::debug!(from = %self.mode, to = %mode, "form mode changed");
        self.mode = mode;
        self.block.request_render();
        true
    }

    /// Collected value without the mode tag
    #[must_use]
    pub fn untagged_value(&self) -> DataValue {
        self.block.value()
    }

    /// Underlying block
    #[inline]
    #[must_use]
    pub fn block(&self) -> &Block {
        &self.block
    }

    /// First data member named `name`
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&dyn DataNode> {
        self.block.member(name)
    }
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Block> for Form {
    fn from(block: Block) -> Self {
        Self::from_block(block)
    }
}

impl Node for Form {
    fn id(&self) -> NodeId {
        self.block.id()
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Form
    }

    fn children(&self) -> &[Box<dyn Node>] {
        self.block.children()
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Node>] {
        self.block.children_mut()
    }

    fn as_data(&self) -> Option<&dyn DataNode> {
        Some(self)
    }

    fn as_data_mut(&mut self) -> Option<&mut dyn DataNode> {
        Some(self)
    }

    fn render_epoch(&self) -> u64 {
        self.block.render_epoch()
    }
}

impl DataNode for Form {
    fn name(&self) -> Option<&str> {
        self.block.name()
    }

    fn set_name(&mut self, name: Option<String>) {
        self.block.set_name(name);
    }

    fn value(&self) -> DataValue {
        tag(self.block.value(), self.mode)
    }

    fn set_value(&mut self, value: DataValue) -> bool {
        self.block.set_value(strip_tag(value))
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
        self.block.error()
    }

    fn clear_errors(&mut self) {
        self.block.clear_errors();
    }

    fn is_dirty(&self) -> bool {
        self.block.is_dirty()
    }

    fn mark_clean(&mut self) {
        self.block.mark_clean();
    }

    fn on_value_changed(&mut self, event: &mut ChangeEvent) {
        self.block.on_value_changed(event);
    }
}

impl Container for Form {
    fn origin(&self) -> ErrorOrigin {
        self.block.origin()
    }

    fn check(
        &self,
        value: &DataValue,
        ctx: &ValidationContext,
        scope: Option<&str>,
        batch: &mut ErrorBatch,
    ) {
        self.block.check(value, ctx, scope, batch);
    }

    fn store_error(&mut self, error: Option<ValidationError>) {
        self.block.store_error(error);
    }
}
