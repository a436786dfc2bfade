//! Collapsible bits
//!
//! A [`Bit`] shows a one-line summary while collapsed and its detail
//! content while expanded. Only the detail content carries data: summary
//! nodes are presentation only and are never walked.
//!
//! An unnamed bit does not participate at all, so the walker looks through
//! it into the detail content. A named bit nests the detail value under its
//! own name and validates it as one container.

use crate::listener::{self, ChangeListener};
use formtree_binding::{validation, value, walker};
use formtree_node::{
    is_reserved_name, ChangeEvent, Container, DataNode, DataValue, ErrorOrigin, Node, NodeId,
    NodeKind, RenderSignal, ValidationContext, ValidationError,
};

/// Builds the collapsed summary line from the detail value
pub type Summariser = Box<dyn Fn(&DataValue) -> String + Send>;

/// Collapsible wrapper forwarding to its detail content
pub struct Bit {
    id: NodeId,
    name: Option<String>,
    title: String,
    expanded: bool,
    summary: Vec<Box<dyn Node>>,
    detail: Vec<Box<dyn Node>>,
    summariser: Option<Summariser>,
    listeners: Vec<ChangeListener>,
    error: Option<ValidationError>,
    render: RenderSignal,
}

impl std::fmt::Debug for Bit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bit")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("expanded", &self.expanded)
            .field("summary", &self.summary)
            .field("detail", &self.detail)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl Default for Bit {
    fn default() -> Self {
        Self::new()
    }
}

impl Bit {
    /// Create new collapsed, unnamed bit
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            name: None,
            title: String::new(),
            expanded: false,
            summary: Vec::new(),
            detail: Vec::new(),
            summariser: None,
            listeners: Vec::new(),
            error: None,
            render: RenderSignal::default(),
        }
    }

    /// Create new collapsed bit bound to `name`
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut bit = Self::new();
        bit.title = name.clone();
        bit.name = Some(name);
        bit
    }

    /// Set caption
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Start expanded
    #[inline]
    #[must_use]
    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    /// Add summary (presentation-only) node
    #[must_use]
    pub fn with_summary(mut self, node: impl Node + 'static) -> Self {
        self.summary.push(Box::new(node));
        self
    }

    /// Add detail node
    #[must_use]
    pub fn with_detail(mut self, node: impl Node + 'static) -> Self {
        self.detail.push(Box::new(node));
        self
    }

    /// Set summariser
    #[must_use]
    pub fn with_summariser<F>(mut self, summariser: F) -> Self
    where
        F: Fn(&DataValue) -> String + Send + 'static,
    {
        self.summariser = Some(Box::new(summariser));
        self
    }

    /// Add change listener
    #[must_use]
    pub fn with_listener(mut self, listener: ChangeListener) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Add boxed summary node
    pub fn push_summary(&mut self, node: Box<dyn Node>) {
        self.summary.push(node);
    }

    /// Add boxed detail node
    pub fn push_detail(&mut self, node: Box<dyn Node>) {
        self.detail.push(node);
    }

    /// Summary nodes
    #[inline]
    #[must_use]
    pub fn summary(&self) -> &[Box<dyn Node>] {
        &self.summary
    }

    /// Check if the detail content is shown
    #[inline]
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Flip between collapsed and expanded
    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
        self.render.request();
    }

    /// Collapsed summary line
    ///
    /// Uses the summariser when set, otherwise the caption.
    #[must_use]
    pub fn summary_text(&self) -> String {
        match &self.summariser {
            Some(summarise) => summarise(&value::collect(self)),
            None => self.title.clone(),
        }
    }

    fn listeners(bit: &mut Self) -> &mut Vec<ChangeListener> {
        &mut bit.listeners
    }
}

impl Node for Bit {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Bit
    }

    fn children(&self) -> &[Box<dyn Node>] {
        &self.detail
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Node>] {
        &mut self.detail
    }

    fn as_data(&self) -> Option<&dyn DataNode> {
        if self.name.is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn as_data_mut(&mut self) -> Option<&mut dyn DataNode> {
        if self.name.is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn render_epoch(&self) -> u64 {
        self.render.epoch()
    }
}

impl DataNode for Bit {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn set_name(&mut self, name: Option<String>) {
        if name.as_deref().is_some_and(is_reserved_name) {
            tracing::warn!(name = name.as_deref(), "ignoring reserved bit name");
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
        let result = validation::validate(self, ctx, scope, apply);
        // errors open a collapsed bit
        if apply && result.is_some() && !self.expanded {
            self.expanded = true;
        }
        Ok(result)
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

impl Container for Bit {
    fn origin(&self) -> ErrorOrigin {
        ErrorOrigin {
            name: self.name.clone(),
            schema: None,
            title: self.title.clone(),
        }
    }

    fn store_error(&mut self, error: Option<ValidationError>) {
        self.error = error;
        self.render.request();
    }
}
