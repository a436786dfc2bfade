//! Transparent layout node

use formtree_node::{Node, NodeId, NodeKind};

/// Layout row, panel or shell
///
/// Never participates: the walker looks straight through it, so wrapping
/// fields in any number of wrappers changes neither collected values nor
/// validation results.
#[derive(Debug)]
pub struct Wrapper {
    id: NodeId,
    label: Option<String>,
    children: Vec<Box<dyn Node>>,
}

impl Default for Wrapper {
    fn default() -> Self {
        Self::new()
    }
}

impl Wrapper {
    /// Create empty wrapper
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            label: None,
            children: Vec::new(),
        }
    }

    /// Set presentation label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Add child
    #[inline]
    #[must_use]
    pub fn with_child(mut self, child: impl Node + 'static) -> Self {
        self.children.push(Box::new(child));
        self
    }

    /// Add boxed child
    pub fn push(&mut self, child: Box<dyn Node>) {
        self.children.push(child);
    }

    /// Presentation label
    #[inline]
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
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
