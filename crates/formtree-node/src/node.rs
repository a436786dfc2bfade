//! Capability traits
//!
//! Participation in the protocol is interface membership: a node takes part
//! in the data document exactly when [`Node::as_data`] returns `Some`.
//! Everything else is a transparent layout node.

use crate::error::{ErrorBatch, ValidationError};
use crate::event::ChangeEvent;
use crate::id::NodeId;
use crate::value::DataValue;

/// Node classification, mostly for diagnostics and subtree scans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Transparent layout node
    Wrapper,
    /// Leaf field
    Field,
    /// Grouping container
    Block,
    /// Block owning a data mode
    Form,
    /// Collapsible wrapper forwarding to detail content
    Bit,
    /// Repeating group
    ListBit,
    /// Anything else
    Custom,
}

/// Unit of the composition tree
///
/// Children are owned exclusively by their parent; the tree is acyclic by
/// construction and carries no back-references.
pub trait Node: Send + std::fmt::Debug {
    /// Stable identifier
    fn id(&self) -> NodeId;

    /// Node classification
    fn kind(&self) -> NodeKind;

    /// Children walked by the protocol
    fn children(&self) -> &[Box<dyn Node>] {
        &[]
    }

    /// Mutable children walked by the protocol
    fn children_mut(&mut self) -> &mut [Box<dyn Node>] {
        &mut []
    }

    /// Data capability, if this node participates
    fn as_data(&self) -> Option<&dyn DataNode> {
        None
    }

    /// Mutable data capability, if this node participates
    fn as_data_mut(&mut self) -> Option<&mut dyn DataNode> {
        None
    }

    /// Render epoch (bumped whenever the node asks to be redrawn)
    fn render_epoch(&self) -> u64 {
        0
    }
}

/// Shared, read-only context for one validation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationContext {
    /// Arbitrary data visible to every validator (e.g. the record being edited)
    pub data: DataValue,

    /// Locale hint for messages
    pub locale: Option<String>,
}

impl ValidationContext {
    /// Create context carrying `data`
    #[inline]
    #[must_use]
    pub fn with_data(data: DataValue) -> Self {
        Self { data, locale: None }
    }
}

/// Protocol participant
pub trait DataNode: Node {
    /// Binding name within the parent value
    fn name(&self) -> Option<&str>;

    /// Rebind under a new name
    ///
    /// Reserved names (see [`is_reserved_name`]) are ignored.
    fn set_name(&mut self, name: Option<String>);

    /// Current value (leaf or composite)
    fn value(&self) -> DataValue;

    /// Programmatic assignment; returns `true` iff the value changed
    ///
    /// Never raises a change notification.
    fn set_value(&mut self, value: DataValue) -> bool;

    /// Validate own value (and subtree, for containers)
    ///
    /// `apply = false` is a dry run: no stored error may change and no
    /// re-render may be requested. `Err` reports an unexpected validator
    /// failure; the calling container converts it into a validation error.
    fn validate(
        &mut self,
        ctx: &ValidationContext,
        scope: Option<&str>,
        apply: bool,
    ) -> anyhow::Result<Option<ValidationError>>;

    /// Last applied validation result
    fn error(&self) -> Option<&ValidationError>;

    /// Drop stored errors (own and subtree) without validating
    fn clear_errors(&mut self);

    /// Value differs from the last clean baseline
    fn is_dirty(&self) -> bool;

    /// Take the current value as the clean baseline
    fn mark_clean(&mut self);

    /// Node-level change listeners; may cancel further propagation
    fn on_value_changed(&mut self, _event: &mut ChangeEvent) {}

    /// Container-level aggregate
    fn block_value(&self) -> DataValue {
        self.value()
    }

    /// Container-level distribution
    fn set_block_value(&mut self, value: DataValue) -> bool {
        self.set_value(value)
    }
}

/// Identity a container stamps on its composite error
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorOrigin {
    /// Binding name
    pub name: Option<String>,
    /// Schema name
    pub schema: Option<String>,
    /// Caption
    pub title: String,
}

/// Grouping node the validation cascade runs over
pub trait Container: Node {
    /// Identity for the composite error
    fn origin(&self) -> ErrorOrigin;

    /// Cross-field hook
    ///
    /// Receives the container's collected value and the batch of child
    /// errors (traversal order); may append container-level errors.
    fn check(
        &self,
        _value: &DataValue,
        _ctx: &ValidationContext,
        _scope: Option<&str>,
        _batch: &mut ErrorBatch,
    ) {
    }

    /// Store (or clear) the container's own error and request a re-render
    fn store_error(&mut self, error: Option<ValidationError>);
}

/// Names beginning with `$` are reserved for protocol tags
#[inline]
#[must_use]
pub fn is_reserved_name(name: &str) -> bool {
    name.starts_with('$')
}
