//! Change propagation
//!
//! A value change caused by user input raises a cancelable notification on
//! the edited node, then asks each data-parent in turn to raise its own,
//! up to the root. Transparent wrappers are never notified. If any node
//! cancels its notification, nothing above it is notified.
//!
//! Programmatic assignment ([`crate::value::apply`],
//! [`formtree_node::DataNode::set_value`]) never enters this path.

use crate::error::BindingError;
use crate::walker::{self, NodePath};
use formtree_node::{ChangeDetail, ChangeEvent, DataValue, Node, NodeId};

/// Outcome of one propagation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Propagation {
    /// Whether the edit changed the value at all
    pub changed: bool,

    /// Nodes that received a notification, origin first
    pub notified: Vec<NodeId>,

    /// Node whose listener canceled the notification
    pub canceled_by: Option<NodeId>,
}

impl Propagation {
    /// Check if the notification reached the top of the chain
    #[inline]
    #[must_use]
    pub fn completed(&self) -> bool {
        self.changed && self.canceled_by.is_none()
    }
}

/// Apply a user edit to node `target` and propagate the change
///
/// Nothing is raised when the value did not change.
///
/// # Errors
/// - `BindingError::NodeNotFound` if `target` is not in the tree
/// - `BindingError::NotADataNode` if `target` does not participate
pub fn user_edit(
    root: &mut dyn Node,
    target: NodeId,
    value: DataValue,
) -> Result<Propagation, BindingError> {
    let path = walker::locate(root, target).ok_or(BindingError::NodeNotFound(target))?;
    let node = walker::node_at_mut(root, path.indices())
        .and_then(|node| node.as_data_mut())
        .ok_or(BindingError::NotADataNode(target))?;

    if !node.set_value(value) {
        tracing::trace!(%target, "user edit left value unchanged");
        return Ok(Propagation::default());
    }
    raise(root, &path)
}

/// Raise a change notification at `path` and walk it up the data-parent chain
///
/// Used directly by containers whose value changes through a user action
/// other than a value edit (adding or removing a list item).
///
/// # Errors
/// - `BindingError::NotADataNode` if the node at `path` does not participate
pub fn raise(root: &mut dyn Node, path: &NodePath) -> Result<Propagation, BindingError> {
    let origin = walker::node_at(root, path.indices())
        .ok_or(BindingError::NodeNotFound(root.id()))?;
    let origin_id = origin.id();
    if origin.as_data().is_none() {
        return Err(BindingError::NotADataNode(origin_id));
    }

    let chain: Vec<NodePath> = std::iter::once(path.clone())
        .chain(walker::data_ancestors(root, path))
        .collect();

    let mut outcome = Propagation {
        changed: true,
        ..Propagation::default()
    };

    for step in &chain {
        let Some(node) = walker::node_at_mut(root, step.indices()).and_then(|n| n.as_data_mut())
        else {
            continue;
        };
        let sender = node.id();
        let mut event = ChangeEvent::new(ChangeDetail {
            sender,
            origin: origin_id,
            name: node.name().map(str::to_string),
            value: node.value(),
        });
        node.on_value_changed(&mut event);
        outcome.notified.push(sender);

        if event.is_canceled() {
            outcome.canceled_by = Some(sender);
            break;
        }
    }

    tracing::debug!(
        origin = %origin_id,
        notified = outcome.notified.len(),
        canceled = outcome.canceled_by.is_some(),
        "propagated change"
    );
    Ok(outcome)
}
