//! Unsaved-change tracking across a subtree

use crate::walker;
use formtree_node::{Node, NodeId, NodeKind};

/// Forms in the subtree (root included) holding unsaved changes
#[must_use]
pub fn dirty_forms(root: &dyn Node) -> Vec<NodeId> {
    walker::descendants(root)
        .into_iter()
        .filter(|node| node.kind() == NodeKind::Form)
        .filter(|node| node.as_data().is_some_and(|data| data.is_dirty()))
        .map(|node| node.id())
        .collect()
}

/// Check if any form in the subtree holds unsaved changes
#[inline]
#[must_use]
pub fn any_form_dirty(root: &dyn Node) -> bool {
    !dirty_forms(root).is_empty()
}

/// Take every data node's current value as its clean baseline
pub fn mark_clean(root: &mut dyn Node) {
    if let Some(data) = root.as_data_mut() {
        data.mark_clean();
    }
    for child in root.children_mut() {
        mark_clean(child.as_mut());
    }
}
