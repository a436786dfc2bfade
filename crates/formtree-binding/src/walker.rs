//! Tree walker
//!
//! Finds the data members of a container. Traversal is depth-first in
//! document order. A participating node is yielded and not descended into
//! (it owns its subtree); a non-participating node is transparent and is
//! descended into. Layout wrappers can therefore sit anywhere without
//! showing up in the collected value.
//!
//! [`bound_members`] is the value-binding view of the same walk: unnamed
//! blocks and forms still validate as members, but their named members are
//! bound straight into the enclosing value.

use crate::error::BindingError;
use formtree_node::{DataNode, Node, NodeId, NodeKind};

/// Child-index path from a root to one of its descendants
///
/// The empty path addresses the root itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(pub Vec<usize>);

impl NodePath {
    /// Path of the root
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path indices
    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Number of steps from the root
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Path one level up (if not root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }
}

/// Data members of `container`, in document order
///
/// With `recursive` set, non-participating children are looked through;
/// otherwise only direct children are inspected. The container itself is
/// never yielded. An empty result is not an error.
#[must_use]
pub fn members(container: &dyn Node, recursive: bool) -> Vec<&dyn DataNode> {
    let mut out = Vec::new();
    for child in container.children() {
        gather(child.as_ref(), recursive, &mut out);
    }
    out
}

fn gather<'a>(node: &'a dyn Node, recursive: bool, out: &mut Vec<&'a dyn DataNode>) {
    if let Some(data) = node.as_data() {
        out.push(data);
        return;
    }
    if recursive {
        for child in node.children() {
            gather(child.as_ref(), recursive, out);
        }
    }
}

/// Visit the data members of `container` mutably, in document order
///
/// Same traversal as [`members`].
pub fn for_each_member_mut(
    container: &mut dyn Node,
    recursive: bool,
    f: &mut dyn FnMut(&mut dyn DataNode),
) {
    for child in container.children_mut() {
        visit_mut(child.as_mut(), recursive, f);
    }
}

fn visit_mut(node: &mut dyn Node, recursive: bool, f: &mut dyn FnMut(&mut dyn DataNode)) {
    if let Some(data) = node.as_data_mut() {
        f(data);
        return;
    }
    if recursive {
        for child in node.children_mut() {
            visit_mut(child.as_mut(), recursive, f);
        }
    }
}

/// Named members whose values live directly in `container`'s value
///
/// Like [`members`], except that an unnamed block or form is expanded into
/// its own bound members instead of being yielded. Unnamed leaves are
/// dropped.
#[must_use]
pub fn bound_members(container: &dyn Node) -> Vec<&dyn DataNode> {
    let mut out = Vec::new();
    for child in container.children() {
        gather_bound(child.as_ref(), &mut out);
    }
    out
}

fn gather_bound<'a>(node: &'a dyn Node, out: &mut Vec<&'a dyn DataNode>) {
    match node.as_data() {
        Some(data) if data.name().is_some() => out.push(data),
        Some(data) if !merges_into_parent(data.kind()) => {}
        _ => {
            for child in node.children() {
                gather_bound(child.as_ref(), out);
            }
        }
    }
}

/// Visit [`bound_members`] mutably, in document order
pub fn for_each_bound_mut(container: &mut dyn Node, f: &mut dyn FnMut(&mut dyn DataNode)) {
    for child in container.children_mut() {
        visit_bound_mut(child.as_mut(), f);
    }
}

fn visit_bound_mut(node: &mut dyn Node, f: &mut dyn FnMut(&mut dyn DataNode)) {
    let expand = match node.as_data() {
        None => true,
        Some(data) if data.name().is_none() => merges_into_parent(data.kind()),
        Some(_) => false,
    };
    if expand {
        for child in node.children_mut() {
            visit_bound_mut(child.as_mut(), f);
        }
    } else if let Some(data) = node.as_data_mut() {
        if data.name().is_some() {
            f(data);
        }
    }
}

fn merges_into_parent(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::Block | NodeKind::Form)
}

/// Every node of the tree (root first), ignoring participation
#[must_use]
pub fn descendants(root: &dyn Node) -> Vec<&dyn Node> {
    let mut out = Vec::new();
    walk_all(root, &mut out);
    out
}

fn walk_all<'a>(node: &'a dyn Node, out: &mut Vec<&'a dyn Node>) {
    out.push(node);
    for child in node.children() {
        walk_all(child.as_ref(), out);
    }
}

/// Find the path of node `id`
#[must_use]
pub fn locate(root: &dyn Node, id: NodeId) -> Option<NodePath> {
    let mut path = Vec::new();
    if search(root, id, &mut path) {
        Some(NodePath(path))
    } else {
        None
    }
}

fn search(node: &dyn Node, id: NodeId, path: &mut Vec<usize>) -> bool {
    if node.id() == id {
        return true;
    }
    for (i, child) in node.children().iter().enumerate() {
        path.push(i);
        if search(child.as_ref(), id, path) {
            return true;
        }
        path.pop();
    }
    false
}

/// Node at `path`
#[must_use]
pub fn node_at<'a>(root: &'a dyn Node, path: &[usize]) -> Option<&'a dyn Node> {
    match path.split_first() {
        None => Some(root),
        Some((&first, rest)) => node_at(root.children().get(first)?.as_ref(), rest),
    }
}

/// Mutable node at `path`
#[must_use]
pub fn node_at_mut<'a>(root: &'a mut dyn Node, path: &[usize]) -> Option<&'a mut dyn Node> {
    match path.split_first() {
        None => Some(root),
        Some((&first, rest)) => node_at_mut(root.children_mut().get_mut(first)?.as_mut(), rest),
    }
}

/// Data-parent chain of the node at `path`, nearest first
///
/// Only participating ancestors are listed; the root is included when it
/// participates. Transparent wrappers are skipped.
#[must_use]
pub fn data_ancestors(root: &dyn Node, path: &NodePath) -> Vec<NodePath> {
    (0..path.depth())
        .rev()
        .map(|len| NodePath(path.0[..len].to_vec()))
        .filter(|prefix| {
            node_at(root, &prefix.0).is_some_and(|node| node.as_data().is_some())
        })
        .collect()
}

/// Data node with id `id`
///
/// # Errors
/// - `BindingError::NodeNotFound` if no node has this id
/// - `BindingError::NotADataNode` if the node does not participate
pub fn data_node(root: &dyn Node, id: NodeId) -> Result<&dyn DataNode, BindingError> {
    let path = locate(root, id).ok_or(BindingError::NodeNotFound(id))?;
    node_at(root, &path.0)
        .and_then(|node| node.as_data())
        .ok_or(BindingError::NotADataNode(id))
}

/// Mutable data node with id `id`
///
/// # Errors
/// Same as [`data_node`].
pub fn data_node_mut(root: &mut dyn Node, id: NodeId) -> Result<&mut dyn DataNode, BindingError> {
    let path = locate(root, id).ok_or(BindingError::NodeNotFound(id))?;
    node_at_mut(root, &path.0)
        .and_then(|node| node.as_data_mut())
        .ok_or(BindingError::NotADataNode(id))
}
