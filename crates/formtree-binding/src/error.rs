//! Error types for the binding protocol

use formtree_node::NodeId;

/// Errors raised when addressing nodes in a tree
///
/// Value and validation problems are never reported through this type:
/// they are returned as data ([`formtree_node::ValidationError`]).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    /// No node with this id in the tree
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// Node exists but does not participate in the data document
    #[error("node {0} is not a data node")]
    NotADataNode(NodeId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let id = NodeId::new();
        assert!(BindingError::NodeNotFound(id).to_string().contains("not found"));
        assert!(BindingError::NotADataNode(id)
            .to_string()
            .contains("not a data node"));
    }
}
