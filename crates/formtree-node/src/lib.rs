//! formtree Node Model
//!
//! Capability traits and data types shared by every participant of the
//! binding protocol.
//!
//! # Core Concepts
//!
//! - [`Node`]: Any unit of the composition tree (layout wrappers included)
//! - [`DataNode`]: A node that participates in the data document
//! - [`Container`]: A grouping node the validation cascade can run over
//! - [`DataValue`]: The nested JSON-like value tree produced by collect/apply
//! - [`ValidationError`]: Field, cross-field and composite validation errors
//! - [`DataMode`]: View/Insert/Update mode owned by a form
//! - [`ChangeEvent`]: Cancelable change notification raised on user input
//!
//! # Example
//!
//! ```rust,ignore
//! use formtree_node::{DataMode, ValidationError};
//!
//! let value = serde_json::json!({"FirstName": "Ada"});
//! let tagged = formtree_node::tag(value, DataMode::Insert);
//! assert_eq!(DataMode::of(&tagged), DataMode::Insert);
//! ```

#![warn(unreachable_pub)]

// Core modules
mod error;
mod event;
mod id;
mod mode;
mod node;
mod value;

// Re-exports
pub use error::{ErrorBatch, ErrorKind, ValidationError};
pub use event::{ChangeDetail, ChangeEvent, RenderSignal};
pub use id::NodeId;
pub use mode::{strip_tag, tag, DataMode, MODE_TAG};
pub use node::{
    is_reserved_name, Container, DataNode, ErrorOrigin, Node, NodeKind, ValidationContext,
};
pub use value::{is_absent, DataValue};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
