//! formtree Binding Protocol
//!
//! The protocol primitives every container is built from. All operations
//! are synchronous and run to completion; none of them await.
//!
//! # Core Concepts
//!
//! - [`walker`]: Locates the data-participating descendants of a container,
//!   looking through transparent layout nodes
//! - [`value`]: Collects a nested value from a subtree and distributes one back
//! - [`validation`]: Full-subtree validation cascade with error aggregation
//! - [`propagate`]: Cancelable change notification raised up the data-parent chain
//! - [`dirty`]: Subtree dirty-state scans
//!
//! # Example
//!
//! ```rust,ignore
//! use formtree_binding::{value, validation};
//! use formtree_node::ValidationContext;
//!
//! let snapshot = value::collect(&form);
//! value::apply(&mut form, &snapshot);
//! let errors = validation::validate(&mut form, &ValidationContext::default(), None, true);
//! ```

#![warn(unreachable_pub)]

pub mod dirty;
mod error;
pub mod propagate;
pub mod validation;
pub mod value;
pub mod walker;

#[cfg(test)]
mod fixtures;

pub use error::BindingError;
pub use propagate::{user_edit, Propagation};
pub use walker::NodePath;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
