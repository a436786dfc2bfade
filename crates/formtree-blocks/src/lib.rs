//! formtree Blocks
//!
//! Concrete protocol participants and declarative layouts.
//!
//! # Core Concepts
//!
//! - [`Field`]: Leaf data node with a value kind and validation rules
//! - [`Wrapper`]: Transparent layout node (rows, panels, shells)
//! - [`Block`]: Grouping container with cross-field hooks
//! - [`Form`]: Block owning a [`formtree_node::DataMode`]; tags its value while editing
//! - [`Bit`]: Collapsible node; summary is presentation only, detail carries data
//! - [`ListBit`]: Repeating group of homogeneous items built by a factory
//! - [`LayoutSpec`]: Layout documents in JSON, YAML or TOML
//!
//! # Example
//!
//! ```rust,ignore
//! use formtree_blocks::{Field, Form, Wrapper};
//! use formtree_node::{DataNode, ValidationContext};
//!
//! let mut form = Form::new()
//!     .with_child(Field::new("FirstName").required())
//!     .with_child(Wrapper::new().with_child(Field::new("LastName").with_value("Doe")));
//!
//! let error = form.validate(&ValidationContext::default(), None, true)?;
//! assert!(error.is_some());
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod bit;
pub mod block;
mod error;
pub mod field;
pub mod form;
pub mod layout;
pub mod list;
mod listener;
pub mod wrapper;

// Re-exports
pub use bit::{Bit, Summariser};
pub use block::{exclusive, require_one, Block, BlockHook};
pub use error::BlocksError;
pub use field::{Field, FieldKind, Rule, RuleFn, ScopedRule, DATE_FORMAT};
pub use form::Form;
pub use layout::{
    BitSpec, BlockRule, BlockSpec, FieldSpec, LayoutNode, LayoutSpec, ListSpec, WrapperSpec,
};
pub use list::{ItemFactory, ListBit};
pub use listener::ChangeListener;
pub use wrapper::Wrapper;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
