//! formtree CRUD
//!
//! Sequences New/Edit/Save/Cancel/Refresh over a root [`Form`] against
//! asynchronous load/save collaborators, and re-derives which actions are
//! currently available after every state change.
//!
//! # Core Concepts
//!
//! - [`CrudForm`]: The state machine; owns the form behind a mutex
//! - [`CrudHandler`]: Load/save collaborator, the only async boundary
//! - [`BusyIndicator`]: Suspends the host while a load or save is awaited
//! - [`DiscardPrompt`]: Lets a host veto closing over unsaved edits
//! - [`Affordances`]: Pure function of mode, baseline presence and busy state
//!
//! # Example
//!
//! ```rust,ignore
//! use formtree_crud::{CrudForm, FileStore};
//! use std::sync::Arc;
//!
//! # async fn example(form: formtree_blocks::Form) -> Result<(), formtree_crud::CrudError> {
//! let crud = CrudForm::new(form, Arc::new(FileStore::new("person.json")));
//! crud.refresh().await?;
//! crud.edit()?;
//! crud.save().await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`Form`]: formtree_blocks::Form

#![warn(unreachable_pub)]

// Core modules
pub mod affordance;
pub mod collab;
pub mod config;
mod error;
pub mod machine;
pub mod store;

// Re-exports
pub use affordance::Affordances;
pub use collab::{
    BusyIndicator, CountingBusy, CrudHandler, DiscardPrompt, FixedPrompt, NoopBusy, SaveRequest,
};
pub use config::CrudConfig;
pub use error::{ConfigError, CrudError};
pub use machine::CrudForm;
pub use store::FileStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
