//! Action availability

use crate::config::CrudConfig;
use formtree_node::DataMode;
use serde::Serialize;

/// Which CRUD actions are currently legal
///
/// Derived purely from the current state; recomputed after every change,
/// including direct field edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Affordances {
    /// New is available
    pub can_new: bool,
    /// Edit is available
    pub can_edit: bool,
    /// Save is available
    pub can_save: bool,
    /// Cancel is available
    pub can_cancel: bool,
    /// Refresh is available
    pub can_refresh: bool,
    /// A load or save is in flight
    pub busy: bool,
}

impl Affordances {
    /// Derive flags from mode, baseline presence and busy state
    #[must_use]
    pub fn derive(mode: DataMode, has_baseline: bool, busy: bool, config: &CrudConfig) -> Self {
        let idle = !busy;
        let viewing = !mode.is_editing();
        Self {
            can_new: idle && viewing && config.allow_insert,
            can_edit: idle && viewing && has_baseline && config.allow_update,
            can_save: idle && mode.is_editing(),
            can_cancel: idle && mode.is_editing(),
            can_refresh: idle && viewing,
            busy,
        }
    }

    /// Check if no action is available
    #[must_use]
    pub fn none(&self) -> bool {
        !(self.can_new || self.can_edit || self.can_save || self.can_cancel || self.can_refresh)
    }
}
