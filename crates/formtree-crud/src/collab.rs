//! External collaborators consumed by the state machine
//!
//! Load and save are the only asynchronous calls in the whole protocol.
//! While one is awaited the host is suspended through a [`BusyIndicator`],
//! so no validation or distribution can interleave with it.

use formtree_node::{DataMode, DataValue};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Payload handed to [`CrudHandler::save`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRequest {
    /// Mode the record was edited in
    pub mode: DataMode,

    /// Collected form value, carrying the mode tag
    pub value: DataValue,
}

/// Load/save collaborator
///
/// Implement this trait to connect a form to storage. A `Null` load result
/// means "no record".
#[async_trait::async_trait]
pub trait CrudHandler: Send + Sync {
    /// Fetch the current record
    async fn load(&self) -> anyhow::Result<DataValue>;

    /// Persist an edited record; the returned value is opaque to the form
    /// unless configured to be distributed back
    async fn save(&self, request: &SaveRequest) -> anyhow::Result<DataValue>;
}

/// Host suspension around awaited collaborator calls
pub trait BusyIndicator: Send + Sync {
    /// Suspend the host
    fn begin(&self, label: &str);

    /// Resume the host
    fn end(&self);
}

/// Busy indicator that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBusy;

impl BusyIndicator for NoopBusy {
    fn begin(&self, _label: &str) {}

    fn end(&self) {}
}

/// Busy indicator that counts begin/end calls
#[derive(Debug, Default)]
pub struct CountingBusy {
    begun: AtomicUsize,
    ended: AtomicUsize,
    labels: Mutex<Vec<String>>,
}

impl CountingBusy {
    /// Create new counter
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `begin` calls
    #[must_use]
    pub fn begun(&self) -> usize {
        self.begun.load(Ordering::SeqCst)
    }

    /// Number of `end` calls
    #[must_use]
    pub fn ended(&self) -> usize {
        self.ended.load(Ordering::SeqCst)
    }

    /// Check if a `begin` is still waiting for its `end`
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.begun() > self.ended()
    }

    /// Labels passed to `begin`, oldest first
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.labels.lock().clone()
    }
}

impl BusyIndicator for CountingBusy {
    fn begin(&self, label: &str) {
        self.labels.lock().push(label.to_string());
        self.begun.fetch_add(1, Ordering::SeqCst);
    }

    fn end(&self) {
        self.ended.fetch_add(1, Ordering::SeqCst);
    }
}

/// Host hook consulted before discarding unsaved edits
#[async_trait::async_trait]
pub trait DiscardPrompt: Send + Sync {
    /// Return `true` to allow discarding
    async fn confirm_discard(&self) -> bool;
}

/// Prompt that always gives the same answer
#[derive(Debug, Clone, Copy)]
pub struct FixedPrompt(pub bool);

#[async_trait::async_trait]
impl DiscardPrompt for FixedPrompt {
    async fn confirm_discard(&self) -> bool {
        self.0
    }
}

/// Calls `end` on drop so the host resumes even when the awaiting future
/// is dropped
pub(crate) struct BusyScope<'a> {
    indicator: &'a dyn BusyIndicator,
}

impl<'a> BusyScope<'a> {
    pub(crate) fn begin(indicator: &'a dyn BusyIndicator, label: &str) -> Self {
        indicator.begin(label);
        Self { indicator }
    }
}

impl Drop for BusyScope<'_> {
    fn drop(&mut self) {
        self.indicator.end();
    }
}
