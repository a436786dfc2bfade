//! Change notifications and render signalling

use crate::id::NodeId;
use crate::value::DataValue;

/// Payload of a change notification
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeDetail {
    /// Node raising this notification
    pub sender: NodeId,

    /// Node whose value was edited by the user
    pub origin: NodeId,

    /// Binding name of the sender, if any
    pub name: Option<String>,

    /// Sender's value after the edit
    pub value: DataValue,
}

/// Cancelable change notification
///
/// Created for every value change caused by user input, never for
/// programmatic distribution. Only the cancellation outcome is observed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    cancelable: bool,
    canceled: bool,
    /// Event payload
    pub detail: ChangeDetail,
}

impl ChangeEvent {
    /// Create cancelable event
    #[inline]
    #[must_use]
    pub fn new(detail: ChangeDetail) -> Self {
        Self {
            cancelable: true,
            canceled: false,
            detail,
        }
    }

    /// Create event that ignores `cancel()`
    #[inline]
    #[must_use]
    pub fn non_cancelable(detail: ChangeDetail) -> Self {
        Self {
            cancelable: false,
            canceled: false,
            detail,
        }
    }

    /// Whether `cancel()` has any effect
    #[inline]
    #[must_use]
    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    /// Stop propagation to further ancestors
    #[inline]
    pub fn cancel(&mut self) {
        if self.cancelable {
            self.canceled = true;
        }
    }

    /// Check if a listener canceled the event
    #[inline]
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.canceled
    }
}

/// Render request counter
///
/// Every state change that the presentation layer must pick up bumps the
/// epoch. Renderers compare epochs to decide what to redraw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSignal {
    epoch: u64,
}

impl RenderSignal {
    /// Request a re-render
    #[inline]
    pub fn request(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Current epoch
    #[inline]
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}
