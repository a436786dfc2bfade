//! Node-level change listeners

use formtree_node::{ChangeEvent, Node};

/// Listener run when a node raises a change notification
///
/// Receives the raising node (so it can update derived fields through the
/// binding primitives) and the event (so it can cancel propagation).
pub type ChangeListener = Box<dyn FnMut(&mut dyn Node, &mut ChangeEvent) + Send>;

/// Run `listeners` in registration order, stopping after a cancel
///
/// The list is detached from the node while listeners run so each listener
/// can borrow the node mutably.
pub(crate) fn dispatch<N: Node>(
    node: &mut N,
    take: fn(&mut N) -> &mut Vec<ChangeListener>,
    event: &mut ChangeEvent,
) {
    let mut listeners = std::mem::take(take(node));
    for listener in &mut listeners {
        listener(node, event);
        if event.is_canceled() {
            break;
        }
    }
    let slot = take(node);
    listeners.append(slot);
    *slot = listeners;
}
