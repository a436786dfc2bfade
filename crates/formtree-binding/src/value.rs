//! Value aggregation and distribution
//!
//! [`collect`] builds a nested object from the data members of a container;
//! [`apply`] pushes one back down by name. Both are shape-agnostic: a value
//! of the wrong shape is handed to the member as-is and left for its own
//! validation to report. Neither operation raises change notifications.

use crate::walker;
use formtree_node::{is_reserved_name, DataValue, Node};
use indexmap::IndexMap;
use serde_json::Map;

/// Collect the value of `container`'s subtree
///
/// Unnamed leaves are skipped; an unnamed block or form contributes its own
/// named members directly (see [`walker::bound_members`]). Members sharing
/// a name are gathered positionally into an array under that name. Keys
/// appear in the order they are first encountered.
#[must_use]
pub fn collect(container: &dyn Node) -> DataValue {
    let mut groups: IndexMap<String, Vec<DataValue>> = IndexMap::new();
    for member in walker::bound_members(container) {
        let Some(name) = member.name() else {
            continue;
        };
        groups.entry(name.to_string()).or_default().push(member.value());
    }

    let mut map = Map::new();
    for (name, mut values) in groups {
        let value = if values.len() == 1 {
            values.pop().unwrap_or(DataValue::Null)
        } else {
            DataValue::Array(values)
        };
        map.insert(name, value);
    }
    DataValue::Object(map)
}

/// Number of named members per name, in first-encountered order
#[must_use]
pub fn name_counts(container: &dyn Node) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for member in walker::bound_members(container) {
        if let Some(name) = member.name() {
            *counts.entry(name.to_string()).or_default() += 1;
        }
    }
    counts
}

/// Distribute `value` into `container`'s subtree
///
/// For every bound member (unnamed blocks and forms are looked through) the
/// entry `value[name]` is looked up:
/// - a single member receives the lookup result as-is;
/// - members sharing a name take array entries positionally; surplus members
///   receive `Null`, surplus entries are ignored (nodes are never created here);
/// - if a shared name maps to a non-array, the first member receives it raw
///   and the rest receive `Null`.
///
/// A missing key (or a non-object `value`) yields `Null`. The reserved
/// mode tag is never distributed.
///
/// Returns `true` iff at least one member's value actually changed.
pub fn apply(container: &mut dyn Node, value: &DataValue) -> bool {
    let counts = name_counts(container);
    let mut seen: IndexMap<String, usize> = IndexMap::new();
    let mut changed = false;

    walker::for_each_bound_mut(container, &mut |member| {
        let Some(name) = member.name().map(str::to_string) else {
            return;
        };
        if is_reserved_name(&name) {
            return;
        }
        let position = {
            let slot = seen.entry(name.clone()).or_default();
            let current = *slot;
            *slot += 1;
            current
        };
        let group_size = counts.get(&name).copied().unwrap_or(1);
        let incoming = value.get(&name).cloned().unwrap_or(DataValue::Null);
        let assigned = pick(incoming, position, group_size);

        if member.set_value(assigned) {
            changed = true;
        }
    });

    tracing::trace!(changed, "applied value to container");
    changed
}

/// Current value of the first member named `name`
#[must_use]
pub fn get_named(container: &dyn Node, name: &str) -> Option<DataValue> {
    walker::bound_members(container)
        .into_iter()
        .find(|member| member.name() == Some(name))
        .map(|member| member.value())
}

/// Assign `value` to the first member named `name`
///
/// Other members are left alone, unlike [`apply`]. Returns `true` iff the
/// member exists and its value changed.
pub fn set_named(container: &mut dyn Node, name: &str, value: DataValue) -> bool {
    let mut pending = Some(value);
    let mut changed = false;
    walker::for_each_bound_mut(container, &mut |member| {
        if member.name() != Some(name) {
            return;
        }
        if let Some(value) = pending.take() {
            changed = member.set_value(value);
        }
    });
    changed
}

fn pick(incoming: DataValue, position: usize, group_size: usize) -> DataValue {
    if group_size <= 1 {
        return incoming;
    }
    match incoming {
        DataValue::Array(items) => items.into_iter().nth(position).unwrap_or(DataValue::Null),
        raw if position == 0 => raw,
        _ => DataValue::Null,
    }
}
