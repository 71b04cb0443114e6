//! Before/after invariant checks over key-sets and restart counters.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::error::InvariantViolation;
use crate::tracker::EventTracker;
use crate::types::{EntityKey, HostName, TrackedEntity};

/// True iff `after` covers exactly the same entity identities as `before`:
/// a superset of equal cardinality. Entities may have been replaced in
/// place under the same key; none may have been created or removed.
pub fn replica_set_unchanged(before: &BTreeSet<EntityKey>, after: &BTreeSet<EntityKey>) -> bool {
    after.len() == before.len() && after.is_superset(before)
}

/// Aggregate observed restart counters per assigned host. Entities without
/// a host assignment are skipped: there is no host to attribute them to.
pub fn restart_counts_by_host<'a, I>(entities: I) -> BTreeMap<HostName, u64>
where
    I: IntoIterator<Item = &'a TrackedEntity>,
{
    let mut counts = BTreeMap::new();
    for entity in entities {
        let Some(host) = &entity.host else { continue };
        *counts.entry(host.clone()).or_insert(0) += entity.restart_count;
    }
    counts
}

/// Checks post-restart invariants and attaches the full event render to any
/// violation for diagnosis.
pub struct InvariantChecker {
    tracker: Arc<EventTracker>,
}

impl InvariantChecker {
    pub fn new(tracker: Arc<EventTracker>) -> Self {
        Self { tracker }
    }

    /// The identity set of tracked entities must be unchanged across the
    /// restart window.
    pub fn no_replicas_changed(
        &self,
        before: &BTreeSet<EntityKey>,
        after: &BTreeSet<EntityKey>,
    ) -> Result<(), InvariantViolation> {
        if replica_set_unchanged(before, after) {
            return Ok(());
        }

        let created = join_keys(after.difference(before));
        let removed = join_keys(before.difference(after));
        Err(InvariantViolation::ReplicasChanged {
            before_count: before.len(),
            after_count: after.len(),
            created,
            removed,
            events: self.tracker.render(),
        })
    }

    /// Restart counters observed before and after must be equal; any delta
    /// is fatal and reported per offending host. Hosts present on only one
    /// side count from zero on the missing side.
    pub fn no_unexpected_restarts(
        &self,
        before: &BTreeMap<HostName, u64>,
        after: &BTreeMap<HostName, u64>,
    ) -> Result<(), InvariantViolation> {
        let hosts: BTreeSet<&HostName> = before.keys().chain(after.keys()).collect();

        let mut deltas = Vec::new();
        for host in hosts {
            let observed_before = before.get(host).copied().unwrap_or(0);
            let observed_after = after.get(host).copied().unwrap_or(0);
            if observed_before != observed_after {
                deltas.push(format!("{host}: {observed_before} -> {observed_after}"));
            }
        }

        if deltas.is_empty() {
            return Ok(());
        }

        Err(InvariantViolation::UnexpectedRestarts {
            deltas: deltas.join(", "),
            events: self.tracker.render(),
        })
    }
}

fn join_keys<'a, I>(keys: I) -> String
where
    I: Iterator<Item = &'a EntityKey>,
{
    keys.map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
