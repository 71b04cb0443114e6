//! Serial history of entity lifecycle events.
//!
//! The tracker exists to capture anomalies and transitions around a daemon
//! restart, not routine confirmation traffic: `Updated` events for entities
//! already in the steady-state phase are suppressed, everything else is
//! recorded append-only in arrival order.

use std::fmt::Write as _;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::types::{Phase, TrackedEntity, Transition, TransitionKind};

/// One recorded transition. Immutable once inserted; later events supersede
/// it under a new key rather than mutating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvent {
    /// Timestamp-qualified sortable key: `[<time>] <KIND>: <entity>`.
    pub key: String,
    pub kind: TransitionKind,
    pub entity: TrackedEntity,
    pub recorded_at: DateTime<Utc>,
}

/// Thread-safe, append-only event store. One writer (the feed task) and any
/// number of readers share it behind `&self`; the single lock is held only
/// for the store operation itself.
#[derive(Debug, Default)]
pub struct EventTracker {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl EventTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one transition for an entity. `Updated` in the steady-state
    /// phase is suppressed; `Added` and `Deleted` are always recorded.
    pub fn remember(&self, entity: &TrackedEntity, kind: TransitionKind) {
        if kind == TransitionKind::Updated && entity.phase == Phase::Running {
            return;
        }

        let recorded_at = Utc::now();
        let key = format!(
            "[{}] {}: {}",
            recorded_at.format("%Y-%m-%dT%H:%M:%S%.9fZ"),
            kind,
            entity.key,
        );
        let event = LifecycleEvent {
            key,
            kind,
            entity: entity.clone(),
            recorded_at,
        };

        let mut events = self.events.lock().expect("event store lock poisoned");
        events.push(event);
    }

    /// Single handler for feed transitions; records the latest snapshot.
    pub fn record(&self, transition: &Transition) {
        self.remember(transition.entity(), transition.kind());
    }

    /// All recorded keys, in insertion order.
    pub fn list_keys(&self) -> Vec<String> {
        let events = self.events.lock().expect("event store lock poisoned");
        events.iter().map(|event| event.key.clone()).collect()
    }

    /// Snapshot of all recorded events, in insertion order.
    pub fn events(&self) -> Vec<LifecycleEvent> {
        let events = self.events.lock().expect("event store lock poisoned");
        events.clone()
    }

    pub fn len(&self) -> usize {
        let events = self.events.lock().expect("event store lock poisoned");
        events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable multi-line summary for failure diagnostics: one line
    /// per retained event with the phase and host seen at that moment.
    pub fn render(&self) -> String {
        let events = self.events.lock().expect("event store lock poisoned");
        let mut out = String::new();
        for event in events.iter() {
            let host = event
                .entity
                .host
                .as_ref()
                .map(|host| host.0.as_str())
                .unwrap_or("<unassigned>");
            let _ = writeln!(
                out,
                "{} phase={} host={}",
                event.key, event.entity.phase, host
            );
        }
        out
    }
}
