//! Domain types for restart-and-observe scenarios.
//!
//! Entities are produced by an external resource feed; the harness never
//! creates or mutates them, it only snapshots what the feed delivered.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Stable unique key for a tracked entity (namespace/name equivalent).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityKey(pub String);

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EntityKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed host (node) identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HostName(pub String);

impl fmt::Display for HostName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for HostName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for HostName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Lifecycle phase of a tracked entity. `Running` is the nominal
/// steady-state phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Pending => write!(f, "pending"),
            Phase::Running => write!(f, "running"),
            Phase::Succeeded => write!(f, "succeeded"),
            Phase::Failed => write!(f, "failed"),
            Phase::Unknown => write!(f, "unknown"),
        }
    }
}

/// The kind of a feed transition. Display renders the wire labels used in
/// event keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    Added,
    Updated,
    Deleted,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionKind::Added => write!(f, "ADD"),
            TransitionKind::Updated => write!(f, "UPDATE"),
            TransitionKind::Deleted => write!(f, "DEL"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// Snapshot of an externally observed entity at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedEntity {
    pub key: EntityKey,
    pub phase: Phase,
    /// Host the entity is assigned to, if the scheduler has placed it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<HostName>,
    /// Managed-process restart counter observed on the entity.
    #[serde(default)]
    pub restart_count: u64,
}

impl TrackedEntity {
    pub fn new(key: impl Into<EntityKey>, phase: Phase) -> Self {
        Self {
            key: key.into(),
            phase,
            host: None,
            restart_count: 0,
        }
    }

    pub fn with_host(mut self, host: impl Into<HostName>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_restart_count(mut self, count: u64) -> Self {
        self.restart_count = count;
        self
    }
}

/// One incremental change delivered by the feed. A single variant replaces
/// the original trio of add/update/delete callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Added(TrackedEntity),
    Updated {
        old: TrackedEntity,
        new: TrackedEntity,
    },
    Deleted(TrackedEntity),
}

impl Transition {
    pub fn kind(&self) -> TransitionKind {
        match self {
            Transition::Added(_) => TransitionKind::Added,
            Transition::Updated { .. } => TransitionKind::Updated,
            Transition::Deleted(_) => TransitionKind::Deleted,
        }
    }

    /// The latest entity snapshot carried by the transition.
    pub fn entity(&self) -> &TrackedEntity {
        match self {
            Transition::Added(entity) => entity,
            Transition::Updated { new, .. } => new,
            Transition::Deleted(entity) => entity,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
