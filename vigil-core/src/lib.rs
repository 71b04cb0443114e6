//! Vigil core library — domain types, event tracking, invariant checks.
//!
//! Public API surface:
//! - [`types`] — newtypes, entity snapshots, transitions
//! - [`tracker`] — [`EventTracker`] serial event history
//! - [`invariant`] — before/after invariant checks
//! - [`error`] — [`InvariantViolation`]

pub mod error;
pub mod invariant;
pub mod tracker;
pub mod types;

pub use error::InvariantViolation;
pub use invariant::{replica_set_unchanged, restart_counts_by_host, InvariantChecker};
pub use tracker::{EventTracker, LifecycleEvent};
pub use types::{EntityKey, HostName, Phase, TrackedEntity, Transition, TransitionKind};
