//! Error types for vigil-core.

use thiserror::Error;

/// A detected breach of an expected post-restart property. Carries enough
/// context (differing keys, per-host deltas, the full event render) to
/// diagnose the failure without re-running the scenario.
#[derive(Debug, Error)]
pub enum InvariantViolation {
    /// The controlling authority created or removed entities across the
    /// restart window.
    #[error(
        "replica set changed across restart: {before_count} before vs {after_count} after; \
         created [{created}]; removed [{removed}]\ntracked events:\n{events}"
    )]
    ReplicasChanged {
        before_count: usize,
        after_count: usize,
        created: String,
        removed: String,
        events: String,
    },

    /// Managed processes restarted while the daemon was cycling.
    #[error("unexpected managed restarts: {deltas}\ntracked events:\n{events}")]
    UnexpectedRestarts { deltas: String, events: String },
}
