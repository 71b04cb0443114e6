//! Error types for vigil-mirror.

use thiserror::Error;

/// Error surface for feed subscriptions and the mirror background task.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The feed ended on its own before the owner asked the mirror to
    /// stop. Surfaced rather than swallowed: a silently stale mirror would
    /// mask real invariant violations.
    #[error("entity feed ended unexpectedly")]
    FeedInterrupted,

    /// The feed could not produce a subscription or deliver an event.
    #[error("entity feed error: {0}")]
    Feed(String),

    /// The background task could not be joined.
    #[error("mirror task join failure: {0}")]
    Join(String),
}
