//! Background mirror of an external resource feed.
//!
//! Public API surface:
//! - [`feed`] — [`EntityFeed`] seam, [`ChannelFeed`] in-memory feed
//! - [`mirror`] — [`ResourceMirror`], [`MirrorHandle`]
//! - [`error`] — [`MirrorError`]

pub mod error;
pub mod feed;
pub mod mirror;

pub use error::MirrorError;
pub use feed::{ChannelFeed, EntityFeed, FeedHandle, FeedSubscription};
pub use mirror::{MirrorHandle, ResourceMirror};
