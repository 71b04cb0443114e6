//! Entity feed seam: an initial full snapshot plus an unbounded sequence of
//! incremental transitions, already filtered to the entities of interest.

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use vigil_core::types::{TrackedEntity, Transition};

use crate::error::MirrorError;

/// One established subscription: the list snapshot taken at subscribe time
/// and the channel of transitions observed after it.
#[derive(Debug)]
pub struct FeedSubscription {
    pub snapshot: Vec<TrackedEntity>,
    pub updates: mpsc::Receiver<Transition>,
}

/// An external list+watch source. Label filtering is the feed's concern;
/// the mirror consumes whatever the subscription delivers.
#[async_trait]
pub trait EntityFeed: Send + Sync + 'static {
    async fn subscribe(&self) -> Result<FeedSubscription, MirrorError>;
}

/// In-memory feed backed by a tokio channel. The returned [`FeedHandle`]
/// pushes transitions into the single subscription; dropping it ends the
/// feed, which the mirror reports as an interruption.
pub struct ChannelFeed {
    snapshot: Vec<TrackedEntity>,
    updates: Mutex<Option<mpsc::Receiver<Transition>>>,
}

impl ChannelFeed {
    pub fn new(snapshot: Vec<TrackedEntity>) -> (Self, FeedHandle) {
        let (tx, rx) = mpsc::channel(64);
        let feed = Self {
            snapshot,
            updates: Mutex::new(Some(rx)),
        };
        (feed, FeedHandle { tx })
    }
}

#[async_trait]
impl EntityFeed for ChannelFeed {
    async fn subscribe(&self) -> Result<FeedSubscription, MirrorError> {
        let updates = self
            .updates
            .lock()
            .await
            .take()
            .ok_or_else(|| MirrorError::Feed("channel feed already subscribed".to_string()))?;
        Ok(FeedSubscription {
            snapshot: self.snapshot.clone(),
            updates,
        })
    }
}

/// Producer side of a [`ChannelFeed`].
#[derive(Clone)]
pub struct FeedHandle {
    tx: mpsc::Sender<Transition>,
}

impl FeedHandle {
    pub async fn push(&self, transition: Transition) -> Result<(), MirrorError> {
        self.tx
            .send(transition)
            .await
            .map_err(|_| MirrorError::Feed("feed consumer dropped".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use vigil_core::types::Phase;

    #[tokio::test]
    async fn subscription_delivers_snapshot_then_updates() {
        let initial = vec![TrackedEntity::new("ns/a", Phase::Running)];
        let (feed, handle) = ChannelFeed::new(initial.clone());

        let mut subscription = feed.subscribe().await.expect("subscribe");
        assert_eq!(subscription.snapshot, initial);

        handle
            .push(Transition::Added(TrackedEntity::new("ns/b", Phase::Pending)))
            .await
            .expect("push");
        let transition = subscription.updates.recv().await.expect("recv");
        assert_eq!(transition.entity().key.0, "ns/b");
    }

    #[tokio::test]
    async fn second_subscription_is_rejected() {
        let (feed, _handle) = ChannelFeed::new(Vec::new());
        feed.subscribe().await.expect("first subscribe");
        let err = feed.subscribe().await.expect_err("second must fail");
        assert!(matches!(err, MirrorError::Feed(_)));
    }

    #[tokio::test]
    async fn push_fails_after_consumer_dropped() {
        let (feed, handle) = ChannelFeed::new(Vec::new());
        let subscription = feed.subscribe().await.expect("subscribe");
        drop(subscription);

        let err = handle
            .push(Transition::Deleted(TrackedEntity::new("ns/a", Phase::Failed)))
            .await
            .expect_err("consumer gone");
        assert!(matches!(err, MirrorError::Feed(_)));
    }
}
