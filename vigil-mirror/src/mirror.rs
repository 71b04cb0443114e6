//! Local mirror of externally observed entities, fed by one background
//! subscription task.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use vigil_core::tracker::EventTracker;
use vigil_core::types::{EntityKey, TrackedEntity, Transition};

use crate::error::MirrorError;
use crate::feed::EntityFeed;

/// Queryable key→entity store kept current by a background feed task.
/// Cloning shares the underlying store and tracker.
#[derive(Clone)]
pub struct ResourceMirror {
    entities: Arc<Mutex<HashMap<EntityKey, TrackedEntity>>>,
    tracker: Arc<EventTracker>,
}

impl ResourceMirror {
    pub fn new(tracker: Arc<EventTracker>) -> Self {
        Self {
            entities: Arc::new(Mutex::new(HashMap::new())),
            tracker,
        }
    }

    /// Spawn the background subscription task. The initial snapshot flows
    /// through the event path as `Added` transitions; every later feed
    /// event is applied in delivery order, no batching.
    pub fn start<F: EntityFeed>(&self, feed: F) -> MirrorHandle {
        let (shutdown, shutdown_rx) = broadcast::channel(1);
        let mirror = self.clone();
        let task = tokio::spawn(async move { mirror_task(mirror, feed, shutdown_rx).await });
        MirrorHandle { shutdown, task }
    }

    /// Atomically replace the store contents with a baseline set, without
    /// producing tracker events. Used to seed a pre-restart snapshot.
    pub fn replace_with(&self, entities: Vec<TrackedEntity>) {
        let mut store = self.entities.lock().expect("entity store lock poisoned");
        store.clear();
        store.extend(
            entities
                .into_iter()
                .map(|entity| (entity.key.clone(), entity)),
        );
    }

    /// Key-set snapshot of the current store contents.
    pub fn keys(&self) -> BTreeSet<EntityKey> {
        let store = self.entities.lock().expect("entity store lock poisoned");
        store.keys().cloned().collect()
    }

    pub fn get(&self, key: &EntityKey) -> Option<TrackedEntity> {
        let store = self.entities.lock().expect("entity store lock poisoned");
        store.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        let store = self.entities.lock().expect("entity store lock poisoned");
        store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tracker(&self) -> &Arc<EventTracker> {
        &self.tracker
    }

    fn apply(&self, transition: Transition) {
        {
            let mut store = self.entities.lock().expect("entity store lock poisoned");
            match &transition {
                Transition::Added(entity) | Transition::Updated { new: entity, .. } => {
                    store.insert(entity.key.clone(), entity.clone());
                }
                Transition::Deleted(entity) => {
                    store.remove(&entity.key);
                }
            }
        }
        self.tracker.record(&transition);
    }
}

async fn mirror_task<F: EntityFeed>(
    mirror: ResourceMirror,
    feed: F,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), MirrorError> {
    let subscription = feed.subscribe().await?;
    for entity in subscription.snapshot {
        mirror.apply(Transition::Added(entity));
    }

    let mut updates = subscription.updates;
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            maybe = updates.recv() => {
                let Some(transition) = maybe else {
                    tracing::warn!("entity feed closed before mirror shutdown");
                    return Err(MirrorError::FeedInterrupted);
                };
                tracing::debug!(kind = %transition.kind(), key = %transition.entity().key, "feed transition");
                mirror.apply(transition);
            }
        }
    }

    Ok(())
}

/// Owner's handle to the background task: a one-shot cancellation signal
/// plus the join handle.
pub struct MirrorHandle {
    shutdown: broadcast::Sender<()>,
    task: JoinHandle<Result<(), MirrorError>>,
}

impl MirrorHandle {
    /// Signal cancellation and await task termination. Returns the task's
    /// own result, so a feed that died before shutdown surfaces here.
    pub async fn stop(self) -> Result<(), MirrorError> {
        let _ = self.shutdown.send(());
        match self.task.await {
            Ok(result) => result,
            Err(err) => Err(MirrorError::Join(err.to_string())),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use vigil_core::types::{Phase, TransitionKind};

    use crate::feed::ChannelFeed;

    fn entity(key: &str, phase: Phase) -> TrackedEntity {
        TrackedEntity::new(key, phase)
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached within 1s");
    }

    #[tokio::test]
    async fn initial_snapshot_flows_through_event_path() {
        let tracker = Arc::new(EventTracker::new());
        let mirror = ResourceMirror::new(tracker.clone());
        let (feed, _handle) = ChannelFeed::new(vec![
            entity("ns/a", Phase::Pending),
            entity("ns/b", Phase::Pending),
        ]);

        let handle = mirror.start(feed);
        wait_until(|| tracker.len() == 2).await;

        assert_eq!(mirror.len(), 2);
        let keys = tracker.list_keys();
        assert!(keys.iter().all(|key| key.contains("ADD:")));

        handle.stop().await.expect("clean stop");
    }

    #[tokio::test]
    async fn transitions_recorded_in_feed_order() {
        let tracker = Arc::new(EventTracker::new());
        let mirror = ResourceMirror::new(tracker.clone());
        let (feed, feed_handle) = ChannelFeed::new(Vec::new());
        let handle = mirror.start(feed);

        feed_handle
            .push(Transition::Added(entity("ns/a", Phase::Pending)))
            .await
            .expect("push add");
        feed_handle
            .push(Transition::Updated {
                old: entity("ns/a", Phase::Pending),
                new: entity("ns/a", Phase::Failed),
            })
            .await
            .expect("push update");
        feed_handle
            .push(Transition::Deleted(entity("ns/a", Phase::Failed)))
            .await
            .expect("push delete");

        wait_until(|| tracker.len() == 3).await;
        let kinds: Vec<TransitionKind> = tracker
            .events()
            .into_iter()
            .map(|event| event.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                TransitionKind::Added,
                TransitionKind::Updated,
                TransitionKind::Deleted,
            ]
        );
        assert!(mirror.is_empty(), "deleted entity must leave the store");

        handle.stop().await.expect("clean stop");
    }

    #[tokio::test]
    async fn steady_state_update_refreshes_store_but_not_history() {
        let tracker = Arc::new(EventTracker::new());
        let mirror = ResourceMirror::new(tracker.clone());
        let (feed, feed_handle) = ChannelFeed::new(Vec::new());
        let handle = mirror.start(feed);

        feed_handle
            .push(Transition::Updated {
                old: entity("ns/a", Phase::Pending),
                new: entity("ns/a", Phase::Running).with_host("node-1"),
            })
            .await
            .expect("push running update");

        wait_until(|| mirror.len() == 1).await;
        assert!(tracker.is_empty(), "running update must be suppressed");
        let stored = mirror.get(&EntityKey::from("ns/a")).expect("stored entity");
        assert_eq!(stored.phase, Phase::Running);

        handle.stop().await.expect("clean stop");
    }

    #[tokio::test]
    async fn replace_with_is_event_silent_and_atomic() {
        let tracker = Arc::new(EventTracker::new());
        let mirror = ResourceMirror::new(tracker.clone());

        mirror.replace_with(vec![
            entity("ns/a", Phase::Running),
            entity("ns/b", Phase::Running),
        ]);
        mirror.replace_with(vec![entity("ns/c", Phase::Running)]);

        assert!(tracker.is_empty(), "baseline seeding must not record events");
        let keys = mirror.keys();
        assert_eq!(keys.len(), 1);
        assert!(keys.contains(&EntityKey::from("ns/c")));
    }

    #[tokio::test]
    async fn stop_cancels_promptly_without_feed_activity() {
        let tracker = Arc::new(EventTracker::new());
        let mirror = ResourceMirror::new(tracker);
        let (feed, _feed_handle) = ChannelFeed::new(Vec::new());

        let handle = mirror.start(feed);
        tokio::time::timeout(Duration::from_secs(1), handle.stop())
            .await
            .expect("stop must not hang")
            .expect("clean stop");
    }

    #[tokio::test]
    async fn feed_closing_surfaces_interruption() {
        let tracker = Arc::new(EventTracker::new());
        let mirror = ResourceMirror::new(tracker);
        let (feed, feed_handle) = ChannelFeed::new(Vec::new());

        let handle = mirror.start(feed);
        drop(feed_handle);
        wait_until(|| handle.is_finished()).await;

        let err = handle.stop().await.expect_err("interruption must surface");
        assert!(matches!(err, MirrorError::FeedInterrupted));
    }

    #[tokio::test]
    async fn before_after_key_sets_support_invariant_checks() {
        use vigil_core::invariant::replica_set_unchanged;

        let tracker = Arc::new(EventTracker::new());
        let baseline = ResourceMirror::new(tracker.clone());
        baseline.replace_with(vec![
            entity("ns/a", Phase::Running),
            entity("ns/b", Phase::Running),
            entity("ns/c", Phase::Running),
        ]);

        let live = ResourceMirror::new(tracker.clone());
        let (feed, feed_handle) = ChannelFeed::new(vec![
            entity("ns/a", Phase::Running),
            entity("ns/b", Phase::Running),
            entity("ns/c", Phase::Running),
        ]);
        let handle = live.start(feed);
        wait_until(|| live.len() == 3).await;

        assert!(replica_set_unchanged(&baseline.keys(), &live.keys()));

        feed_handle
            .push(Transition::Deleted(entity("ns/b", Phase::Failed)))
            .await
            .expect("push delete");
        wait_until(|| live.len() == 2).await;

        assert!(!replica_set_unchanged(&baseline.keys(), &live.keys()));

        handle.stop().await.expect("clean stop");
    }
}
