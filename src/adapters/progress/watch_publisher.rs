//! Latest-value progress channel.
//!
//! Backed by `tokio::sync::watch`: observers always see the most recent
//! snapshot and never block the publisher. A slow observer simply skips
//! intermediate snapshots.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tokio::sync::watch;

use crate::domain::progress::ProgressSnapshot;
use crate::ports::ProgressPublisher;

/// Handle returned by [`WatchProgressPublisher::subscribe`].
#[derive(Debug)]
pub struct ProgressSubscription {
    id: u64,
    receiver: watch::Receiver<Option<ProgressSnapshot>>,
}

impl ProgressSubscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Most recent snapshot, if any was published.
    pub fn latest(&self) -> Option<ProgressSnapshot> {
        self.receiver.borrow().clone()
    }

    /// Waits for the next snapshot. Returns `None` once the publisher is gone.
    pub async fn next(&mut self) -> Option<ProgressSnapshot> {
        self.receiver.changed().await.ok()?;
        self.receiver.borrow_and_update().clone()
    }
}

/// Publishes snapshots to any number of subscribers.
#[derive(Debug)]
pub struct WatchProgressPublisher {
    sender: watch::Sender<Option<ProgressSnapshot>>,
    active: Mutex<HashSet<u64>>,
    next_id: AtomicU64,
}

impl Default for WatchProgressPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchProgressPublisher {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender,
            active: Mutex::new(HashSet::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn active(&self) -> MutexGuard<'_, HashSet<u64>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe(&self) -> ProgressSubscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.active().insert(id);
        ProgressSubscription {
            id,
            receiver: self.sender.subscribe(),
        }
    }

    /// Drops the subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, subscription: ProgressSubscription) -> bool {
        self.active().remove(&subscription.id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.active().len()
    }

    pub fn latest(&self) -> Option<ProgressSnapshot> {
        self.sender.borrow().clone()
    }
}

impl ProgressPublisher for WatchProgressPublisher {
    fn publish(&self, snapshot: &ProgressSnapshot) {
        self.sender.send_replace(Some(snapshot.clone()));
    }
}
