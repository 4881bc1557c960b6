use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use crate::model::ResourceId;

pub type ResourceLock = Arc<RwLock<()>>;

/// One read/write lock per resource, created on first use and kept for the
/// registry's lifetime.
///
/// Locks never get evicted, so the registry grows with the number of distinct
/// resource ids ever referenced. Lazy creation goes through the `DashMap`
/// entry API: racing first uses of the same id serialize on that id's shard
/// and all observe the same lock.
///
/// tokio's `RwLock` is fair: waiters are queued FIFO, so a writer is never
/// starved by a stream of readers and vice versa.
#[derive(Default)]
pub struct LockRegistry {
    locks: DashMap<ResourceId, ResourceLock>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, resource_id: &ResourceId) -> ResourceLock {
        if let Some(lock) = self.locks.get(resource_id) {
            return Arc::clone(lock.value());
        }
        let lock = Arc::clone(
            self.locks
                .entry(resource_id.clone())
                .or_insert_with(|| Arc::new(RwLock::new(())))
                .value(),
        );
        metrics::gauge!(crate::observability::RESOURCE_LOCKS).set(self.locks.len() as f64);
        lock
    }

    /// Exclusive access to a resource's bookings. Released on drop.
    pub async fn write(&self, resource_id: &ResourceId) -> OwnedRwLockWriteGuard<()> {
        self.lock_for(resource_id).write_owned().await
    }

    /// Shared access to a resource's bookings. Released on drop.
    pub async fn read(&self, resource_id: &ResourceId) -> OwnedRwLockReadGuard<()> {
        self.lock_for(resource_id).read_owned().await
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }
}
