//! Per-key critical sections
//!
//! Ledger writers for the same vehicle or card queue behind one async mutex;
//! writers for different keys never contend. Readers do not use these locks.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Default)]
pub struct KeyedLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other writer holds `key`, then hold it until the guard drops.
    pub async fn acquire(&self, key: Uuid) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Number of keys that have ever been locked
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn same_key_is_serialized() {
        let locks = Arc::new(KeyedLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let key = Uuid::new_v4();

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let inside = inside.clone();
            tasks.push(tokio::spawn(async move {
                let _guard = locks.acquire(key).await;
                assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                tokio::time::sleep(Duration::from_millis(2)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(locks.len(), 1);
    }

    #[tokio::test]
    async fn different_keys_do_not_block() {
        let locks = KeyedLocks::new();
        let _a = locks.acquire(Uuid::new_v4()).await;
        let b = tokio::time::timeout(Duration::from_millis(50), locks.acquire(Uuid::new_v4())).await;
        assert!(b.is_ok());
    }
}
