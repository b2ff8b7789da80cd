//! Per-fingerprint write discipline
//!
//! Two uploads of identical bytes must converge on one profile, so everything
//! from the dedup check to the profile write runs under a lock keyed by the
//! fingerprint. Entries are weak; a key's lock is dropped once no holder or
//! waiter remains.

use smarthire_domain::Fingerprint;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Key-scoped async locks
#[derive(Debug, Default)]
pub struct FingerprintLocks {
    locks: Mutex<HashMap<Fingerprint, Weak<AsyncMutex<()>>>>,
}

impl FingerprintLocks {
    /// Create an empty lock table
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `fingerprint`
    pub async fn acquire(&self, fingerprint: Fingerprint) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, weak| weak.strong_count() > 0);
            match locks.get(&fingerprint).and_then(Weak::upgrade) {
                Some(lock) => lock,
                None => {
                    let lock = Arc::new(AsyncMutex::new(()));
                    locks.insert(fingerprint, Arc::downgrade(&lock));
                    lock
                }
            }
        };
        lock.lock_owned().await
    }

    /// Number of fingerprints currently held or awaited
    pub fn active(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}
