// Per key serialization of asynchronous operations.
//
// Purpose
// - Admit one in flight operation per key, in arrival order, while distinct keys run in parallel.
//
// Responsibilities
// - Chain every call behind the slot that was last registered for its key.
// - Release the slot on success, failure, panic or cancellation, and forget the key once
//   nothing else has claimed it.
//
// Boundaries
// - State lives in this process only. The persisted record version stays the conflict detector.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("operation did not settle within {timeout_ms}ms")]
pub struct OperationTimedOut {
    pub timeout_ms: u64,
}

struct LockSlot {
    released: watch::Receiver<bool>,
    // Cleared once the owner starts running; kept while it is still queued so that
    // successors can reach the real holder if the owner is cancelled.
    previous: Mutex<Option<Arc<LockSlot>>>,
}

impl LockSlot {
    fn is_released(&self) -> bool {
        *self.released.borrow()
    }

    fn previous(&self) -> Option<Arc<LockSlot>> {
        lock(&self.previous).clone()
    }

    /// Nearest slot in the chain whose owner has not finished yet.
    fn first_pending_predecessor(&self) -> Option<Arc<LockSlot>> {
        let mut candidate = self.previous();
        while let Some(slot) = candidate {
            if !slot.is_released() {
                return Some(slot);
            }
            candidate = slot.previous();
        }
        None
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct KeyedSerializer<K = String> {
    slots: Mutex<HashMap<K, Arc<LockSlot>>>,
    operation_timeout: Option<Duration>,
}

impl<K> Default for KeyedSerializer<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            operation_timeout: None,
        }
    }
}

impl<K> KeyedSerializer<K>
where
    K: Eq + Hash + Clone + Debug + Send + Sync,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds how long an operation may hold its slot once it has started.
    pub fn with_operation_timeout(timeout: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            operation_timeout: Some(timeout),
        }
    }

    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout
    }

    /// Runs `operation` once every call registered earlier for `key` has finished.
    ///
    /// Registration happens on the first poll, so calls entering in order A, B start their
    /// operations in order A, B. The outcome of `operation` is returned as is; a failure does
    /// not affect calls queued behind it.
    pub async fn run<F, Fut, T, E>(&self, key: K, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<OperationTimedOut>,
    {
        let release = self.enter(key);
        release.wait_turn().await;
        tracing::debug!(key = ?release.key, "slot acquired");

        let outcome = match self.operation_timeout {
            None => operation().await,
            Some(timeout) => match tokio::time::timeout(timeout, operation()).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(
                        key = ?release.key,
                        timeout_ms = timeout.as_millis() as u64,
                        "operation timed out, releasing slot"
                    );
                    Err(E::from(OperationTimedOut {
                        timeout_ms: timeout.as_millis() as u64,
                    }))
                }
            },
        };

        drop(release);
        outcome
    }

    pub fn is_locked(&self, key: &K) -> bool {
        lock(&self.slots).contains_key(key)
    }

    /// Number of keys with an operation running or queued.
    pub fn active_keys(&self) -> usize {
        lock(&self.slots).len()
    }

    fn enter(&self, key: K) -> SlotRelease<'_, K> {
        let (signal, released) = watch::channel(false);
        let mut slots = lock(&self.slots);
        let slot = Arc::new(LockSlot {
            released,
            previous: Mutex::new(slots.get(&key).cloned()),
        });
        slots.insert(key.clone(), slot.clone());
        SlotRelease {
            slots: &self.slots,
            key,
            slot,
            signal,
        }
    }
}

struct SlotRelease<'a, K: Eq + Hash> {
    slots: &'a Mutex<HashMap<K, Arc<LockSlot>>>,
    key: K,
    slot: Arc<LockSlot>,
    signal: watch::Sender<bool>,
}

impl<K: Eq + Hash> SlotRelease<'_, K> {
    async fn wait_turn(&self) {
        let mut pending = self.slot.previous();
        while let Some(previous) = pending {
            let mut released = previous.released.clone();
            // A closed channel means the owner is gone, which also releases the slot.
            let _ = released.wait_for(|done| *done).await;
            pending = previous.previous();
        }
        lock(&self.slot.previous).take();
    }
}

impl<K: Eq + Hash> Drop for SlotRelease<'_, K> {
    fn drop(&mut self) {
        // Signal before touching the map: a predecessor scan running concurrently must
        // observe this slot as released.
        self.signal.send_replace(true);

        let mut slots = lock(self.slots);
        let Some(current) = slots.get_mut(&self.key) else {
            return;
        };
        if !Arc::ptr_eq(current, &self.slot) {
            return;
        }
        match self.slot.first_pending_predecessor() {
            // Cancelled while queued: hand the entry back to the slot still holding the key.
            Some(holder) => *current = holder,
            None => {
                slots.remove(&self.key);
            }
        }
    }
}
