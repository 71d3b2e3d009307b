//! Per-warehouse mutual exclusion.
//!
//! Every capacity-affecting operation reads a warehouse counter, checks it, and
//! writes it back in separate store calls. Holding the warehouse's lock across
//! that read-check-write keeps two concurrent callers from both passing the
//! ceiling check. Operations touching two warehouses (moves) take both locks in
//! ascending id order so they cannot deadlock against each other.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use thiserror::Error;

use cragsupply_core::WarehouseId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    #[error("lock poisoned: {0}")]
    Poisoned(String),

    #[error("timed out waiting for warehouse {0}")]
    Timeout(WarehouseId),

    /// The target kept changing between lookup and lock acquisition.
    #[error("contended: {0}")]
    Contended(String),
}

/// One warehouse's lock: `Mutex<bool>` + `Condvar`, so it can be held by an
/// owned guard instead of a borrow.
#[derive(Debug, Default)]
struct WarehouseLock {
    held: Mutex<bool>,
    wake: Condvar,
}

impl WarehouseLock {
    fn acquire(&self, id: WarehouseId, timeout: Option<Duration>) -> Result<(), LockError> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut held = self
            .held
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))?;

        while *held {
            held = match deadline {
                None => self
                    .wake
                    .wait(held)
                    .map_err(|e| LockError::Poisoned(e.to_string()))?,
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Err(LockError::Timeout(id));
                    }
                    self.wake
                        .wait_timeout(held, remaining)
                        .map_err(|e| LockError::Poisoned(e.to_string()))?
                        .0
                }
            };
        }

        *held = true;
        Ok(())
    }

    fn release(&self) {
        // A poisoned flag is still cleared so other waiters can make progress.
        let mut held = match self.held.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *held = false;
        self.wake.notify_one();
    }
}

type LockMap = Mutex<HashMap<WarehouseId, Arc<WarehouseLock>>>;

/// Lock manager handing out one lock per warehouse id.
///
/// Entries are created on first use and dropped again when the last guard or
/// waiter lets go, so ids that are never reused (or never existed) do not
/// accumulate.
#[derive(Debug)]
pub struct WarehouseLocks {
    locks: Arc<LockMap>,
    timeout: Option<Duration>,
}

impl WarehouseLocks {
    /// `timeout = None` waits indefinitely.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            locks: Arc::new(Mutex::new(HashMap::new())),
            timeout,
        }
    }

    fn lock_for(&self, id: WarehouseId) -> Result<Arc<WarehouseLock>, LockError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| LockError::Poisoned("warehouse lock map poisoned".into()))?;
        Ok(locks.entry(id).or_default().clone())
    }

    /// Number of warehouse ids that currently have a lock entry.
    pub fn tracked(&self) -> usize {
        match self.locks.lock() {
            Ok(locks) => locks.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Acquire the locks of every warehouse in `ids` (duplicates allowed).
    ///
    /// Locks are taken in ascending id order. If any acquisition fails the ones
    /// already held are released before returning.
    pub fn acquire(&self, ids: &[WarehouseId]) -> Result<WarehouseGuard, LockError> {
        let mut ordered = ids.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let mut guard = WarehouseGuard {
            held: Vec::with_capacity(ordered.len()),
            locks: self.locks.clone(),
        };
        for id in ordered {
            let lock = self.lock_for(id)?;
            if let Err(e) = lock.acquire(id, self.timeout) {
                drop(lock);
                forget_if_unused(&guard.locks, id);
                return Err(e);
            }
            guard.held.push((id, lock));
            tracing::trace!(warehouse_id = %id, "warehouse lock acquired");
        }
        Ok(guard)
    }
}

impl Default for WarehouseLocks {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Owned guard over one or more warehouse locks; releases them on drop.
#[derive(Debug)]
#[must_use = "dropping the guard releases the warehouse locks"]
pub struct WarehouseGuard {
    held: Vec<(WarehouseId, Arc<WarehouseLock>)>,
    locks: Arc<LockMap>,
}

impl WarehouseGuard {
    pub fn covers(&self, id: WarehouseId) -> bool {
        self.held.iter().any(|(held, _)| *held == id)
    }
}

impl Drop for WarehouseGuard {
    fn drop(&mut self) {
        while let Some((id, lock)) = self.held.pop() {
            lock.release();
            drop(lock);
            forget_if_unused(&self.locks, id);
        }
    }
}

/// Remove `id`'s entry when only the map still refers to it. Clones are only
/// taken under the map mutex, so a count of one means no holder or waiter.
fn forget_if_unused(locks: &LockMap, id: WarehouseId) {
    let mut locks = match locks.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if locks.get(&id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
        locks.remove(&id);
    }
}
