//! Per-project deployment lock

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

/// Table of per-repository busy flags
///
/// Slots are created on first reference and live for the lifetime of the
/// table. The inner mutex only guards slot creation; acquiring a slot is a
/// single compare-and-swap, so unrelated repositories never wait on each
/// other.
#[derive(Debug, Default)]
pub struct LockTable {
    slots: Mutex<HashMap<String, Arc<AtomicBool>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, repository: &str) -> Arc<AtomicBool> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots
            .entry(repository.to_string())
            .or_insert_with(|| Arc::new(AtomicBool::new(false)))
            .clone()
    }

    /// Try to mark `repository` busy. Never waits.
    pub fn try_acquire(&self, repository: &str) -> bool {
        let acquired = self
            .slot(repository)
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        debug!(repository, acquired, "Deployment lock attempt");
        acquired
    }

    /// Mark `repository` free. Releasing a free slot is a no-op.
    pub fn release(&self, repository: &str) {
        self.slot(repository).store(false, Ordering::Release);
        debug!(repository, "Deployment lock released");
    }

    /// Like [`try_acquire`](Self::try_acquire) but returns a guard that
    /// releases the slot when dropped, on every exit path including unwinding.
    pub fn acquire(&self, repository: &str) -> Option<DeploymentGuard<'_>> {
        if self.try_acquire(repository) {
            Some(DeploymentGuard {
                table: self,
                repository: repository.to_string(),
            })
        } else {
            None
        }
    }

    pub fn is_held(&self, repository: &str) -> bool {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots
            .get(repository)
            .map(|slot| slot.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    /// Number of slots ever created
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Held deployment slot
#[derive(Debug)]
pub struct DeploymentGuard<'a> {
    table: &'a LockTable,
    repository: String,
}

impl DeploymentGuard<'_> {
    pub fn repository(&self) -> &str {
        &self.repository
    }
}

impl Drop for DeploymentGuard<'_> {
    fn drop(&mut self) {
        self.table.release(&self.repository);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_second_acquire_fails() {
        let table = LockTable::new();
        assert!(table.try_acquire("team/api"));
        assert!(!table.try_acquire("team/api"));
        assert!(table.is_held("team/api"));
    }

    #[test]
    fn test_release_then_acquire() {
        let table = LockTable::new();
        assert!(table.try_acquire("team/api"));
        table.release("team/api");
        assert!(!table.is_held("team/api"));
        assert!(table.try_acquire("team/api"));
    }

    #[test]
    fn test_distinct_projects_independent() {
        let table = LockTable::new();
        assert!(table.try_acquire("team/api"));
        assert!(table.try_acquire("team/web"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let table = LockTable::new();
        {
            let guard = table.acquire("team/api").unwrap();
            assert_eq!(guard.repository(), "team/api");
            assert!(table.acquire("team/api").is_none());
        }
        assert!(!table.is_held("team/api"));
        assert!(table.acquire("team/api").is_some());
    }

    #[test]
    fn test_guard_releases_on_panic() {
        let table = LockTable::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = table.acquire("team/api").unwrap();
            panic!("step blew up");
        }));
        assert!(result.is_err());
        assert!(!table.is_held("team/api"));
    }

    #[test]
    fn test_slots_persist_after_release() {
        let table = LockTable::new();
        assert!(table.is_empty());
        drop(table.acquire("team/api"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_concurrent_acquire_single_winner() {
        for _ in 0..50 {
            let table = Arc::new(LockTable::new());
            let barrier = Arc::new(Barrier::new(8));

            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let table = table.clone();
                    let barrier = barrier.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        table.try_acquire("team/api")
                    })
                })
                .collect();

            let winners = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|acquired| *acquired)
                .count();
            assert_eq!(winners, 1);
        }
    }
}
