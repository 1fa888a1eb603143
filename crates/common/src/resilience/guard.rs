//! Single-flight guard for critical sequences
//!
//! [`ReentrancyGuard::try_enter`] is a compare-and-swap on an atomic flag: the
//! first caller gets a [`ReentrancyPermit`], every concurrent caller gets
//! `None` and must not run the guarded sequence. Dropping the permit clears
//! the flag, including on early return or panic unwinding.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    active: AtomicBool,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim the guard; `None` if another caller holds it
    pub fn try_enter(&self) -> Option<ReentrancyPermit<'_>> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ReentrancyPermit { guard: self })
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Held while the guarded sequence runs
#[derive(Debug)]
#[must_use = "the guard is released as soon as the permit is dropped"]
pub struct ReentrancyPermit<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for ReentrancyPermit<'_> {
    fn drop(&mut self) {
        self.guard.active.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn second_entry_is_refused_while_held() {
        let guard = ReentrancyGuard::new();

        let permit = guard.try_enter();
        assert!(permit.is_some());
        assert!(guard.is_active());
        assert!(guard.try_enter().is_none());

        drop(permit);
        assert!(!guard.is_active());
        assert!(guard.try_enter().is_some());
    }

    #[test]
    fn exactly_one_thread_enters() {
        let guard = Arc::new(ReentrancyGuard::new());
        let barrier = Arc::new(std::sync::Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = Arc::clone(&guard);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    let permit = guard.try_enter();
                    let entered = permit.is_some();
                    // hold the permit until every thread has tried
                    barrier.wait();
                    entered
                })
            })
            .collect();

        let entered = handles.into_iter().filter_map(|h| h.join().ok()).filter(|e| *e).count();
        assert_eq!(entered, 1);
        assert!(!guard.is_active());
    }
}
