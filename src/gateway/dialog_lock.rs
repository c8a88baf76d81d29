//! Single-flight gate for the session-expired dialog.

use std::sync::atomic::{AtomicBool, Ordering};

/// Ensures at most one session-expired dialog is open at a time.
///
/// Concurrent token-invalid failures race for the gate; only the winner gets
/// a guard, everyone else is a no-op. Dropping the guard reopens the gate.
#[derive(Debug, Default)]
pub struct ErrorDialogLock {
    held: AtomicBool,
}

impl ErrorDialogLock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the gate if it is open.
    #[must_use]
    pub fn try_acquire(&self) -> Option<DialogLockGuard<'_>> {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DialogLockGuard { lock: self })
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

/// Holds the dialog gate until dropped.
#[derive(Debug)]
pub struct DialogLockGuard<'a> {
    lock: &'a ErrorDialogLock,
}

impl Drop for DialogLockGuard<'_> {
    fn drop(&mut self) {
        self.lock.held.store(false, Ordering::Release);
    }
}
