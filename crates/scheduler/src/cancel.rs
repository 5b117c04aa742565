//! Cancellation tokens for deferred tasks
//!
//! A token is handed out when a task is scheduled. Cancelling it is enough to
//! stop the task from firing; the queue drops cancelled entries lazily.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Shared cancellation flag
///
/// Clones observe the same state, so the scheduler can keep one copy while
/// the caller holds another.
///
/// # Example
///
/// ```
/// use pdf_studio_scheduler::CancellationToken;
///
/// let token = CancellationToken::new();
/// let queued = token.clone();
///
/// token.cancel();
/// assert!(queued.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new token in the non-cancelled state
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancel this token and every clone of it
    ///
    /// Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check if this token has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_new_token_is_live() {
        assert!(!CancellationToken::new().is_cancelled());
        assert!(!CancellationToken::default().is_cancelled());
    }

    #[test]
    fn test_cancel_is_seen_by_clones() {
        let handle = CancellationToken::new();
        let queued = handle.clone();

        handle.cancel();
        handle.cancel();
        assert!(queued.is_cancelled());
    }

    #[test]
    fn test_cancel_crosses_threads() {
        let token = CancellationToken::new();
        let remote = token.clone();

        thread::spawn(move || remote.cancel())
            .join()
            .expect("cancelling thread should not panic");
        assert!(token.is_cancelled());
    }
}
