//! Reference-counted "something is loading" indicator.
//!
//! Every async operation holds a [`BusyGuard`] for its whole lifetime. The
//! guard's `Drop` is the only place the count goes down, so a failed,
//! discarded or dropped operation cannot leak an increment.

use std::cell::Cell;
use std::rc::Rc;

use tokio::sync::watch;

#[derive(Debug)]
struct BusyInner {
    count: Cell<usize>,
    signal: watch::Sender<bool>,
}

/// Aggregates outstanding operations into a single busy flag for the UI.
///
/// Never used for correctness decisions; staleness is decided by sequence
/// tokens.
#[derive(Debug, Clone)]
pub struct BusyTracker {
    inner: Rc<BusyInner>,
}

impl Default for BusyTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl BusyTracker {
    /// Idle tracker.
    #[must_use]
    pub fn new() -> Self {
        let (signal, _) = watch::channel(false);
        Self {
            inner: Rc::new(BusyInner {
                count: Cell::new(0),
                signal,
            }),
        }
    }

    /// Register one outstanding operation until the guard drops.
    #[must_use = "the operation counts as finished as soon as the guard drops"]
    pub fn enter(&self) -> BusyGuard {
        let count = self.inner.count.get() + 1;
        self.inner.count.set(count);
        if count == 1 {
            let _ = self.inner.signal.send_replace(true);
        }
        BusyGuard {
            inner: Rc::clone(&self.inner),
        }
    }

    /// Whether any operation is outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.inner.count.get() > 0
    }

    /// Number of outstanding operations.
    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.count.get()
    }

    /// Receiver that observes busy/idle flips.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.signal.subscribe()
    }
}

/// Scoped registration returned by [`BusyTracker::enter`].
#[derive(Debug)]
pub struct BusyGuard {
    inner: Rc<BusyInner>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let count = self.inner.count.get().saturating_sub(1);
        self.inner.count.set(count);
        if count == 0 {
            let _ = self.inner.signal.send_replace(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_guards_keep_busy_until_last_drop() {
        let busy = BusyTracker::new();
        let signal = busy.subscribe();
        assert!(!busy.is_busy());

        let outer = busy.enter();
        let inner = busy.enter();
        assert_eq!(busy.count(), 2);
        assert!(*signal.borrow());

        drop(outer);
        assert!(busy.is_busy());
        drop(inner);
        assert!(!busy.is_busy());
        assert!(!*signal.borrow());
    }

    #[test]
    fn clones_share_one_counter() {
        let busy = BusyTracker::new();
        let other = busy.clone();
        let guard = other.enter();
        assert_eq!(busy.count(), 1);
        drop(guard);
        assert_eq!(busy.count(), 0);
    }

    #[tokio::test]
    async fn dropped_future_releases_its_guard() {
        let busy = BusyTracker::new();
        let tracker = busy.clone();
        let pending = async move {
            let _guard = tracker.enter();
            std::future::pending::<()>().await;
        };
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(5), pending)
                .await;
        assert!(timed_out.is_err());
        assert_eq!(busy.count(), 0);
    }
}
