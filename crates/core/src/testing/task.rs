use crate::task::Task;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

struct Inner {
    events: AtomicU32,
    blocked: AtomicBool,
    unblocked: AtomicBool,
}

/// A deterministic, in-process [`Task`] handle usable from tests.
#[derive(Clone)]
pub struct FakeTask(Arc<Inner>);

impl Default for FakeTask {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeTask {
    /// Creates a task handle with zero bound events, not blocked.
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(Inner {
            events: AtomicU32::new(0),
            blocked: AtomicBool::new(false),
            unblocked: AtomicBool::new(false),
        }))
    }

    /// Current count of bound-but-not-completed external events.
    #[must_use]
    pub fn pending_events(&self) -> u32 {
        self.0.events.load(Ordering::SeqCst)
    }

    /// Whether [`Task::block`] was called and [`Task::unblock`] has not yet followed.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.0.blocked.load(Ordering::SeqCst)
    }

    /// Whether [`Task::unblock`] has ever been called on this handle.
    #[must_use]
    pub fn is_unblocked(&self) -> bool {
        self.0.unblocked.load(Ordering::SeqCst)
    }
}

impl Task for FakeTask {
    fn bind_events(&self, n: u32) {
        let _ = self.0.events.fetch_add(n, Ordering::SeqCst);
    }

    fn complete_events(&self, n: u32) {
        let _ = self.0.events.fetch_sub(n, Ordering::SeqCst);
    }

    fn unblock(&self) {
        self.0.unblocked.store(true, Ordering::SeqCst);
        self.0.blocked.store(false, Ordering::SeqCst);
    }

    fn block(&self) {
        self.0.blocked.store(true, Ordering::SeqCst);
    }
}
