//! Decouples completion notification from the request-testing hot path.

use crate::error::abort_with_diagnostic;
use tampi_channel::spsc::BoundedQueue;

/// Fixed capacity of the completion queue (`Size` in the original design).
pub const CAPACITY: usize = 32 * 1024;

/// Something that can be told one of its registered operations finished.
///
/// The completion queue must call back through the owning ticket's own completion path (which
/// accounts for how many operations it is still waiting on) rather than unblocking a task
/// directly; otherwise a ticket composing several operations (`Iwaitall`) would release its task
/// after the first of them completes instead of the last.
pub trait Completable {
    /// Marks one operation on this handle complete.
    fn complete(&self);
}

/// A bounded SPSC-style queue of ticket handles awaiting their final event completion.
///
/// The request polling task transfers handles here instead of completing them inline, keeping
/// its own tick latency independent of however long unblocking a task takes; a second polling
/// task drains the queue separately.
pub struct CompletionManager<C: Completable> {
    queue: BoundedQueue<C>,
    enabled: bool,
}

impl<C: Completable> CompletionManager<C> {
    /// Creates a completion manager. `enabled` mirrors `TAMPI_POLLING_TASK_COMPLETION`.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            queue: BoundedQueue::new(CAPACITY),
            enabled,
        }
    }

    /// Whether the completion polling task should be registered at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Transfers every handle in `handles` onto the completion queue.
    ///
    /// Aborts if any push fails: the queue is sized well above the hard cap on in-flight
    /// requests, so a failed push here means the request polling task outran the completion
    /// polling task to an extent the design does not expect to be recoverable.
    pub fn transfer(&self, handles: Vec<C>) {
        let expected = handles.len();
        let mut pushed = 0;
        for handle in handles {
            if self.queue.try_push(handle).is_err() {
                break;
            }
            pushed += 1;
        }
        if pushed != expected {
            abort_with_diagnostic("failed to transfer completion handles to the completion queue");
        }
    }

    /// Drains every handle currently queued, completing its pending operation.
    ///
    /// Returns the number of handles processed.
    pub fn process(&self) -> usize {
        let batch = self.queue.pop_batch(CAPACITY);
        let n = batch.len();
        for handle in batch {
            handle.complete();
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Task, TaskContext};
    use crate::testing::FakeTask;
    use std::sync::Mutex;

    struct SingleShot(Mutex<TaskContext<FakeTask>>);

    impl Completable for SingleShot {
        fn complete(&self) {
            self.0.lock().unwrap().complete(1, true);
        }
    }

    #[test]
    fn transfer_then_process_unblocks_contexts() {
        let manager: CompletionManager<SingleShot> = CompletionManager::new(true);
        let task = FakeTask::new();
        let ctx = TaskContext::new(true, task.clone());
        manager.transfer(vec![SingleShot(Mutex::new(ctx))]);
        assert_eq!(manager.process(), 1);
        assert!(task.is_unblocked());
    }

    #[test]
    fn process_on_empty_queue_returns_zero() {
        let manager: CompletionManager<SingleShot> = CompletionManager::new(true);
        assert_eq!(manager.process(), 0);
    }
}
