//! Adapters onto the host tasking runtime's task-events API.
//!
//! The host tasking runtime itself is an external collaborator (its concrete type is never
//! named here); [`Task`] and [`TaskingRuntime`] are the seams the rest of the crate is generic
//! over, so the ticket manager and polling subsystem can be built and tested without linking one.

use std::future::Future;

/// A handle onto one task of the host tasking runtime.
///
/// Implementations are expected to be cheap to clone (e.g. a reference-counted or raw handle)
/// since a handle is carried inside every in-flight [`crate::ticket::Ticket`].
pub trait Task: Clone {
    /// Registers `n` additional external events on this task, preventing it from being
    /// considered complete until they are later completed.
    fn bind_events(&self, n: u32);

    /// Completes `n` external events previously bound to this task.
    fn complete_events(&self, n: u32);

    /// Releases the task from its blocking wait. Only called when the owning
    /// [`TaskContext`](crate::task::TaskContext) is in blocking mode and its last event has
    /// completed.
    fn unblock(&self);

    /// Blocks the calling task until [`unblock`](Task::unblock) is called on the same handle.
    /// Only valid to call on the task's own handle, from the task itself.
    fn block(&self);
}

/// The pairing of a task handle with whether it is waiting in blocking or non-blocking mode.
///
/// This is the Rust equivalent of the original design's per-ticket task context: a blocking
/// ticket's task suspends in `wait`, while a non-blocking ticket's task only has its external
/// event count adjusted and is never suspended by this crate.
#[derive(Debug, Clone)]
pub struct TaskContext<T: Task> {
    blocking: bool,
    handle: T,
}

impl<T: Task> TaskContext<T> {
    /// Creates a task context bound to `handle`.
    pub fn new(blocking: bool, handle: T) -> Self {
        Self { blocking, handle }
    }

    /// Whether this context operates in blocking mode.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    /// Returns the underlying task handle.
    pub fn handle(&self) -> &T {
        &self.handle
    }

    /// Binds `n` external events to the task, a no-op in blocking mode (the caller task is
    /// already waiting and has nothing to track).
    pub fn bind(&self, n: u32) {
        debug_assert!(n > 0);
        if !self.blocking {
            self.handle.bind_events(n);
        }
    }

    /// Completes `n` events. When `all_completed` is true and the context is blocking, unblocks
    /// the waiting task instead of adjusting an event counter.
    pub fn complete(&self, n: u32, all_completed: bool) {
        debug_assert!(n > 0);
        if !self.blocking {
            self.handle.complete_events(n);
        } else if all_completed {
            self.handle.unblock();
        }
    }

    /// Blocks the current task until its events complete. Only valid when `is_blocking()`.
    pub fn wait(&self) {
        debug_assert!(self.blocking, "wait() called on a non-blocking task context");
        self.handle.block();
    }
}

/// The host tasking runtime surface the polling subsystem and pre-queues need: identifying the
/// calling task, the CPU topology used to partition per-CPU queues and allocator caches, and a
/// place to run a long-lived polling loop without depending on any concrete async runtime.
pub trait TaskingRuntime {
    /// The task handle type this runtime hands out.
    type Task: Task;

    /// Returns a handle to the task currently executing on the calling thread.
    fn current_task(&self) -> Self::Task;

    /// Returns the logical CPU index the calling thread is currently running on.
    fn current_cpu(&self) -> usize;

    /// Returns the total number of logical CPUs the runtime schedules tasks across.
    fn num_cpus(&self) -> usize;

    /// Registers `body` as a long-running polling task identified by `name`.
    ///
    /// Mirrors `nanos6_register_polling_service`: the runtime runs `body` to completion in the
    /// background; `body` is expected to loop internally (using [`suspend`](Self::suspend)
    /// between ticks) until its own stop condition is observed.
    fn register_polling<F>(&self, name: &'static str, body: F)
    where
        F: Future<Output = ()> + Send + 'static;

    /// Suspends the calling task for `micros` microseconds.
    fn suspend(&self, micros: u64) -> impl Future<Output = ()> + Send;
}
