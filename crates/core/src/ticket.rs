//! The completion record attached to one or more operations sharing a task context.

use crate::task::{Task, TaskContext};

/// Where a completed request's status is deposited, captured once at ticket-creation time.
///
/// Modeled as a callback rather than a raw status pointer: the "ignore" decision is captured up
/// front (an absent sink), and multi-status writes (`Iwaitall`) are expressed the same way as
/// single-status writes, just with a sink that indexes into the caller's array at `position`.
pub type StatusSink<S> = Option<Box<dyn FnMut(S, usize) + Send>>;

/// Tracks the completion of one or more operations issued by the same task.
///
/// A ticket starts tracking a single operation; composing entry points (`Iwaitall`) that share
/// one ticket across several already-issued requests call [`add_pending_operations`] up front so
/// the task is only released once every one of them has reported completion, not the first.
///
/// [`add_pending_operations`]: Self::add_pending_operations
pub struct Ticket<T: Task, S> {
    task_context: TaskContext<T>,
    status_sink: StatusSink<S>,
    remaining: u32,
}

impl<T: Task, S> Ticket<T, S> {
    /// Creates a ticket tracking a single pending operation, whose status goes to `status_sink`
    /// (`None` to ignore it entirely).
    pub fn new(task_context: TaskContext<T>, status_sink: StatusSink<S>) -> Self {
        Self {
            task_context,
            status_sink,
            remaining: 1,
        }
    }

    /// The owning task's context.
    pub fn task_context(&self) -> &TaskContext<T> {
        &self.task_context
    }

    /// Registers `num` additional pending operations on this ticket, on top of the one it
    /// started with. In non-blocking mode this also binds `num` external events on the owning
    /// task; in blocking mode the ticket's own counter is what determines when the task unblocks,
    /// since [`TaskContext::bind`] is a no-op there.
    pub fn add_pending_operations(&mut self, num: u32) {
        self.remaining += num;
        self.task_context.bind(num);
    }

    /// Marks one operation on this ticket complete. Only releases the owning task once every
    /// operation registered on this ticket (the initial one plus any added via
    /// [`add_pending_operations`](Self::add_pending_operations)) has completed.
    pub fn complete(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
        self.task_context.complete(1, self.remaining == 0);
    }

    /// Blocks the current task until all of this ticket's operations complete.
    ///
    /// Only valid for tickets of blocking operations.
    pub fn wait(&self) {
        self.task_context.wait();
    }

    /// Whether this ticket's statuses are discarded rather than written anywhere.
    #[must_use]
    pub fn ignores_status(&self) -> bool {
        self.status_sink.is_none()
    }

    /// Stores `status` at `position` in the caller's status array, unless this ticket ignores
    /// statuses.
    pub fn store_status(&mut self, status: S, position: usize) {
        if let Some(sink) = &mut self.status_sink {
            sink(status, position);
        }
    }
}
