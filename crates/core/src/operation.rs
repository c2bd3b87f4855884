//! Descriptors of a single posted point-to-point or collective operation.

use crate::issuer::{IssueOutcome, Issuer};
use crate::task::Task;

/// The point-to-point primitive a shim is wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Standard send.
    Send,
    /// Buffered send.
    Bsend,
    /// Ready send.
    Rsend,
    /// Synchronous send.
    Ssend,
    /// Receive.
    Recv,
}

/// The collective primitive a shim is wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollOpcode {
    /// Gather data from all tasks and distribute to all.
    Allgather,
    /// Variable-count variant of [`Allgather`](CollOpcode::Allgather).
    Allgatherv,
    /// Reduce values and distribute the result to all tasks.
    Allreduce,
    /// All-to-all scatter/gather.
    Alltoall,
    /// Variable-count variant of [`Alltoall`](CollOpcode::Alltoall).
    Alltoallv,
    /// Variable-count, variable-type variant of [`Alltoall`](CollOpcode::Alltoall).
    Alltoallw,
    /// Synchronize all tasks.
    Barrier,
    /// Broadcast from one root to all tasks.
    Bcast,
    /// Exclusive prefix reduction.
    Exscan,
    /// Gather data from all tasks to one root.
    Gather,
    /// Variable-count variant of [`Gather`](CollOpcode::Gather).
    Gatherv,
    /// Reduce values to one root.
    Reduce,
    /// Reduce and scatter the result across tasks, one uneven chunk count per task.
    ReduceScatter,
    /// Reduce and scatter the result across tasks, one equal-size chunk per task.
    ReduceScatterBlock,
    /// Inclusive prefix reduction.
    Scan,
    /// Scatter data from one root to all tasks.
    Scatter,
    /// Variable-count variant of [`Scatter`](CollOpcode::Scatter).
    Scatterv,
}

/// Whether an operation was posted through the library's blocking or non-blocking entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nature {
    /// Posted through a blocking call (e.g. `MPI_Send`); the calling task suspends.
    Blocking,
    /// Posted through a non-blocking call (e.g. `TAMPI_Isend`); the calling task continues.
    NonBlocking,
}

/// A posted point-to-point operation, not yet issued to the underlying library.
pub struct Operation<I: Issuer, T: Task> {
    /// Which primitive this operation wraps.
    pub opcode: Opcode,
    /// Whether the caller is blocked waiting on this operation.
    pub nature: Nature,
    /// The task that posted the operation.
    pub task: T,
    /// Opaque, per-primitive issue arguments.
    pub descriptor: I::Descriptor,
}

impl<I: Issuer, T: Task> Operation<I, T> {
    /// Issues the non-blocking primitive for this operation.
    pub fn issue(&self, issuer: &I) -> IssueOutcome<I::Request, I::Status> {
        issuer.issue(&self.descriptor)
    }
}

/// A posted collective operation, not yet issued to the underlying library.
pub struct CollOperation<I: Issuer, T: Task> {
    /// Which collective this operation wraps.
    pub opcode: CollOpcode,
    /// Whether the caller is blocked waiting on this operation.
    pub nature: Nature,
    /// The task that posted the operation.
    pub task: T,
    /// Opaque, per-primitive issue arguments.
    pub descriptor: I::Descriptor,
}

impl<I: Issuer, T: Task> CollOperation<I, T> {
    /// Issues the non-blocking primitive for this operation. Collective operations always
    /// ignore their status (the original design ignores collective completion statuses
    /// entirely).
    pub fn issue(&self, issuer: &I) -> IssueOutcome<I::Request, I::Status> {
        issuer.issue(&self.descriptor)
    }
}
