//! In-process fakes for the host tasking runtime and the underlying message-passing library.
//!
//! The real tasking runtime and MPI implementation are external collaborators out of scope for
//! this crate; this module, gated behind the `testing` feature, provides a deterministic stand-in
//! for each so the ticket manager, allocator, pre-queues, capacity controller and polling period
//! controller can be exercised end-to-end without either dependency present.

mod runtime;
mod task;

pub use runtime::FakeRuntime;
pub use task::FakeTask;

use crate::issuer::{BATCH, IssueOutcome, Issuer};
use arrayvec::ArrayVec;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// How a scripted request resolves.
#[derive(Debug, Clone, Copy)]
pub enum Completion {
    /// Completes synchronously when issued; `issue` returns
    /// [`IssueOutcome::Completed`](crate::issuer::IssueOutcome::Completed) directly.
    Immediate(u32),
    /// Completes after being tested `polls` times, yielding `status`.
    AfterPolls(u32, u32),
    /// Never completes for the lifetime of the test.
    Never,
}

/// Packaged arguments for [`ScriptedIssuer`]: just which [`Completion`] to simulate.
pub struct ScriptedDescriptor {
    /// How this operation should resolve once issued.
    pub completion: Completion,
}

struct PendingState {
    completion: Completion,
    polls_seen: u32,
}

/// An [`Issuer`] whose completions are scripted ahead of time via [`ScriptedDescriptor`].
pub struct ScriptedIssuer {
    next_request: AtomicU64,
    pending: Mutex<HashMap<u64, PendingState>>,
}

impl Default for ScriptedIssuer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedIssuer {
    /// Creates an issuer with no in-flight requests.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_request: AtomicU64::new(1),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Number of requests still tracked as pending.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    fn poll_one(&self, request: u64) -> Option<u32> {
        let mut pending = self.pending.lock();
        let state = pending.get_mut(&request)?;
        match state.completion {
            Completion::Never => None,
            Completion::Immediate(status) => {
                pending.remove(&request);
                Some(status)
            }
            Completion::AfterPolls(needed, status) => {
                state.polls_seen += 1;
                if state.polls_seen >= needed.max(1) {
                    pending.remove(&request);
                    Some(status)
                } else {
                    None
                }
            }
        }
    }
}

impl Issuer for ScriptedIssuer {
    type Request = u64;
    type Status = u32;
    type Descriptor = ScriptedDescriptor;

    fn issue(&self, descriptor: &Self::Descriptor) -> IssueOutcome<Self::Request, Self::Status> {
        if let Completion::Immediate(status) = descriptor.completion {
            return IssueOutcome::Completed(status);
        }
        let request = self.next_request.fetch_add(1, Ordering::SeqCst);
        self.pending.lock().insert(
            request,
            PendingState {
                completion: descriptor.completion,
                polls_seen: 0,
            },
        );
        IssueOutcome::Pending(request)
    }

    fn test(&self, request: &Self::Request) -> Option<Self::Status> {
        self.poll_one(*request)
    }

    fn test_some(&self, requests: &[Self::Request]) -> ArrayVec<(usize, Self::Status), BATCH> {
        let mut out = ArrayVec::new();
        for (i, req) in requests.iter().enumerate() {
            if let Some(status) = self.poll_one(*req) {
                let _ = out.try_push((i, status));
            }
        }
        out
    }

    fn test_any(&self, requests: &[Self::Request]) -> Option<(usize, Self::Status)> {
        for (i, req) in requests.iter().enumerate() {
            if let Some(status) = self.poll_one(*req) {
                return Some((i, status));
            }
        }
        None
    }
}
