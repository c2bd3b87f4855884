//! The per-language singleton that owns the in-flight request array and drives progress.

use crate::allocator::ObjAllocator;
use crate::capacity::CapacityController;
use crate::completion::{Completable, CompletionManager};
use crate::issuer::{BATCH, IssueOutcome, Issuer};
use crate::operation::{CollOperation, Operation};
use crate::task::{Task, TaskContext};
use crate::ticket::{StatusSink, Ticket};
use arrayvec::ArrayVec;
use parking_lot::Mutex;
use std::sync::Arc;
use tampi_channel::error::SendError;
use tampi_channel::percpu::{DrainPolicy, PerCpuQueue};
use tampi_channel::spsc::MultiProducerQueue;
use tampi_config::testing_approach::{ImmediateTestingApproach, TestingApproach};

/// Where a slot's ticket lives: owned inline by the manager array, or shared with a caller's
/// `wait`-style entry point (`Iwait`/`Iwaitall`) so several slots backed by the same
/// multi-request wait can each complete their own position.
///
/// Both variants wrap the ticket in a [`Mutex`] since `store_status` takes `&mut self`
/// (the status sink is a boxed `FnMut`); the manager's own lock already rules out contention on
/// the owned case, so that inner lock is never contended in practice.
enum TicketHandle<T: Task, S> {
    Owned(Mutex<Ticket<T, S>>),
    External(Arc<Mutex<Ticket<T, S>>>),
}

impl<T: Task, S> TicketHandle<T, S> {
    fn owned(ticket: Ticket<T, S>) -> Self {
        Self::Owned(Mutex::new(ticket))
    }

    fn store_status(&self, status: S, position: usize) {
        match self {
            Self::Owned(ticket) => ticket.lock().store_status(status, position),
            Self::External(shared) => shared.lock().store_status(status, position),
        }
    }

    fn complete(&self) {
        match self {
            Self::Owned(ticket) => ticket.lock().complete(),
            Self::External(shared) => shared.lock().complete(),
        }
    }
}

impl<T: Task, S> Completable for TicketHandle<T, S> {
    /// Forwards to the inherent [`complete`](TicketHandle::complete): routing the completion
    /// queue through this, rather than a detached `TaskContext`, is what makes a multi-operation
    /// ticket (`Iwaitall`) only release its task once every one of its operations has completed,
    /// not the first.
    fn complete(&self) {
        TicketHandle::complete(self);
    }
}

/// Issues the non-blocking primitive for a pre-queue entry, point-to-point or collective alike.
///
/// `Operation` and `CollOperation` both expose an `issue` method with the same signature; this
/// lets [`TicketManager`] drain and issue either kind through one generic code path instead of
/// duplicating `issue_entry`/`drain_pre_queues` per queue.
trait Issuable<I: Issuer> {
    fn issue_on(&self, issuer: &I) -> IssueOutcome<I::Request, I::Status>;
}

impl<I: Issuer, T: Task> Issuable<I> for Operation<I, T> {
    fn issue_on(&self, issuer: &I) -> IssueOutcome<I::Request, I::Status> {
        self.issue(issuer)
    }
}

impl<I: Issuer, T: Task> Issuable<I> for CollOperation<I, T> {
    fn issue_on(&self, issuer: &I) -> IssueOutcome<I::Request, I::Status> {
        self.issue(issuer)
    }
}

/// One in-flight slot: a live request paired with where its completion should be reported.
struct Slot<I: Issuer, T: Task> {
    request: I::Request,
    ticket: TicketHandle<T, I::Status>,
    position: usize,
}

/// An entry waiting in a pre-queue to be issued, pairing the posted operation with its ticket.
struct Entry<Op, T: Task, S> {
    op: Op,
    ticket: TicketHandle<T, S>,
    position: usize,
}

/// A pre-queue slot recycled through the object allocator instead of freshly heap-allocated on
/// every post: `alloc()` hands back an empty boxed slot, the producer fills it and pushes it,
/// and the polling task empties it back out before returning the box to the allocator.
type PooledEntry<Op, T, S> = Box<Option<Entry<Op, T, S>>>;

fn empty_slot<Op, T: Task, S>() -> PooledEntry<Op, T, S> {
    Box::new(None)
}

/// Fixed pool size for point-to-point pre-queue entries (`Operation`s).
///
/// Independent of the in-flight array's capacity controller: the allocator's pool and the
/// in-flight array's admission limit are two different "capacity" concepts, and the allocator
/// must not shrink below this floor just because a deployment tunes `TAMPI_CAPACITY` lower.
const P2P_ALLOCATOR_CAPACITY: usize = 65536;

/// Fixed pool size for collective pre-queue entries (`CollOperation`s).
const COLL_ALLOCATOR_CAPACITY: usize = 8192;

struct Inner<I: Issuer, T: Task> {
    slots: Vec<Slot<I, T>>,
    capacity_ctrl: CapacityController,
}

/// Holds the in-flight request array for one language binding and drives it to completion.
///
/// Grounded on the original design's `TicketManager`: a spinlock-protected compact array of
/// in-flight requests, fed by pre-queues and drained by a single polling task per
/// [`checkRequests`](Self::check_requests) call.
pub struct TicketManager<I: Issuer, T: Task> {
    issuer: I,
    p2p_queue: PerCpuQueue<PooledEntry<Operation<I, T>, T, I::Status>>,
    p2p_allocator: ObjAllocator<PooledEntry<Operation<I, T>, T, I::Status>>,
    coll_queue: MultiProducerQueue<PooledEntry<CollOperation<I, T>, T, I::Status>>,
    coll_allocator: ObjAllocator<PooledEntry<CollOperation<I, T>, T, I::Status>>,
    completion: CompletionManager<TicketHandle<T, I::Status>>,
    testing: TestingApproach,
    immediate_testing: ImmediateTestingApproach,
    inner: Mutex<Inner<I, T>>,
}

impl<I: Issuer, T: Task> TicketManager<I, T> {
    /// Creates a manager with `num_cpus` point-to-point sub-queues of `p2p_capacity` each, a
    /// collective queue of `coll_capacity`, and the given capacity/testing policies.
    ///
    /// The object allocators are sized to the fixed [`P2P_ALLOCATOR_CAPACITY`] /
    /// [`COLL_ALLOCATOR_CAPACITY`] pool sizes, independent of `capacity_ctrl`'s in-flight-array
    /// admission limit; the allocators abort rather than ever allocate past those bounds.
    /// `completion_enabled` mirrors `TAMPI_POLLING_TASK_COMPLETION`.
    #[must_use]
    pub fn new(
        issuer: I,
        num_cpus: usize,
        p2p_capacity: usize,
        coll_capacity: usize,
        queues_full_failure: bool,
        capacity_ctrl: CapacityController,
        completion_enabled: bool,
        testing: TestingApproach,
        immediate_testing: ImmediateTestingApproach,
    ) -> Self {
        Self {
            issuer,
            p2p_queue: PerCpuQueue::new(num_cpus, p2p_capacity, queues_full_failure),
            p2p_allocator: ObjAllocator::new(num_cpus, P2P_ALLOCATOR_CAPACITY, crate::allocator::BATCH, empty_slot),
            coll_queue: MultiProducerQueue::new(coll_capacity),
            coll_allocator: ObjAllocator::new(num_cpus, COLL_ALLOCATOR_CAPACITY, crate::allocator::BATCH, empty_slot),
            completion: CompletionManager::new(completion_enabled),
            testing,
            immediate_testing,
            inner: Mutex::new(Inner {
                slots: Vec::new(),
                capacity_ctrl,
            }),
        }
    }

    /// Current number of in-flight requests. Mainly useful for tests and diagnostics.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.lock().slots.len()
    }

    /// The underlying library handle this manager polls against.
    ///
    /// A shim needs this for primitives that are issued directly, outside any pre-queue (e.g. an
    /// `Irecv` posted ahead of a later `Waitall`): the resulting request is only handed to this
    /// manager afterwards, via [`add_external_request`](Self::add_external_request), so it must
    /// come from this same handle for the manager's later `test`/`test_some`/`test_any` calls to
    /// recognize it.
    #[must_use]
    pub fn issuer(&self) -> &I {
        &self.issuer
    }

    /// Enqueues a posted point-to-point operation for the polling task to issue.
    ///
    /// Called by a primitive shim from any task on any CPU; non-blocking unless the sub-queue is
    /// full and fail-fast is disabled, per `TAMPI_QUEUES_FULL_FAILURE`. Precondition: for a
    /// non-blocking ticket, the owning task context has already had `bind(1)` called on it.
    pub fn add_ticket(&self, cpu: usize, operation: Operation<I, T>, ticket: Ticket<T, I::Status>) {
        let mut slot = self.p2p_allocator.alloc(cpu);
        *slot = Some(Entry {
            op: operation,
            ticket: TicketHandle::owned(ticket),
            position: 0,
        });
        if let Err(SendError::Full(slot)) = self.p2p_queue.push(cpu, slot) {
            self.p2p_allocator.free_local(cpu, slot);
            crate::error::abort_with_diagnostic("point-to-point pre-queue full (TAMPI_QUEUES_FULL_FAILURE)");
        }
    }

    /// Enqueues a posted collective operation for the polling task to issue.
    ///
    /// `cpu` identifies the caller's CPU only for the purpose of picking an allocator cache; the
    /// collective pre-queue itself is a single queue shared by all CPUs.
    pub fn add_coll_ticket(&self, cpu: usize, operation: CollOperation<I, T>, ticket: Ticket<T, I::Status>) {
        let mut slot = self.coll_allocator.alloc(cpu);
        *slot = Some(Entry {
            op: operation,
            ticket: TicketHandle::owned(ticket),
            position: 0,
        });
        self.coll_queue.add(slot, || {
            tracing::warn!("collective pre-queue full, producer spinning");
        });
    }

    /// Directly inserts an already-issued external request, bypassing the pre-queue path.
    ///
    /// Used by the `Iwait`/`Iwaitall` entry points: the request already exists (it was returned
    /// to the user by a previous non-blocking call), so only the completion bookkeeping is new.
    pub fn add_external_request(
        &self,
        request: I::Request,
        ticket: Arc<Mutex<Ticket<T, I::Status>>>,
        position: usize,
    ) {
        let mut inner = self.inner.lock();
        inner.slots.push(Slot {
            request,
            ticket: TicketHandle::External(ticket),
            position,
        });
    }

    /// Implements the `Iwait` entry point: binds one external event on `task_context`, then
    /// registers the already-issued `request` so its completion reports through `status_sink`.
    /// Returns immediately.
    pub fn iwait(&self, task_context: TaskContext<T>, status_sink: StatusSink<I::Status>, request: I::Request) {
        self.iwaitall(task_context, status_sink, vec![request]);
    }

    /// Implements the `Iwaitall` entry point: binds `requests.len()` external events on
    /// `task_context`, then registers each already-issued request in `requests` so its
    /// completion reports through `status_sink` at its index. Returns immediately.
    ///
    /// `requests` must be non-empty: every caller posts at least one request before waiting on
    /// it.
    pub fn iwaitall(
        &self,
        task_context: TaskContext<T>,
        status_sink: StatusSink<I::Status>,
        requests: Vec<I::Request>,
    ) {
        let count = requests.len() as u32;
        debug_assert!(count > 0, "iwaitall called with no requests");
        task_context.bind(1);
        let mut ticket = Ticket::new(task_context, status_sink);
        if count > 1 {
            ticket.add_pending_operations(count - 1);
        }
        let shared = Arc::new(Mutex::new(ticket));
        for (position, request) in requests.into_iter().enumerate() {
            self.add_external_request(request, shared.clone(), position);
        }
    }

    /// Runs one polling tick: drains pre-queues while there is capacity, tests in-flight
    /// requests, compacts, and evaluates the capacity controller. Returns the number of
    /// operations completed during this pass.
    ///
    /// Only the single polling task may call this.
    pub fn check_requests(&self) -> usize {
        let _span = tracing::trace_span!("check_requests", pending = self.pending()).entered();
        let mut inner = self.inner.lock();
        let mut total_completed = 0usize;
        loop {
            let capacity = inner.capacity_ctrl.capacity();
            let (mut drained, mut immediate) = (0usize, 0usize);
            if inner.slots.len() < capacity {
                (drained, immediate) = self.drain_pre_queues(&mut inner, capacity - inner.slots.len());
            }
            let tested = if inner.slots.is_empty() {
                0
            } else {
                self.test_and_complete(&mut inner)
            };
            total_completed += immediate + tested;
            if drained == 0 && tested == 0 {
                break;
            }
        }
        let pending = inner.slots.len();
        inner
            .capacity_ctrl
            .evaluate(pending, total_completed, std::time::Instant::now());
        tracing::trace!(pending, total_completed, "polling tick complete");
        total_completed
    }

    /// Drains pre-queues up to `slots_free` entries, issuing each one.
    ///
    /// Returns `(drained, immediate)`: `drained` is how many entries were pulled out of the
    /// pre-queues this call (used only to decide whether to keep looping), and `immediate` is
    /// how many of those completed synchronously on issue rather than entering the pending
    /// array — the caller must fold `immediate` into its own completion count, since these never
    /// pass through [`test_and_complete`](Self::test_and_complete).
    fn drain_pre_queues(&self, inner: &mut Inner<I, T>, slots_free: usize) -> (usize, usize) {
        let mut drained = 0;
        let mut immediate = 0;
        loop {
            let budget = slots_free.saturating_sub(drained).min(BATCH);
            if budget == 0 {
                break;
            }
            let p2p = self.p2p_queue.drain(DrainPolicy::CyclicRoundRobin, budget);
            let coll = self.coll_queue.retrieve(budget);
            if p2p.is_empty() && coll.is_empty() {
                break;
            }
            let batch_len = p2p.len() + coll.len();
            tracing::trace!(p2p = p2p.len(), coll = coll.len(), "drained pre-queue batch");

            let mut freed_p2p = Vec::with_capacity(p2p.len());
            for mut slot in p2p {
                let entry = slot.take().expect("pre-queue slot pushed empty");
                if self.issue_entry(inner, entry) {
                    immediate += 1;
                }
                freed_p2p.push(slot);
            }
            if !freed_p2p.is_empty() {
                self.p2p_allocator.free_bulk(freed_p2p);
            }

            let mut freed_coll = Vec::with_capacity(coll.len());
            for mut slot in coll {
                let entry = slot.take().expect("pre-queue slot pushed empty");
                if self.issue_entry(inner, entry) {
                    immediate += 1;
                }
                freed_coll.push(slot);
            }
            if !freed_coll.is_empty() {
                self.coll_allocator.free_bulk(freed_coll);
            }

            drained += batch_len;
        }
        (drained, immediate)
    }

    /// Issues one pre-queue entry. Returns whether it completed synchronously (and was thus
    /// never pushed into the pending array).
    fn issue_entry<Op: Issuable<I>>(&self, inner: &mut Inner<I, T>, entry: Entry<Op, T, I::Status>) -> bool {
        match entry.op.issue_on(&self.issuer) {
            IssueOutcome::Completed(status) => {
                entry.ticket.store_status(status, entry.position);
                self.complete_ticket(entry.ticket);
                true
            }
            IssueOutcome::Pending(request) => {
                let status = if self.immediate_testing == ImmediateTestingApproach::None {
                    None
                } else {
                    self.issuer.test(&request)
                };
                match status {
                    Some(status) => {
                        entry.ticket.store_status(status, entry.position);
                        self.complete_ticket(entry.ticket);
                        true
                    }
                    None => {
                        inner.slots.push(Slot {
                            request,
                            ticket: entry.ticket,
                            position: entry.position,
                        });
                        false
                    }
                }
            }
        }
    }

    fn test_and_complete(&self, inner: &mut Inner<I, T>) -> usize {
        let mut completed_indices: Vec<usize> = Vec::new();
        match self.testing {
            TestingApproach::Test => {
                for (idx, slot) in inner.slots.iter().enumerate() {
                    if let Some(status) = self.issuer.test(&slot.request) {
                        slot.ticket.store_status(status, slot.position);
                        completed_indices.push(idx);
                    }
                }
            }
            TestingApproach::TestSome => {
                for chunk_start in (0..inner.slots.len()).step_by(BATCH) {
                    let chunk_end = (chunk_start + BATCH).min(inner.slots.len());
                    let requests: ArrayVec<I::Request, BATCH> = inner.slots[chunk_start..chunk_end]
                        .iter()
                        .map(|s| s.request)
                        .collect();
                    for (offset, status) in self.issuer.test_some(&requests) {
                        let idx = chunk_start + offset;
                        inner.slots[idx].ticket.store_status(status, inner.slots[idx].position);
                        completed_indices.push(idx);
                    }
                }
            }
            TestingApproach::TestAny => {
                for chunk_start in (0..inner.slots.len()).step_by(BATCH) {
                    let chunk_end = (chunk_start + BATCH).min(inner.slots.len());
                    loop {
                        // `test_any`'s returned offset indexes into whatever slice it was given,
                        // so that slice must stay aligned with the original chunk positions
                        // across repeated calls - filter out completed indices but keep each
                        // surviving request's original chunk-relative index alongside it, rather
                        // than compacting into a shorter array that would shift offsets.
                        let remaining: ArrayVec<(usize, I::Request), BATCH> = (chunk_start..chunk_end)
                            .filter(|i| !completed_indices.contains(i))
                            .map(|i| (i, inner.slots[i].request))
                            .collect();
                        if remaining.is_empty() {
                            break;
                        }
                        let requests: ArrayVec<I::Request, BATCH> =
                            remaining.iter().map(|(_, r)| *r).collect();
                        match self.issuer.test_any(&requests) {
                            Some((offset, status)) => {
                                let idx = remaining[offset].0;
                                inner.slots[idx].ticket.store_status(status, inner.slots[idx].position);
                                completed_indices.push(idx);
                            }
                            None => break,
                        }
                    }
                }
            }
        }

        let completed = completed_indices.len();
        if completed == 0 {
            return 0;
        }

        completed_indices.sort_unstable();
        let mut handles = Vec::with_capacity(completed);
        for &idx in completed_indices.iter().rev() {
            let slot = inner.slots.swap_remove(idx);
            if self.completion.is_enabled() {
                handles.push(slot.ticket);
            } else {
                slot.ticket.complete();
            }
        }
        tracing::debug!(completed, remaining = inner.slots.len(), "compacted completed slots");

        if self.completion.is_enabled() {
            self.completion.transfer(handles);
        }
        completed
    }

    fn complete_ticket(&self, ticket: TicketHandle<T, I::Status>) {
        if self.completion.is_enabled() {
            self.completion.transfer(vec![ticket]);
        } else {
            ticket.complete();
        }
    }

    /// Drains the completion queue, if enabled. Called by the completion polling task.
    pub fn process_completions(&self) -> usize {
        self.completion.process()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{CollOpcode, Nature, Opcode};
    use crate::task::TaskContext;
    use crate::testing::{Completion, FakeTask, ScriptedDescriptor, ScriptedIssuer};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tampi_config::capacity::CapacityConfig;

    fn manager(num_cpus: usize) -> TicketManager<ScriptedIssuer, FakeTask> {
        manager_with_completion(num_cpus, false)
    }

    fn manager_with_completion(num_cpus: usize, completion_enabled: bool) -> TicketManager<ScriptedIssuer, FakeTask> {
        TicketManager::new(
            ScriptedIssuer::new(),
            num_cpus,
            16,
            16,
            true,
            CapacityController::new(CapacityConfig { min: 128, max: 1024 }, Duration::from_secs(3600)),
            completion_enabled,
            TestingApproach::Test,
            ImmediateTestingApproach::None,
        )
    }

    fn blocking_ticket(task: &FakeTask) -> Ticket<FakeTask, u32> {
        Ticket::new(TaskContext::new(true, task.clone()), None)
    }

    #[test]
    fn immediately_completing_operation_unblocks_its_blocking_ticket() {
        let manager = manager(1);
        let task = FakeTask::new();
        let op = Operation {
            opcode: Opcode::Send,
            nature: Nature::Blocking,
            task: task.clone(),
            descriptor: ScriptedDescriptor {
                completion: Completion::Immediate(7),
            },
        };
        manager.add_ticket(0, op, blocking_ticket(&task));
        assert_eq!(manager.check_requests(), 1);
        assert!(task.is_unblocked());
        assert_eq!(manager.pending(), 0);
    }

    #[test]
    fn deferred_operation_completes_after_enough_polling_ticks() {
        let manager = manager(1);
        let task = FakeTask::new();
        let op = Operation {
            opcode: Opcode::Recv,
            nature: Nature::Blocking,
            task: task.clone(),
            descriptor: ScriptedDescriptor {
                completion: Completion::AfterPolls(4, 1),
            },
        };
        manager.add_ticket(0, op, blocking_ticket(&task));

        for _ in 0..20 {
            _ = manager.check_requests();
            if manager.pending() == 0 {
                break;
            }
        }
        assert!(task.is_unblocked());
        assert_eq!(manager.pending(), 0);
    }

    #[test]
    fn never_completing_operation_stays_pending() {
        let manager = manager(1);
        let task = FakeTask::new();
        let op = Operation {
            opcode: Opcode::Send,
            nature: Nature::Blocking,
            task: task.clone(),
            descriptor: ScriptedDescriptor {
                completion: Completion::Never,
            },
        };
        manager.add_ticket(0, op, blocking_ticket(&task));
        for _ in 0..5 {
            _ = manager.check_requests();
        }
        assert!(!task.is_unblocked());
        assert_eq!(manager.pending(), 1);
    }

    #[test]
    fn collective_operation_completes_through_its_own_pre_queue() {
        let manager = manager(1);
        let task = FakeTask::new();
        let op = CollOperation {
            opcode: CollOpcode::Bcast,
            nature: Nature::Blocking,
            task: task.clone(),
            descriptor: ScriptedDescriptor {
                completion: Completion::Immediate(0),
            },
        };
        manager.add_coll_ticket(0, op, blocking_ticket(&task));
        _ = manager.check_requests();
        assert!(task.is_unblocked());
    }

    #[test]
    fn nonblocking_ticket_reports_status_at_its_position_via_sink() {
        let manager = manager(1);
        let task = FakeTask::new();
        let ctx = TaskContext::new(false, task.clone());
        task.bind_events(1);
        let received = Arc::new(StdMutex::new(Vec::new()));
        let sink_received = received.clone();
        let ticket: Ticket<FakeTask, u32> = Ticket::new(
            ctx,
            Some(Box::new(move |status, position| {
                sink_received.lock().unwrap().push((position, status));
            })),
        );
        let op = Operation {
            opcode: Opcode::Send,
            nature: Nature::NonBlocking,
            task: task.clone(),
            descriptor: ScriptedDescriptor {
                completion: Completion::Immediate(42),
            },
        };
        manager.add_ticket(0, op, ticket);
        _ = manager.check_requests();
        assert_eq!(*received.lock().unwrap(), vec![(0, 42)]);
        assert_eq!(task.pending_events(), 0);
    }

    #[test]
    fn many_point_to_point_operations_spread_across_cpus_all_complete() {
        let manager = manager(4);
        let tasks: Vec<FakeTask> = (0..32).map(|_| FakeTask::new()).collect();
        for (i, task) in tasks.iter().enumerate() {
            let op = Operation {
                opcode: Opcode::Send,
                nature: Nature::Blocking,
                task: task.clone(),
                descriptor: ScriptedDescriptor {
                    completion: Completion::Immediate(i as u32),
                },
            };
            manager.add_ticket(i % 4, op, blocking_ticket(task));
        }
        for _ in 0..8 {
            _ = manager.check_requests();
            if manager.pending() == 0 {
                break;
            }
        }
        assert!(tasks.iter().all(FakeTask::is_unblocked));
        assert_eq!(manager.pending(), 0);
    }

    /// With the completion polling task enabled, a ticket composing several operations
    /// (`Iwaitall`) must still only unblock its task once every one of them has completed, not
    /// the first whose completion reaches the completion queue.
    #[test]
    fn completion_enabled_waitall_only_unblocks_after_every_operation_completes() {
        let manager = manager_with_completion(1, true);
        let task = FakeTask::new();

        let requests: Vec<u64> = [1u32, 2, 3]
            .into_iter()
            .enumerate()
            .map(|(position, status)| {
                let descriptor = ScriptedDescriptor {
                    completion: Completion::AfterPolls(position as u32 + 1, status),
                };
                match crate::issuer::Issuer::issue(manager.issuer(), &descriptor) {
                    IssueOutcome::Pending(r) => r,
                    IssueOutcome::Completed(_) => unreachable!("AfterPolls never completes on issue"),
                }
            })
            .collect();
        manager.iwaitall(TaskContext::new(true, task.clone()), None, requests);

        assert!(!task.is_unblocked());
        for _ in 0..5 {
            let _ = manager.check_requests();
            manager.process_completions();
            if task.is_unblocked() {
                break;
            }
        }
        assert!(task.is_unblocked());
    }

    #[test]
    fn iwait_binds_one_event_and_unblocks_on_completion() {
        let manager = manager(1);
        let task = FakeTask::new();
        let descriptor = ScriptedDescriptor {
            completion: Completion::AfterPolls(2, 9),
        };
        let request = match crate::issuer::Issuer::issue(manager.issuer(), &descriptor) {
            IssueOutcome::Pending(r) => r,
            IssueOutcome::Completed(_) => unreachable!("AfterPolls never completes on issue"),
        };
        manager.iwait(TaskContext::new(true, task.clone()), None, request);

        assert!(!task.is_unblocked());
        for _ in 0..5 {
            let _ = manager.check_requests();
            if task.is_unblocked() {
                break;
            }
        }
        assert!(task.is_unblocked());
    }
}
