//! A bounded queue with one sub-queue per logical CPU.
//!
//! Producers always push into the sub-queue of the CPU they are currently running on, so two
//! producers on different CPUs never contend with each other. A single consumer drains across
//! all sub-queues according to a [`DrainPolicy`].

use crate::error::SendError;
use std::sync::atomic::{AtomicUsize, Ordering};

/// How a [`PerCpuQueue`] distributes a multi-item pop across its sub-queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainPolicy {
    /// Spread the requested count evenly across sub-queues, favoring fairness between CPUs.
    CyclicRoundRobin,
    /// Drain a whole contiguous run from one sub-queue before moving to the next, favoring
    /// fewer, larger batches over fairness.
    BlockRoundRobin,
}

/// A bounded multi-producer queue partitioned by CPU, with a single consumer.
///
/// One [`flume`] bounded channel backs each CPU's sub-queue. `push` always targets the caller's
/// own CPU and is safe from any number of producer threads; `drain` touches more than one
/// sub-queue but only needs `&self` (the cursor is an atomic) so the queue can be shared via a
/// plain `Arc` — callers must still ensure only the single consumer thread (the polling task)
/// ever calls it.
pub struct PerCpuQueue<T> {
    senders: Vec<flume::Sender<T>>,
    receivers: Vec<flume::Receiver<T>>,
    full_failure: bool,
    cursor: AtomicUsize,
}

impl<T> PerCpuQueue<T> {
    /// Creates one bounded sub-queue of `capacity_per_cpu` per CPU in `0..num_cpus`.
    ///
    /// `full_failure` mirrors `TAMPI_QUEUES_FULL_FAILURE`: when `true`, [`push`](Self::push)
    /// returns [`SendError::Full`] immediately instead of spin-waiting for space.
    #[must_use]
    pub fn new(num_cpus: usize, capacity_per_cpu: usize, full_failure: bool) -> Self {
        let mut senders = Vec::with_capacity(num_cpus);
        let mut receivers = Vec::with_capacity(num_cpus);
        for _ in 0..num_cpus {
            let (tx, rx) = flume::bounded(capacity_per_cpu);
            senders.push(tx);
            receivers.push(rx);
        }
        Self {
            senders,
            receivers,
            full_failure,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Number of sub-queues (equal to the number of logical CPUs this queue was built for).
    #[must_use]
    pub fn num_queues(&self) -> usize {
        self.senders.len()
    }

    /// Pushes `item` onto the sub-queue of `cpu`.
    ///
    /// If the sub-queue is full: returns [`SendError::Full`] when `full_failure` was set at
    /// construction, otherwise blocks the caller until space is available.
    pub fn push(&self, cpu: usize, item: T) -> Result<(), SendError<T>> {
        let sender = &self.senders[cpu];
        if self.full_failure {
            return sender.try_send(item).map_err(|e| match e {
                flume::TrySendError::Full(v) => SendError::Full(v),
                flume::TrySendError::Disconnected(v) => SendError::Closed(v),
            });
        }
        sender
            .send(item)
            .map_err(|flume::SendError(v)| SendError::Closed(v))
    }

    /// Returns `true` if every sub-queue is currently empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receivers.iter().all(flume::Receiver::is_empty)
    }

    /// Pops up to `max` items total, distributed across sub-queues per `policy`.
    ///
    /// Consumer-only: must never be called concurrently with another call to `drain`.
    pub fn drain(&self, policy: DrainPolicy, max: usize) -> Vec<T> {
        if max == 0 || self.receivers.is_empty() {
            return Vec::new();
        }
        match policy {
            DrainPolicy::CyclicRoundRobin => self.drain_cyclic(max),
            DrainPolicy::BlockRoundRobin => self.drain_block(max),
        }
    }

    fn drain_cyclic(&self, max: usize) -> Vec<T> {
        let n = self.receivers.len();
        let mut remaining: Vec<usize> = self.receivers.iter().map(flume::Receiver::len).collect();
        let total: usize = remaining.iter().sum();
        let mut to_take = max.min(total);
        let mut out = Vec::with_capacity(to_take);

        let mut queue = self.cursor.load(Ordering::Relaxed);
        while to_take > 0 {
            let per_queue = (to_take / n).max(1);
            let mut made_progress = false;
            for _ in 0..n {
                if to_take == 0 {
                    break;
                }
                let take = remaining[queue].min(per_queue).min(to_take);
                if take > 0 {
                    for _ in 0..take {
                        match self.receivers[queue].try_recv() {
                            Ok(v) => out.push(v),
                            Err(_) => break,
                        }
                    }
                    remaining[queue] -= take;
                    to_take -= take;
                    made_progress = true;
                }
                queue = (queue + 1) % n;
            }
            if !made_progress {
                break;
            }
        }
        self.cursor.store(queue, Ordering::Relaxed);
        out
    }

    fn drain_block(&self, max: usize) -> Vec<T> {
        let n = self.receivers.len();
        let mut out = Vec::new();
        let mut queue = self.cursor.load(Ordering::Relaxed);
        for _ in 0..n {
            while out.len() < max {
                match self.receivers[queue].try_recv() {
                    Ok(v) => out.push(v),
                    Err(_) => break,
                }
            }
            if out.len() >= max {
                break;
            }
            queue = (queue + 1) % n;
        }
        self.cursor.store(queue, Ordering::Relaxed);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain_single_cpu() {
        let q = PerCpuQueue::new(1, 16, true);
        for i in 0..5 {
            q.push(0, i).unwrap();
        }
        let items = q.drain(DrainPolicy::CyclicRoundRobin, 10);
        assert_eq!(items, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn full_failure_reports_full() {
        let q = PerCpuQueue::new(1, 2, true);
        q.push(0, 1).unwrap();
        q.push(0, 2).unwrap();
        match q.push(0, 3) {
            Err(SendError::Full(3)) => {}
            other => panic!("expected Full, got {other:?}"),
        }
    }

    #[test]
    fn cyclic_drain_is_fair_across_cpus() {
        let q = PerCpuQueue::new(2, 16, true);
        for i in 0..8 {
            q.push(0, i).unwrap();
        }
        for i in 100..108 {
            q.push(1, i).unwrap();
        }
        let items = q.drain(DrainPolicy::CyclicRoundRobin, 8);
        assert_eq!(items.len(), 8);
        let from_cpu0 = items.iter().filter(|v| **v < 100).count();
        let from_cpu1 = items.iter().filter(|v| **v >= 100).count();
        assert_eq!(from_cpu0, 4);
        assert_eq!(from_cpu1, 4);
    }

    #[test]
    fn block_drain_exhausts_one_queue_first() {
        let q = PerCpuQueue::new(2, 16, true);
        for i in 0..4 {
            q.push(0, i).unwrap();
        }
        for i in 100..104 {
            q.push(1, i).unwrap();
        }
        let items = q.drain(DrainPolicy::BlockRoundRobin, 4);
        assert_eq!(items, vec![0, 1, 2, 3]);
    }

    #[test]
    fn is_empty_reflects_all_sub_queues() {
        let q = PerCpuQueue::new(2, 16, true);
        assert!(q.is_empty());
        q.push(1, 42).unwrap();
        assert!(!q.is_empty());
        let _ = q.drain(DrainPolicy::CyclicRoundRobin, 1);
        assert!(q.is_empty());
    }
}
