//! Per-CPU-cached object pool backing the pre-queue entries.
//!
//! Grounded on the original design's `ObjAllocator<T>`: a central free-list plus one bounded
//! per-CPU cache, refilled `batch` objects at a time so the common case never touches the
//! central list. `unsafe_code` is denied for this crate, so unlike the original's lock-free
//! `boost::lockfree::spsc_queue`, the central list here is a [`tampi_channel::spsc::BoundedQueue`]
//! (itself backed by a lock-free `flume` channel) and each per-CPU cache is a small
//! [`parking_lot::Mutex`]-guarded `Vec`, uncontended in the common case since only the CPU's own
//! threads touch their own cache.

use crate::error::abort_with_diagnostic;
use parking_lot::Mutex;
use tampi_channel::spsc::BoundedQueue;

/// Default per-CPU cache refill batch size (`B` in the component design).
pub const BATCH: usize = 64;

/// A fixed-capacity pool of reusable `V` values, cached per CPU.
pub struct ObjAllocator<V> {
    per_cpu: Vec<Mutex<Vec<V>>>,
    central: BoundedQueue<V>,
    batch: usize,
}

impl<V> ObjAllocator<V> {
    /// Builds a pool of `capacity` values, constructed eagerly via `factory`, with one cache per
    /// CPU in `0..num_cpus`.
    pub fn new(num_cpus: usize, capacity: usize, batch: usize, mut factory: impl FnMut() -> V) -> Self {
        let central = BoundedQueue::new(capacity);
        for _ in 0..capacity {
            central
                .try_push(factory())
                .unwrap_or_else(|_| abort_with_diagnostic("allocator pre-fill exceeded its own capacity"));
        }
        let per_cpu = (0..num_cpus)
            .map(|_| Mutex::new(Vec::with_capacity(batch)))
            .collect();
        Self {
            per_cpu,
            central,
            batch,
        }
    }

    /// Allocates one value for `cpu`, refilling that CPU's cache from the central list if empty.
    ///
    /// Aborts if the central list is also exhausted: the pool is sized to the hard cap on
    /// in-flight requests, so running out means the admission controller was bypassed.
    pub fn alloc(&self, cpu: usize) -> V {
        let mut cache = self.per_cpu[cpu].lock();
        if let Some(v) = cache.pop() {
            return v;
        }
        let mut refill = self.central.pop_batch(self.batch);
        let Some(first) = refill.pop() else {
            abort_with_diagnostic("object allocator exhausted: central free-list is empty");
        };
        tracing::trace!(cpu, refilled = refill.len() + 1, "allocator cache refilled");
        cache.extend(refill);
        first
    }

    /// Returns `value` to `cpu`'s local cache. Safe to call from any thread that owns `cpu`.
    pub fn free_local(&self, cpu: usize, value: V) {
        self.per_cpu[cpu].lock().push(value);
    }

    /// Returns a batch of values directly to the central list.
    ///
    /// Only the single polling task may call this: it is the sole thread allowed to touch the
    /// central list's producer side in bulk, which is what lets the common per-CPU path stay
    /// free of central-list contention.
    pub fn free_bulk(&self, values: Vec<V>) {
        for value in values {
            if self.central.try_push(value).is_err() {
                abort_with_diagnostic("object allocator central free-list overflowed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_refills_from_central_on_empty_cache() {
        let alloc: ObjAllocator<u32> = ObjAllocator::new(2, 4, 2, {
            let mut n = 0;
            move || {
                n += 1;
                n
            }
        });
        let a = alloc.alloc(0);
        let b = alloc.alloc(0);
        assert_ne!(a, b);
    }

    #[test]
    fn freed_local_values_are_reused_before_central() {
        let alloc: ObjAllocator<u32> = ObjAllocator::new(1, 8, 4, {
            let mut n = 100;
            move || {
                n += 1;
                n
            }
        });
        let v = alloc.alloc(0);
        alloc.free_local(0, v);
        let v2 = alloc.alloc(0);
        assert_eq!(v, v2);
    }

    #[test]
    fn conserves_total_object_count() {
        let capacity = 8;
        let alloc: ObjAllocator<u32> = ObjAllocator::new(1, capacity, 4, {
            let mut n = 0;
            move || {
                n += 1;
                n
            }
        });
        let mut taken = Vec::new();
        for _ in 0..capacity {
            taken.push(alloc.alloc(0));
        }
        assert_eq!(taken.len(), capacity);
        alloc.free_bulk(taken);
        let mut retaken = Vec::new();
        for _ in 0..capacity {
            retaken.push(alloc.alloc(0));
        }
        assert_eq!(retaken.len(), capacity);
    }
}
