//! A single bounded queue, optionally shared by multiple producers under a lock.
//!
//! [`BoundedQueue`] is the building block for the collective pre-queue, the completion queue and
//! the central free-list of the object allocator: all of them are logically single-producer
//! single-consumer but some are fed from more than one producer thread, which
//! [`MultiProducerQueue`] serializes with a spinlock on the producer side only.

use crate::error::{RecvError, SendError};
use parking_lot::Mutex;

/// A single bounded FIFO queue backed by a [`flume`] channel.
pub struct BoundedQueue<T> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T> BoundedQueue<T> {
    /// Creates a queue that holds at most `capacity` items.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = flume::bounded(capacity);
        Self { sender, receiver }
    }

    /// Attempts to push `item` without blocking.
    pub fn try_push(&self, item: T) -> Result<(), SendError<T>> {
        self.sender.try_send(item).map_err(|e| match e {
            flume::TrySendError::Full(v) => SendError::Full(v),
            flume::TrySendError::Disconnected(v) => SendError::Closed(v),
        })
    }

    /// Attempts to pop one item without blocking.
    pub fn try_pop(&self) -> Result<T, RecvError> {
        self.receiver.try_recv().map_err(|e| match e {
            flume::TryRecvError::Empty => RecvError::Empty,
            flume::TryRecvError::Disconnected => RecvError::Closed,
        })
    }

    /// Pops up to `max` items, stopping as soon as the queue reports empty.
    pub fn pop_batch(&self, max: usize) -> Vec<T> {
        let mut out = Vec::with_capacity(max.min(self.receiver.capacity().unwrap_or(max)));
        while out.len() < max {
            match self.try_pop() {
                Ok(v) => out.push(v),
                Err(_) => break,
            }
        }
        out
    }

    /// Number of items currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// `true` if the queue currently holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

/// A [`BoundedQueue`] whose producer side is safe to call from multiple threads.
///
/// The consumer side is unchanged (single consumer, no locking). Pushing under contention spins
/// while the queue reports full, matching the retry-with-progress-callback shape of the queue
/// this is grounded on; the progress callback is left to the caller (e.g. nudging the polling
/// task) rather than baked into the lock.
pub struct MultiProducerQueue<T> {
    queue: BoundedQueue<T>,
    producer_lock: Mutex<()>,
}

impl<T> MultiProducerQueue<T> {
    /// Creates a queue that holds at most `capacity` items.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: BoundedQueue::new(capacity),
            producer_lock: Mutex::new(()),
        }
    }

    /// Pushes `item`, spinning under the producer lock while the queue is full.
    ///
    /// `on_full` is invoked once per failed attempt and may perform progress-helping work (the
    /// original design calls this out explicitly so a producer spinning on a full queue can help
    /// drain it rather than just burn cycles).
    pub fn add(&self, item: T, mut on_full: impl FnMut()) {
        let _guard = self.producer_lock.lock();
        let mut item = item;
        loop {
            match self.queue.try_push(item) {
                Ok(()) => return,
                Err(SendError::Full(returned)) => {
                    item = returned;
                    on_full();
                }
                Err(SendError::Closed(_)) => {
                    unreachable!("MultiProducerQueue consumer side is never dropped while producers are live")
                }
            }
        }
    }

    /// Pops up to `max` items. Consumer-only.
    pub fn retrieve(&self, max: usize) -> Vec<T> {
        self.queue.pop_batch(max)
    }

    /// Number of items currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// `true` if the queue currently holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
