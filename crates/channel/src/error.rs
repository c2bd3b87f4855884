//! Errors for the bounded cross-thread queues.

/// Errors that can occur pushing an item onto a queue.
#[derive(thiserror::Error, Debug)]
pub enum SendError<T> {
    /// The queue is at capacity and the item could not be pushed.
    #[error("queue is full and the item could not be pushed")]
    Full(T),

    /// The queue's consumer side has been dropped.
    #[error("queue is closed and the item could not be pushed")]
    Closed(T),
}

impl<T> SendError<T> {
    /// Returns the item that failed to be pushed, regardless of which variant caused it.
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(t) => t,
            Self::Closed(t) => t,
        }
    }
}

/// Errors that can occur popping an item from a queue.
#[derive(thiserror::Error, Debug)]
pub enum RecvError {
    /// Every producer side has been dropped and the queue is drained.
    #[error("queue is closed")]
    Closed,

    /// The queue currently holds no items.
    #[error("queue is empty")]
    Empty,
}
