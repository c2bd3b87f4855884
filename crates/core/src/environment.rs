//! Library-wide mode flags and the per-thread task-awareness switch.
//!
//! Grounded on the original design's global public properties (`BLOCKING_MODE`,
//! `NONBLOCKING_MODE`, `AUTO_INIT`, `THREAD_TASKAWARE`): represented here as module-level atomics
//! for the process-wide flags and a `thread_local!` cell for the per-thread one, per the
//! "global singletons per language" and "thread-local `THREAD_TASKAWARE`" re-architecture notes.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};

thread_local! {
    static THREAD_TASKAWARE: Cell<bool> = const { Cell::new(true) };
}

/// Whether the calling thread currently treats blocking primitives as task-aware.
///
/// When `false`, blocking primitives must bypass the Ticket Manager entirely and call the
/// underlying library's blocking primitive directly.
#[must_use]
pub fn thread_taskaware() -> bool {
    THREAD_TASKAWARE.with(Cell::get)
}

/// Sets whether the calling thread treats blocking primitives as task-aware.
pub fn set_thread_taskaware(enabled: bool) {
    THREAD_TASKAWARE.with(|cell| cell.set(enabled));
}

/// The threading level the underlying message-passing library reports at init.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ThreadLevel {
    /// Only one thread will execute.
    Single,
    /// Multiple threads, but only the thread that initialized the library makes library calls.
    Funneled,
    /// Multiple threads may make library calls, but never concurrently.
    Serialized,
    /// Multiple threads may make library calls concurrently.
    Multiple,
}

static BLOCKING_MODE: AtomicBool = AtomicBool::new(false);
static NONBLOCKING_MODE: AtomicBool = AtomicBool::new(false);
static AUTO_INIT: AtomicBool = AtomicBool::new(true);
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Whether the library currently intercepts blocking primitives.
#[must_use]
pub fn blocking_mode() -> bool {
    BLOCKING_MODE.load(Ordering::Acquire)
}

/// Whether the library currently intercepts non-blocking primitives.
#[must_use]
pub fn nonblocking_mode() -> bool {
    NONBLOCKING_MODE.load(Ordering::Acquire)
}

/// Whether the library should initialize itself when the underlying library initializes.
#[must_use]
pub fn auto_init() -> bool {
    AUTO_INIT.load(Ordering::Acquire)
}

/// Sets [`auto_init`]. Only meaningful before [`initialize`] has run.
pub fn set_auto_init(enabled: bool) {
    AUTO_INIT.store(enabled, Ordering::Release);
}

/// Enables non-blocking mode unconditionally and blocking mode only if `provided` is
/// [`ThreadLevel::Multiple`], matching the original design's statement that blocking mode
/// requires full thread safety from the underlying library while non-blocking mode tolerates a
/// weaker level.
///
/// Aborts if called while already initialized (a state error per the failure semantics table).
pub fn initialize(provided: ThreadLevel) {
    if INITIALIZED.swap(true, Ordering::AcqRel) {
        crate::error::abort_with_diagnostic("initialize() called while already initialized");
    }
    NONBLOCKING_MODE.store(true, Ordering::Release);
    BLOCKING_MODE.store(provided == ThreadLevel::Multiple, Ordering::Release);
    tracing::debug!(?provided, blocking = blocking_mode(), "tampi core initialized");
}

/// Disables both modes. Callers must have already torn down the polling tasks (via
/// [`crate::polling::PollingHandle::stop`]) before calling this.
///
/// Aborts if called before [`initialize`] (a state error per the failure semantics table).
pub fn finalize() {
    if !INITIALIZED.swap(false, Ordering::AcqRel) {
        crate::error::abort_with_diagnostic("finalize() called before initialize()");
    }
    BLOCKING_MODE.store(false, Ordering::Release);
    NONBLOCKING_MODE.store(false, Ordering::Release);
    tracing::debug!("tampi core finalized");
}
