//! Structured logging bootstrap.
//!
//! Every fallible or state-transitioning step in the core (queue drains, capacity growth,
//! allocator refills, the single process-abort boundary) emits a [`tracing`] event or span; this
//! crate only owns installing a subscriber for them, once, at process start.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Installs a `tracing_subscriber` registry with an `fmt` layer driven by `RUST_LOG`
/// (or `TAMPI_LOG` as a library-specific override), falling back to `info` when neither is set.
///
/// Intended to be called once by the embedding application; calling it more than once is not an
/// error but only the first subscriber wins.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("TAMPI_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = Registry::default().with(filter).with(fmt::layer());
    // Calling this more than once per process is a caller bug, not ours; ignore it rather than
    // panic so embedders that init twice (e.g. in tests) don't crash the process.
    let _ = subscriber.try_init();
}
