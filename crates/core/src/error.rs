//! The core's error taxonomy and its single process-abort boundary.
//!
//! Configuration errors are ordinary `Result`s callers can report before anything starts
//! polling. Everything else the original design calls fatal (a full pre-queue with fail-fast
//! on, an exhausted allocator, a non-success return from the underlying library, an undefined
//! test result) funnels through [`abort_with_diagnostic`], the one place in this crate that
//! calls [`std::process::abort`].

use std::fmt::Display;

/// Errors surfaced by the core outside of configuration parsing.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Re-exports a configuration parsing failure.
    #[error(transparent)]
    Config(#[from] tampi_config::error::Error),

    /// One of the conditions the original design treats as unrecoverable.
    #[error("{0}")]
    Fatal(String),
}

/// Logs `message` at `error` level and aborts the process.
///
/// This is the only call to [`std::process::abort`] in the crate; every fatal condition in
/// §4.9 of the design (full pre-queue with fail-fast on, exhausted allocator, a non-success
/// library return, an undefined batch-test result, a completion-queue overflow) routes through
/// here so the abort path is a single audit point.
pub fn abort_with_diagnostic(message: impl Display) -> ! {
    tracing::error!(%message, "tampi: fatal error, aborting");
    std::process::abort();
}
