//! The seam onto the underlying message-passing library's non-blocking primitives.
//!
//! Like [`crate::task`], the underlying library is never named here; [`Issuer`] is the trait the
//! ticket manager is generic over so it can issue, and batch-test, requests without linking a
//! real MPI implementation.

use arrayvec::ArrayVec;

/// Maximum batch size used for any single test/drain pass (`B` in the component design).
pub const BATCH: usize = 64;

/// The outcome of issuing one operation to the underlying library.
///
/// The original design represents "this finished synchronously" with a `REQUEST_NULL` sentinel
/// value compared against after the fact. This crate instead makes the two outcomes a tagged
/// enum, so callers can never forget to check for the sentinel before testing a request.
pub enum IssueOutcome<R, S> {
    /// The library returned a request that must be tested for completion later.
    Pending(R),
    /// The operation already completed synchronously; no request needs tracking.
    Completed(S),
}

/// Issues and tests the non-blocking primitives of the underlying message-passing library.
///
/// `Descriptor` stands in for the per-primitive shim's packaged arguments (buffers, counts,
/// datatypes, peer, tag, communicator, reduction op, root) that this crate never interprets.
pub trait Issuer {
    /// The library's opaque request handle.
    type Request: Copy + Eq;
    /// The library's opaque completion record.
    type Status: Clone;
    /// Opaque, per-primitive packaged arguments needed to issue one operation.
    type Descriptor;

    /// Issues the non-blocking primitive for `descriptor`.
    ///
    /// Per the failure semantics table, a non-success return from the underlying library is
    /// fatal and must not be represented as an `Err` here: implementations should abort directly.
    fn issue(&self, descriptor: &Self::Descriptor) -> IssueOutcome<Self::Request, Self::Status>;

    /// Tests a single request, returning its status if it has completed.
    fn test(&self, request: &Self::Request) -> Option<Self::Status>;

    /// Tests every request in `requests`, returning the indices that completed along with their
    /// statuses. Implementations may assume `requests.len() <= BATCH`.
    fn test_some(&self, requests: &[Self::Request]) -> ArrayVec<(usize, Self::Status), BATCH>;

    /// Tests `requests` and returns the first one found complete, if any. Repeatedly calling
    /// this is how the `testany` approach drains a batch one completion at a time.
    ///
    /// `None` means "nothing completed this round" and is the ordinary outcome of most polling
    /// ticks. The underlying library's `UNDEFINED` return with a non-empty, still-active request
    /// array is a distinct, fatal condition (per the failure semantics table) and is not
    /// representable by this return type: implementations must abort directly rather than
    /// return `None` for it.
    fn test_any(&self, requests: &[Self::Request]) -> Option<(usize, Self::Status)>;
}
