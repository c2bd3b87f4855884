//! Core of a task-aware interoperability layer between a cooperative tasking runtime and a
//! message-passing library's non-blocking primitives.
//!
//! This crate intercepts blocking and non-blocking point-to-point and collective operations
//! issued from inside user tasks, turns them into non-blocking primitives of an underlying
//! message-passing library via the [`Issuer`](issuer::Issuer) seam, tracks their completion
//! cooperatively through a [`ticket_manager::TicketManager`], and resumes the issuing task (or
//! releases its external events) when the operations complete. The host tasking runtime and the
//! message-passing library themselves are external collaborators, represented here only as the
//! [`task::Task`] / [`task::TaskingRuntime`] / [`issuer::Issuer`] traits the rest of the crate is
//! generic over.

pub mod allocator;
pub mod capacity;
pub mod completion;
pub mod environment;
pub mod error;
pub mod issuer;
pub mod operation;
pub mod polling;
pub mod polling_period;
pub mod task;
pub mod ticket;
pub mod ticket_manager;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
