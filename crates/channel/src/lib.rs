//! Bounded, cross-thread queue primitives.
//!
//! This crate provides the two queue shapes the rest of the workspace builds on: a
//! per-CPU-partitioned multi-producer queue ([`percpu::PerCpuQueue`]) and a single bounded queue
//! usable directly or behind a producer-side lock ([`spsc::BoundedQueue`],
//! [`spsc::MultiProducerQueue`]).

pub mod error;
pub mod percpu;
pub mod spsc;
