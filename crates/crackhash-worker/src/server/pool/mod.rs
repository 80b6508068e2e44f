//! Parallel part execution.
//!
//! - [`manager`] - owns the pool threads ([`manager::WorkerPool`]).
//! - [`worker`] - per-thread intake loop.
//! - [`processor`] - the timed search over one part.

pub mod manager;
pub mod processor;
pub mod worker;
