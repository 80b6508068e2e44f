//! Error types shared by the enumeration engine and the worker service.
//!
//! `Error` is `Clone` so that a [`CompletedPart`](crate::CompletedPart) can
//! carry the reason its search was cut short all the way to the aggregator.

use core::time::Duration;

pub type Result<T> = core::result::Result<T, Error>;

/// All errors `crackhash` and the worker service can produce.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// A task cannot be partitioned across zero workers.
    #[error("Worker count must be greater than 0")]
    InvalidWorkerCount,

    /// The rank range is inverted.
    #[error("Invalid range: start {start} is greater than end {end}")]
    InvalidRange { start: u64, end: u64 },

    /// The alphabet is too short or contains repeated characters.
    #[error("Invalid alphabet: {reason}")]
    InvalidAlphabet { reason: String },

    /// The target digest is not a well-formed hex MD5 digest.
    #[error("Invalid hash: {reason}")]
    InvalidHash { reason: String },

    /// The per-part deadline expired before the range was exhausted.
    #[error("Part timed out after {timeout:?} ({checked} candidates checked)")]
    PartTimeout { timeout: Duration, checked: u64 },

    /// The search over a part panicked; its range was not fully checked.
    #[error("Part search panicked: {reason}")]
    PartPanicked { reason: String },

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,

    /// Internal channel send/receive failure.
    #[error("Channel error: {context}")]
    ChannelError { context: String },

    /// A pool executor thread could not be started.
    #[error("Failed to spawn worker: {reason}")]
    WorkerSpawn { reason: String },

    /// The manager did not accept a completed task.
    #[error("Completion failed: {reason}")]
    Completion { reason: String },
}
