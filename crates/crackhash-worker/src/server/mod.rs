//! Worker node internals.
//!
//! ## Structure
//!
//! - [`config`] - CLI/env configuration.
//! - [`telemetry`] - logging and optional metrics.
//! - [`pool`] - search threads.
//! - [`service`] - task execution lifecycle and result aggregation.
//! - [`http`] - inbound task API.
//! - [`client`] - outbound manager client.

pub mod client;
pub mod config;
pub mod http;
pub mod pool;
pub mod service;
pub mod telemetry;
