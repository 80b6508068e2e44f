//! Task execution: partitioning, dispatch, aggregation and lifecycle.
//!
//! - [`handler`] - [`handler::TaskExecutionService`], the entry point.
//! - [`aggregator`] - merges per-part results into task results.
//! - [`completer`] - the outbound delivery seam.

pub mod aggregator;
pub mod completer;
pub mod handler;
