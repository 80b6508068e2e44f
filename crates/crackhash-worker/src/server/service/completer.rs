use core::future::Future;
use crackhash::{CompletedTask, Result};

/// Delivers a fully aggregated task result to whoever issued the task.
///
/// The aggregator calls this exactly once per successfully completed task.
/// Implementations own transport and logging; a failed delivery is reported
/// through the returned error and is never retried.
pub trait Completer: Send + Sync + 'static {
    fn complete(&self, task: CompletedTask) -> impl Future<Output = Result<()>> + Send;
}
