//! Task execution lifecycle.
//!
//! [`TaskExecutionService`] owns the intake queue, the [`WorkerPool`] and the
//! [`ResultAggregator`]:
//!
//! ```text
//! Task -> partition -> [intake, depth 0] -> pool threads -> [results] -> aggregator -> Completer
//! ```
//!
//! The intake queue is a zero-capacity rendezvous channel, so submitting a
//! part blocks until a pool thread is idle and ready to take it. That hand-off
//! is the only backpressure in the system: a caller submitting faster than
//! the pool drains is stalled rather than buffered.

use crate::server::{
    pool::manager::WorkerPool,
    service::{aggregator::ResultAggregator, completer::Completer},
    telemetry::increment_tasks_received,
};
use core::time::Duration;
use crackhash::{Error, Part, Result, Task, partition};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};

/// Handle to a running task execution pipeline. Cheap to clone.
#[derive(Clone)]
pub struct TaskExecutionService {
    inner: Arc<Inner>,
}

struct Inner {
    num_workers: usize,
    state: Mutex<Option<Running>>,
}

struct Running {
    parts: Sender<Part>,
    pool: WorkerPool,
    aggregator: JoinHandle<()>,
}

impl TaskExecutionService {
    /// Creates the intake queue and result stream, starts `num_workers` pool
    /// threads and spawns the aggregator onto the current Tokio runtime.
    ///
    /// Every task submitted afterwards is split into exactly `num_workers`
    /// parts, and completed tasks are reported through `completer` tagged
    /// with `worker_id`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidWorkerCount`] if `num_workers` is zero.
    /// - [`Error::WorkerSpawn`] if a pool thread cannot be created.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn start<C: Completer>(
        num_workers: usize,
        part_timeout: Duration,
        worker_id: String,
        completer: C,
    ) -> Result<Self> {
        if num_workers == 0 {
            return Err(Error::InvalidWorkerCount);
        }

        let (parts_tx, parts_rx) = crossbeam_channel::bounded(0);
        let (results_tx, results_rx) = mpsc::channel(num_workers);

        // The pool holds the only result senders, so the stream closes once
        // every pool thread has exited.
        let pool = WorkerPool::spawn(num_workers, part_timeout, parts_rx, results_tx)?;

        let aggregator = ResultAggregator::new(worker_id, num_workers);
        let aggregator = tokio::spawn(aggregator.run(results_rx, completer));

        tracing::info!(
            num_workers,
            ?part_timeout,
            "Task execution service started"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                num_workers,
                state: Mutex::new(Some(Running {
                    parts: parts_tx,
                    pool,
                    aggregator,
                })),
            }),
        })
    }

    pub fn num_workers(&self) -> usize {
        self.inner.num_workers
    }

    /// Splits `task` into parts and hands each to an idle pool thread,
    /// blocking the calling thread while every worker is busy.
    ///
    /// Must not be called from an async context; use
    /// [`TaskExecutionService::submit_task`] there.
    ///
    /// # Errors
    ///
    /// - [`Error::ServiceShutdown`] if [`TaskExecutionService::shutdown`]
    ///   has been called.
    /// - [`Error::InvalidRange`] if the task's range is inverted.
    pub fn submit_task_blocking(&self, task: Task) -> Result<()> {
        let parts = partition(&task, self.inner.num_workers)?;

        // Clone the sender so the lock is not held while blocked on the
        // hand-off. The clone keeps the intake open until every part of this
        // task is enqueued, even if shutdown starts meanwhile.
        let intake = self
            .inner
            .state
            .lock()
            .as_ref()
            .map(|running| running.parts.clone())
            .ok_or(Error::ServiceShutdown)?;

        tracing::info!(
            request_id = %task.request_id,
            task_id = %task.task_id,
            start = task.start,
            end = task.end,
            parts = parts.len(),
            "Starting task"
        );
        increment_tasks_received();

        for part in parts {
            intake.send(part).map_err(|_| Error::ServiceShutdown)?;
        }

        Ok(())
    }

    /// Async wrapper around [`TaskExecutionService::submit_task_blocking`]
    /// that waits on a blocking thread, so the runtime is never stalled by
    /// backpressure.
    ///
    /// # Errors
    ///
    /// Same as [`TaskExecutionService::submit_task_blocking`], plus
    /// [`Error::ChannelError`] if the blocking submission task panics.
    pub async fn submit_task(&self, task: Task) -> Result<()> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.submit_task_blocking(task))
            .await
            .map_err(|e| Error::ChannelError {
                context: format!("Task submission failed: {e}"),
            })?
    }

    /// Gracefully shuts down the pipeline.
    ///
    /// - Closes the intake queue so no new parts are accepted.
    /// - Waits for every in-flight part to finish and every pool thread to
    ///   exit.
    /// - Waits for the aggregator to drain the now-closed result stream.
    ///
    /// No pool thread or aggregator task outlives this call.
    ///
    /// # Errors
    ///
    /// - [`Error::ServiceShutdown`] if the service was already shut down.
    /// - [`Error::ChannelError`] if a pool thread or the aggregator could not
    ///   be joined.
    pub async fn shutdown(&self) -> Result<()> {
        let Running {
            parts,
            pool,
            aggregator,
        } = self.inner.state.lock().take().ok_or(Error::ServiceShutdown)?;

        tracing::info!("Refusing new tasks");
        drop(parts);

        tracing::debug!("Waiting for {} workers to finish in-flight parts", pool.len());
        tokio::task::spawn_blocking(move || pool.join())
            .await
            .map_err(|e| Error::ChannelError {
                context: format!("Failed to join worker pool: {e}"),
            })?;

        tracing::debug!("Waiting for result aggregator to drain");
        aggregator.await.map_err(|e| Error::ChannelError {
            context: format!("Failed to join result aggregator: {e}"),
        })?;

        tracing::info!("Task execution service stopped");
        Ok(())
    }
}
