//! Merging of partial results into task results.
//!
//! [`ResultAggregator`] is the single consumer of the `CompletedPart` stream.
//! Its per-task map is owned by the aggregation task alone and is never
//! shared with the pool, so merges are applied one at a time in arrival
//! order without any locking.

use crate::server::{
    service::completer::Completer,
    telemetry::{increment_completion_failures, increment_tasks_completed, increment_tasks_dropped},
};
use crackhash::{CompletedPart, CompletedTask, Error};
use std::collections::HashMap;
use tokio::sync::mpsc;

/// A task id is only unique within its request.
type TaskKey = (String, String);

#[derive(Debug)]
struct AggregationEntry {
    start: u64,
    end: u64,
    data: Vec<String>,
    received: usize,
    errors: Vec<Error>,
}

impl AggregationEntry {
    fn seed(part: CompletedPart) -> Self {
        Self {
            start: part.start,
            end: part.end,
            data: part.data,
            received: 1,
            errors: part.error.into_iter().collect(),
        }
    }

    fn merge(&mut self, part: CompletedPart) {
        self.start = self.start.min(part.start);
        self.end = self.end.max(part.end);
        self.data.extend(part.data);
        self.errors.extend(part.error);
        self.received += 1;
    }
}

/// What absorbing one [`CompletedPart`] resolved to.
#[derive(Debug, PartialEq, Eq)]
pub enum Aggregation {
    /// More parts of this task are still outstanding.
    Pending,
    /// Every part arrived without error.
    Complete(CompletedTask),
    /// Every part arrived but at least one failed; the result is discarded.
    Dropped {
        request_id: String,
        task_id: String,
        errors: Vec<Error>,
    },
}

pub struct ResultAggregator {
    worker_id: String,
    expected_parts: usize,
    entries: HashMap<TaskKey, AggregationEntry>,
}

impl ResultAggregator {
    /// `expected_parts` is the number of parts every task was split into.
    pub fn new(worker_id: String, expected_parts: usize) -> Self {
        Self {
            worker_id,
            expected_parts,
            entries: HashMap::new(),
        }
    }

    /// Number of tasks with at least one part received but not yet resolved.
    pub fn in_flight(&self) -> usize {
        self.entries.len()
    }

    /// Merges `part` into its task and evicts the task once all of its parts
    /// have arrived.
    pub fn absorb(&mut self, part: CompletedPart) -> Aggregation {
        if let Some(e) = &part.error {
            tracing::error!(task_id = %part.task_id, "Error during computation: {e}");
        }

        let key = (part.request_id.clone(), part.task_id.clone());
        let received = match self.entries.get_mut(&key) {
            Some(entry) => {
                entry.merge(part);
                entry.received
            }
            None => {
                tracing::debug!(task_id = %key.1, "First part of result");
                let entry = AggregationEntry::seed(part);
                let received = entry.received;
                self.entries.insert(key.clone(), entry);
                received
            }
        };

        if received < self.expected_parts {
            tracing::debug!(
                task_id = %key.1,
                received,
                expected = self.expected_parts,
                "Partial result"
            );
            return Aggregation::Pending;
        }

        let Some(entry) = self.entries.remove(&key) else {
            return Aggregation::Pending;
        };
        let (request_id, task_id) = key;

        if !entry.errors.is_empty() {
            return Aggregation::Dropped {
                request_id,
                task_id,
                errors: entry.errors,
            };
        }

        Aggregation::Complete(CompletedTask {
            request_id,
            task_id,
            worker_id: self.worker_id.clone(),
            start: entry.start,
            end: entry.end,
            data: entry.data,
        })
    }

    /// Consumes `results` until every sender is gone, reporting each
    /// completed task through `completer`.
    ///
    /// Delivery failures and dropped tasks are logged; neither stops the
    /// loop.
    pub async fn run<C: Completer>(mut self, mut results: mpsc::Receiver<CompletedPart>, completer: C) {
        tracing::info!("Result aggregator started");

        while let Some(part) = results.recv().await {
            match self.absorb(part) {
                Aggregation::Pending => {}
                Aggregation::Complete(task) => {
                    tracing::info!(
                        request_id = %task.request_id,
                        task_id = %task.task_id,
                        matches = task.data.len(),
                        "Task complete"
                    );
                    increment_tasks_completed();
                    if let Err(e) = completer.complete(task).await {
                        increment_completion_failures();
                        tracing::error!("Failed to complete task: {e}");
                    }
                }
                Aggregation::Dropped {
                    request_id,
                    task_id,
                    errors,
                } => {
                    increment_tasks_dropped();
                    tracing::error!(
                        %request_id,
                        %task_id,
                        ?errors,
                        "Errors during computation, result won't be sent"
                    );
                }
            }
        }

        if self.in_flight() > 0 {
            tracing::warn!("Result aggregator stopped with {} unfinished tasks", self.in_flight());
        } else {
            tracing::info!("Result aggregator stopped");
        }
    }
}
