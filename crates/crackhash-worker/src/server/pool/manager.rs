//! Fixed-size pool of search threads.
//!
//! This module defines the [`WorkerPool`] struct, which owns the OS threads
//! that pull [`Part`]s from a shared intake queue. The queue is shared by all
//! threads, so whichever worker is idle takes the next part; there is no
//! per-worker routing.

use crate::server::pool::worker::worker_loop;
use core::time::Duration;
use crackhash::{CompletedPart, Error, Part, Result};
use crossbeam_channel::Receiver;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;

pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Starts `num_workers` threads draining `parts` and publishing to
    /// `results`.
    ///
    /// Each thread holds its own clone of `results`; the result stream
    /// closes once every thread has exited.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidWorkerCount`] if `num_workers` is zero.
    /// - [`Error::WorkerSpawn`] if a thread cannot be created. Threads that
    ///   were already started exit once `parts` is closed.
    pub fn spawn(
        num_workers: usize,
        part_timeout: Duration,
        parts: Receiver<Part>,
        results: mpsc::Sender<CompletedPart>,
    ) -> Result<Self> {
        if num_workers == 0 {
            return Err(Error::InvalidWorkerCount);
        }

        let mut handles = Vec::with_capacity(num_workers);
        for worker_id in 0..num_workers {
            let parts = parts.clone();
            let results = results.clone();
            let handle = thread::Builder::new()
                .name(format!("crack-worker-{worker_id}"))
                .spawn(move || worker_loop(worker_id, parts, results, part_timeout))
                .map_err(|e| Error::WorkerSpawn {
                    reason: e.to_string(),
                })?;
            handles.push(handle);
        }

        tracing::info!("Worker pool started with {num_workers} workers");

        Ok(Self { handles })
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Blocks until every worker thread has exited.
    ///
    /// Workers only exit once the intake queue is closed, so callers must
    /// drop every `Sender<Part>` first.
    pub fn join(self) {
        for (worker_id, handle) in self.handles.into_iter().enumerate() {
            if handle.join().is_err() {
                tracing::error!("Worker {worker_id} panicked");
            }
        }
        tracing::info!("Worker pool shutdown complete");
    }
}
