use crate::server::pool::processor::search_part;
use core::time::Duration;
use crackhash::{CompletedPart, Error, Part};
use crossbeam_channel::Receiver;
use std::{any::Any, panic};
use tokio::sync::mpsc;

/// Main execution loop for a pool thread.
///
/// Takes one [`Part`] at a time from the shared intake queue, searches it to
/// completion (or until `part_timeout` expires) and emits exactly one
/// [`CompletedPart`]. Returns once the intake queue is closed and drained, or
/// if the result stream has no consumer left.
///
/// This runs on a dedicated OS thread: the search is CPU bound and
/// `blocking_send` must not be called from within the async runtime.
pub fn worker_loop(
    worker_id: usize,
    parts: Receiver<Part>,
    results: mpsc::Sender<CompletedPart>,
    part_timeout: Duration,
) {
    run_worker(worker_id, parts, results, |part| {
        search_part(worker_id, part, part_timeout)
    });
}

fn run_worker<F>(
    worker_id: usize,
    parts: Receiver<Part>,
    results: mpsc::Sender<CompletedPart>,
    search: F,
) where
    F: Fn(&Part) -> CompletedPart + panic::RefUnwindSafe,
{
    tracing::debug!("Worker {worker_id} started");

    for part in parts.iter() {
        tracing::debug!(
            worker_id,
            request_id = %part.request_id,
            task_id = %part.task_id,
            start = part.start,
            end = part.end,
            "Processing part"
        );

        // A panicking search still yields a result for its part, so the
        // aggregator can resolve the task and this thread keeps serving.
        let completed = panic::catch_unwind(|| search(&part)).unwrap_or_else(|payload| {
            let reason = panic_reason(payload.as_ref());
            tracing::error!(worker_id, task_id = %part.task_id, "Search panicked: {reason}");
            CompletedPart {
                error: Some(Error::PartPanicked { reason }),
                ..CompletedPart::for_part(&part)
            }
        });

        tracing::debug!(
            worker_id,
            task_id = %completed.task_id,
            matches = completed.data.len(),
            failed = completed.error.is_some(),
            "Completed part"
        );

        if let Err(e) = results.blocking_send(completed) {
            tracing::error!("Worker {worker_id} failed to forward result: {e}");
            break;
        }
    }

    tracing::debug!("Worker {worker_id} stopped");
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crackhash::md5_hex;
    use std::thread;

    fn part(task_id: &str) -> Part {
        Part {
            request_id: "req".to_string(),
            task_id: task_id.to_string(),
            alphabet: "ab".to_string(),
            hash: md5_hex(b"ab"),
            max_length: 2,
            start: 0,
            end: 6,
        }
    }

    #[test]
    fn panicking_search_reports_error_and_keeps_serving() {
        let (parts_tx, parts_rx) = crossbeam_channel::bounded(0);
        let (results_tx, mut results_rx) = mpsc::channel(2);

        let worker = thread::spawn(move || {
            run_worker(0, parts_rx, results_tx, |part| {
                assert_ne!(part.task_id, "boom", "search blew up");
                search_part(0, part, Duration::from_secs(5))
            });
        });

        parts_tx.send(part("boom")).unwrap();
        parts_tx.send(part("fine")).unwrap();
        drop(parts_tx);

        let failed = results_rx.blocking_recv().unwrap();
        assert_eq!(failed.task_id, "boom");
        assert_eq!((failed.start, failed.end), (0, 6));
        assert!(failed.data.is_empty());
        assert!(matches!(
            failed.error,
            Some(Error::PartPanicked { ref reason }) if reason.contains("search blew up")
        ));

        let ok = results_rx.blocking_recv().unwrap();
        assert_eq!(ok.task_id, "fine");
        assert_eq!(ok.data, ["ab"]);
        assert_eq!(ok.error, None);

        assert!(results_rx.blocking_recv().is_none());
        worker.join().unwrap();
    }

    #[test]
    fn panic_reason_reads_common_payloads() {
        assert_eq!(panic_reason(&"static"), "static");
        assert_eq!(panic_reason(&"owned".to_string()), "owned");
        assert_eq!(panic_reason(&42_u8), "unknown panic");
    }
}
