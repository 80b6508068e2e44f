use crate::{Error, Part, Result, Task};

/// Splits `task` into exactly `worker_count` contiguous parts.
///
/// The first `worker_count - 1` parts each span `len / worker_count` ranks and
/// the last part absorbs the remainder, so the union of all parts is exactly
/// `[task.start, task.end)`. Every field other than the range is copied into
/// each part.
///
/// # Errors
///
/// - [`Error::InvalidWorkerCount`] if `worker_count` is zero.
/// - [`Error::InvalidRange`] if `task.start > task.end`.
pub fn partition(task: &Task, worker_count: usize) -> Result<Vec<Part>> {
    if worker_count == 0 {
        return Err(Error::InvalidWorkerCount);
    }
    if task.start > task.end {
        return Err(Error::InvalidRange {
            start: task.start,
            end: task.end,
        });
    }

    let part_size = task.len() / worker_count as u64;
    let mut parts = Vec::with_capacity(worker_count);
    let mut start = task.start;

    for _ in 0..worker_count {
        parts.push(Part {
            request_id: task.request_id.clone(),
            task_id: task.task_id.clone(),
            alphabet: task.alphabet.clone(),
            hash: task.hash.clone(),
            max_length: task.max_length,
            start,
            end: start + part_size,
        });
        start += part_size;
    }

    if let Some(last) = parts.last_mut() {
        last.end = task.end;
    }

    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(start: u64, end: u64) -> Task {
        Task {
            request_id: "req".to_string(),
            task_id: "task".to_string(),
            alphabet: "ab".to_string(),
            hash: "187ef4436122d1cc2f40dc2b92f0eba0".to_string(),
            max_length: 2,
            start,
            end,
        }
    }

    fn assert_covers(task: &Task, parts: &[Part], workers: usize) {
        assert_eq!(parts.len(), workers);
        assert_eq!(parts.first().unwrap().start, task.start);
        assert_eq!(parts.last().unwrap().end, task.end);
        for pair in parts.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "parts must be gap-free");
            assert!(pair[0].start <= pair[0].end);
        }
        let covered: u64 = parts.iter().map(Part::quota).sum();
        assert_eq!(covered, task.len());
    }

    #[test]
    fn splits_evenly() {
        let task = task(0, 6);
        let parts = partition(&task, 2).unwrap();
        assert_covers(&task, &parts, 2);
        assert_eq!((parts[0].start, parts[0].end), (0, 3));
        assert_eq!((parts[1].start, parts[1].end), (3, 6));
    }

    #[test]
    fn last_part_absorbs_remainder() {
        let task = task(10, 27);
        let parts = partition(&task, 4).unwrap();
        assert_covers(&task, &parts, 4);
        assert_eq!(parts[0].quota(), 4);
        assert_eq!(parts[3].quota(), 5);
    }

    #[test]
    fn more_workers_than_ranks() {
        let task = task(5, 7);
        let parts = partition(&task, 5).unwrap();
        assert_covers(&task, &parts, 5);
        assert!(parts[..4].iter().all(|p| p.quota() == 0));
        assert_eq!((parts[4].start, parts[4].end), (5, 7));
    }

    #[test]
    fn coverage_holds_across_shapes() {
        for len in 0..40 {
            for workers in 1..9 {
                let task = task(100, 100 + len);
                let parts = partition(&task, workers).unwrap();
                assert_covers(&task, &parts, workers);
            }
        }
    }

    #[test]
    fn copies_task_fields() {
        let task = task(0, 9);
        for part in partition(&task, 3).unwrap() {
            assert_eq!(part.request_id, task.request_id);
            assert_eq!(part.task_id, task.task_id);
            assert_eq!(part.alphabet, task.alphabet);
            assert_eq!(part.hash, task.hash);
            assert_eq!(part.max_length, task.max_length);
        }
    }

    #[test]
    fn rejects_zero_workers() {
        assert_eq!(partition(&task(0, 6), 0), Err(Error::InvalidWorkerCount));
    }

    #[test]
    fn rejects_inverted_range() {
        assert_eq!(
            partition(&task(6, 2), 2),
            Err(Error::InvalidRange { start: 6, end: 2 })
        );
    }
}
