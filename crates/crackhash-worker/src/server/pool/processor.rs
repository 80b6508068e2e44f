use crate::server::telemetry::{
    increment_candidates_checked, increment_part_timeouts, increment_parts_completed,
    record_part_duration,
};
use core::time::Duration;
use crackhash::{CompletedPart, Error, Md5Target, Part, RangeEnumerator};
use std::time::Instant;

/// Candidates generated between two deadline checks.
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// Searches one [`Part`] for candidates whose MD5 matches the part's target.
///
/// The deadline is checked before the first candidate and then once every
/// [`DEADLINE_CHECK_INTERVAL`] candidates. When it expires the search stops
/// and the returned part carries an [`Error::PartTimeout`] along with
/// whatever matched so far. A malformed
/// target hash or alphabet is reported the same way, as an error on an
/// otherwise empty result.
///
/// Always returns exactly one [`CompletedPart`] covering `part`'s range.
pub fn search_part(worker_id: usize, part: &Part, timeout: Duration) -> CompletedPart {
    let started = Instant::now();
    let mut completed = CompletedPart::for_part(part);

    let (target, mut enumerator) = match Md5Target::from_hex(&part.hash)
        .and_then(|target| Ok((target, RangeEnumerator::for_part(part)?)))
    {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::warn!(worker_id, task_id = %part.task_id, "Rejecting part: {e}");
            completed.error = Some(e);
            increment_parts_completed();
            return completed;
        }
    };

    // `None` when the timeout is too large to represent as an instant.
    let deadline = started.checked_add(timeout);
    let mut candidate = String::with_capacity(enumerator.longest_word_len());

    while enumerator.has_next() {
        if enumerator.produced() % DEADLINE_CHECK_INTERVAL == 0
            && deadline.is_some_and(|deadline| Instant::now() >= deadline)
        {
            tracing::warn!(
                worker_id,
                task_id = %part.task_id,
                start = part.start,
                end = part.end,
                checked = enumerator.produced(),
                "Part timed out after {timeout:?}"
            );
            completed.error = Some(Error::PartTimeout {
                timeout,
                checked: enumerator.produced(),
            });
            increment_part_timeouts();
            break;
        }

        enumerator.next_into(&mut candidate);
        if target.matches(candidate.as_bytes()) {
            tracing::info!(worker_id, task_id = %part.task_id, "Match found: {candidate:?}");
            completed.data.push(candidate.clone());
        }
    }

    increment_candidates_checked(enumerator.produced());
    increment_parts_completed();
    record_part_duration(started.elapsed().as_secs_f64() * 1_000.0);

    completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::http::request::TaskRequest;
    use crackhash::{md5_hex, partition};

    fn part(hash: &str, start: u64, end: u64) -> Part {
        Part {
            request_id: "req".to_string(),
            task_id: "task".to_string(),
            alphabet: "ab".to_string(),
            hash: hash.to_string(),
            max_length: 3,
            start,
            end,
        }
    }

    #[test]
    fn finds_match_in_range() {
        let completed = search_part(0, &part(&md5_hex(b"ab"), 3, 6), Duration::from_secs(5));
        assert_eq!(completed.data, ["ab"]);
        assert_eq!((completed.start, completed.end), (3, 6));
        assert_eq!(completed.error, None);
    }

    #[test]
    fn match_outside_range_is_not_reported() {
        let completed = search_part(0, &part(&md5_hex(b"ab"), 0, 3), Duration::from_secs(5));
        assert!(completed.data.is_empty());
        assert_eq!(completed.error, None);
    }

    #[test]
    fn uppercase_target_matches() {
        let hash = md5_hex(b"bab").to_uppercase();
        let completed = search_part(0, &part(&hash, 0, 14), Duration::from_secs(5));
        assert_eq!(completed.data, ["bab"]);
    }

    #[test]
    fn empty_part_completes_cleanly() {
        let completed = search_part(0, &part(&md5_hex(b"ab"), 4, 4), Duration::ZERO);
        assert!(completed.data.is_empty());
        assert_eq!(completed.error, None);
    }

    #[test]
    fn zero_timeout_flags_partial_result() {
        let mut large = part(&md5_hex(b"never"), 0, u64::MAX);
        large.alphabet = "abcdefghijklmnopqrstuvwxyz".to_string();

        let started = Instant::now();
        let completed = search_part(0, &large, Duration::ZERO);

        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(completed.data.is_empty());
        assert_eq!((completed.start, completed.end), (0, u64::MAX));
        assert!(matches!(
            completed.error,
            Some(Error::PartTimeout { checked: 0, .. })
        ));
    }

    #[test]
    fn short_timeout_stops_large_search() {
        let mut large = part(&md5_hex(b"never"), 0, u64::MAX);
        large.alphabet = "abcdefghijklmnopqrstuvwxyz".to_string();

        let started = Instant::now();
        let completed = search_part(0, &large, Duration::from_millis(20));

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(completed.error, Some(Error::PartTimeout { .. })));
    }

    #[test]
    fn timeout_is_checked_on_interval_boundaries() {
        let mut large = part(&md5_hex(b"never"), 0, u64::MAX);
        large.alphabet = "abcdefghijklmnopqrstuvwxyz".to_string();

        let completed = search_part(0, &large, Duration::from_millis(20));
        let Some(Error::PartTimeout { checked, .. }) = completed.error else {
            panic!("part should time out, got {:?}", completed.error);
        };
        assert!(checked > 0);
        assert_eq!(checked % DEADLINE_CHECK_INTERVAL, 0);
    }

    #[test]
    fn huge_max_length_from_validated_request_is_searched() {
        let task = TaskRequest {
            request_id: "req".to_string(),
            task_id: "task".to_string(),
            alphabet: "ab".to_string(),
            hash: md5_hex(b"ab"),
            max_length: u64::MAX,
            start: 0,
            end: 6,
        }
        .validate()
        .unwrap();

        let parts = partition(&task, 1).unwrap();
        let completed = search_part(0, &parts[0], Duration::from_secs(5));
        assert_eq!(completed.data, ["ab"]);
        assert_eq!(completed.error, None);
    }

    #[test]
    fn malformed_hash_is_reported() {
        let completed = search_part(0, &part("not-a-hash", 0, 6), Duration::from_secs(5));
        assert!(completed.data.is_empty());
        assert!(matches!(completed.error, Some(Error::InvalidHash { .. })));
    }

    #[test]
    fn malformed_alphabet_is_reported() {
        let mut bad = part(&md5_hex(b"ab"), 0, 6);
        bad.alphabet = "aa".to_string();
        let completed = search_part(0, &bad, Duration::from_secs(5));
        assert!(matches!(completed.error, Some(Error::InvalidAlphabet { .. })));
    }
}
