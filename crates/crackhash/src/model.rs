//! Data records that flow through the worker: a [`Task`] is split into
//! [`Part`]s, each part is searched into a [`CompletedPart`], and the parts of
//! one task are merged into a [`CompletedTask`].

use crate::Error;

/// One cracking job received from the manager.
///
/// `[start, end)` is a half-open range of ranks in the canonical enumeration
/// over `alphabet`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Task {
    pub request_id: String,
    pub task_id: String,
    pub alphabet: String,
    pub hash: String,
    pub max_length: u64,
    pub start: u64,
    pub end: u64,
}

impl Task {
    /// Number of candidates covered by this task.
    pub const fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A contiguous slice of a [`Task`] assigned to exactly one pool worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Part {
    pub request_id: String,
    pub task_id: String,
    pub alphabet: String,
    pub hash: String,
    pub max_length: u64,
    pub start: u64,
    pub end: u64,
}

impl Part {
    /// Number of candidates the enumerator must produce for this part.
    pub const fn quota(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}

/// Outcome of searching one [`Part`].
///
/// `error` is set when the search was cut short; `data` then holds whatever
/// matched before that point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletedPart {
    pub request_id: String,
    pub task_id: String,
    pub data: Vec<String>,
    pub start: u64,
    pub end: u64,
    pub error: Option<Error>,
}

impl CompletedPart {
    /// Starts an empty result covering the same range as `part`.
    pub fn for_part(part: &Part) -> Self {
        Self {
            request_id: part.request_id.clone(),
            task_id: part.task_id.clone(),
            data: Vec::new(),
            start: part.start,
            end: part.end,
            error: None,
        }
    }
}

/// A fully merged task result, ready to be reported to the manager.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompletedTask {
    pub request_id: String,
    pub task_id: String,
    pub worker_id: String,
    pub start: u64,
    pub end: u64,
    pub data: Vec<String>,
}
