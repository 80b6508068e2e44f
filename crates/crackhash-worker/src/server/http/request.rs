use crackhash::{MD5_DIGEST_LEN, Task, parse_alphabet};
use serde::Deserialize;

/// Body of a task submission.
///
/// Every field defaults when absent so that a missing field is reported as a
/// validation failure rather than a malformed body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskRequest {
    pub request_id: String,
    pub task_id: String,
    pub alphabet: String,
    pub hash: String,
    pub max_length: u64,
    pub start: u64,
    pub end: u64,
}

impl TaskRequest {
    /// Checks the request and maps it to a [`Task`].
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason for the first failed check.
    pub fn validate(self) -> Result<Task, String> {
        if self.request_id.is_empty() {
            return Err("request_id is required".to_string());
        }
        if self.task_id.is_empty() {
            return Err("task_id is required".to_string());
        }

        parse_alphabet(&self.alphabet).map_err(|e| e.to_string())?;

        if self.hash.len() != MD5_DIGEST_LEN * 2 || !self.hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("hash must be 32 hex characters".to_string());
        }
        if self.max_length == 0 {
            return Err("max_length must be at least 1".to_string());
        }
        if self.end <= self.start {
            return Err("end must be greater than start".to_string());
        }

        Ok(Task {
            request_id: self.request_id,
            task_id: self.task_id,
            alphabet: self.alphabet,
            hash: self.hash,
            max_length: self.max_length,
            start: self.start,
            end: self.end,
        })
    }
}
