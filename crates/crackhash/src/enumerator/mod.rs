//! Rank-addressable candidate enumeration.
//!
//! The canonical enumeration over an alphabet of `b` distinct characters
//! lists every string of length 1, then every string of length 2, and so on.
//! Within one length, strings are ordered like a base-`b` counter with the
//! most significant digit leftmost. The rank of a string is its zero-based
//! position in that order:
//!
//! | rank | 0   | 1   | 2    | 3    | 4    | 5    | 6     |
//! |------|-----|-----|------|------|------|------|-------|
//! | `ab` | `a` | `b` | `aa` | `ab` | `ba` | `bb` | `aaa` |
//!
//! Because rank and string are in bijection, any worker can start at an
//! arbitrary rank without knowing what other workers produced.

mod range;
#[cfg(test)]
mod tests;

pub use range::*;
