use crate::{Error, Part, Result};
use core::iter::FusedIterator;

/// Walks a window of the canonical enumeration, starting at a given rank and
/// producing exactly `quota` strings.
///
/// The cursor is a digit vector over the alphabet's index space, most
/// significant digit first. Advancing is a carrying increment; a carry out of
/// the most significant digit grows the vector by one digit, which moves to
/// the first string of the next length.
#[derive(Clone, Debug)]
pub struct RangeEnumerator {
    alphabet: Vec<char>,
    digits: Vec<usize>,
    longest: usize,
    produced: u64,
    quota: u64,
}

impl RangeEnumerator {
    /// Positions a new enumerator at `start` that yields `quota` strings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAlphabet`] if `alphabet` has fewer than two
    /// characters or repeats one.
    pub fn new(alphabet: &str, start: u64, quota: u64) -> Result<Self> {
        Self::with_capacity(alphabet, start, quota, 0)
    }

    /// Like [`RangeEnumerator::new`], reserving room for candidates up to
    /// `max_length` characters so the cursor never reallocates within that
    /// bound.
    ///
    /// `max_length` is only a hint: the reservation never exceeds the length
    /// of the last string in the window, which is at most 64 characters for
    /// any `u64` rank.
    ///
    /// # Errors
    ///
    /// Same as [`RangeEnumerator::new`].
    pub fn with_capacity(alphabet: &str, start: u64, quota: u64, max_length: usize) -> Result<Self> {
        let alphabet = parse_alphabet(alphabet)?;
        let base = alphabet.len() as u128;
        let length = word_len(base, u128::from(start));
        let longest = match quota {
            0 => length,
            _ => word_len(base, u128::from(start) + u128::from(quota) - 1),
        };

        let mut digits = Vec::with_capacity(max_length.clamp(length, longest));
        digits.resize(length, 0);
        let mut offset = u128::from(start) - words_shorter_than(base, length);
        for digit in digits.iter_mut().rev() {
            *digit = (offset % base) as usize;
            offset /= base;
        }

        Ok(Self {
            alphabet,
            digits,
            longest,
            produced: 0,
            quota,
        })
    }

    /// Enumerator over the rank range of `part`.
    ///
    /// # Errors
    ///
    /// Same as [`RangeEnumerator::new`].
    pub fn for_part(part: &Part) -> Result<Self> {
        let max_length = usize::try_from(part.max_length).unwrap_or(usize::MAX);
        Self::with_capacity(&part.alphabet, part.start, part.quota(), max_length)
    }

    /// Returns `true` while fewer than `quota` strings have been produced.
    #[inline]
    pub const fn has_next(&self) -> bool {
        self.produced < self.quota
    }

    /// Number of strings produced so far.
    pub const fn produced(&self) -> u64 {
        self.produced
    }

    /// Length in characters of the last string this enumerator will produce.
    pub const fn longest_word_len(&self) -> usize {
        self.longest
    }

    /// Number of strings left before the quota is reached.
    pub const fn remaining(&self) -> u64 {
        self.quota - self.produced
    }

    /// Writes the string at the current rank into `buf`, replacing its
    /// contents, and advances to the next rank.
    ///
    /// This is the allocation-free path used in hot loops. Callers must check
    /// [`RangeEnumerator::has_next`] first; advancing past the quota is a
    /// logic error.
    #[inline]
    pub fn next_into(&mut self, buf: &mut String) {
        debug_assert!(self.has_next(), "enumerator advanced past its quota");
        buf.clear();
        buf.extend(self.digits.iter().map(|&d| self.alphabet[d]));
        self.advance();
    }

    /// Returns the string at `rank` of the canonical enumeration over
    /// `alphabet`.
    ///
    /// # Errors
    ///
    /// Same as [`RangeEnumerator::new`].
    pub fn word_at(alphabet: &str, rank: u64) -> Result<String> {
        let mut enumerator = Self::new(alphabet, rank, 1)?;
        let mut word = String::new();
        enumerator.next_into(&mut word);
        Ok(word)
    }

    /// Returns the rank of `word` in the canonical enumeration over
    /// `alphabet`, or `None` if `word` is empty, uses a character outside the
    /// alphabet, or its rank does not fit in a `u64`.
    ///
    /// # Errors
    ///
    /// Same as [`RangeEnumerator::new`].
    pub fn rank_of(alphabet: &str, word: &str) -> Result<Option<u64>> {
        let alphabet = parse_alphabet(alphabet)?;
        let base = alphabet.len() as u128;
        let mut offset = 0_u128;
        let mut length = 0;

        for ch in word.chars() {
            let Some(digit) = alphabet.iter().position(|&a| a == ch) else {
                return Ok(None);
            };
            offset = offset.saturating_mul(base).saturating_add(digit as u128);
            length += 1;
        }

        if length == 0 {
            return Ok(None);
        }

        let rank = words_shorter_than(base, length).saturating_add(offset);
        Ok(u64::try_from(rank).ok())
    }

    /// Total number of strings of length `1..=max_length` over an alphabet of
    /// `alphabet_len` characters, or `None` if it does not fit in a `u64`.
    pub fn search_space(alphabet_len: usize, max_length: u64) -> Option<u64> {
        let base = alphabet_len as u64;
        let mut total = 0_u64;
        let mut power = 1_u64;
        for _ in 0..max_length {
            power = power.checked_mul(base)?;
            total = total.checked_add(power)?;
        }
        Some(total)
    }

    fn advance(&mut self) {
        self.produced += 1;

        let base = self.alphabet.len();
        for digit in self.digits.iter_mut().rev() {
            *digit += 1;
            if *digit < base {
                return;
            }
            *digit = 0;
        }

        // Every digit carried: move to the first string one character longer.
        self.digits.insert(0, 0);
    }
}

impl Iterator for RangeEnumerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if !self.has_next() {
            return None;
        }
        let mut word = String::with_capacity(self.digits.len());
        self.next_into(&mut word);
        Some(word)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining()) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for RangeEnumerator {}

/// Splits `alphabet` into its characters, in order.
///
/// # Errors
///
/// Returns [`Error::InvalidAlphabet`] if `alphabet` has fewer than two
/// characters or repeats one.
pub fn parse_alphabet(alphabet: &str) -> Result<Vec<char>> {
    let chars: Vec<char> = alphabet.chars().collect();
    if chars.len() < 2 {
        return Err(Error::InvalidAlphabet {
            reason: format!("need at least 2 characters, got {}", chars.len()),
        });
    }

    let mut sorted = chars.clone();
    sorted.sort_unstable();
    if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(Error::InvalidAlphabet {
            reason: format!("character {:?} appears more than once", pair[0]),
        });
    }

    Ok(chars)
}

/// Smallest length `L` such that `rank` falls among the strings of length `L`.
fn word_len(base: u128, rank: u128) -> usize {
    let mut total = 0_u128;
    let mut power = base;
    let mut length = 1;
    loop {
        total = total.saturating_add(power);
        if rank < total {
            return length;
        }
        length += 1;
        power = power.saturating_mul(base);
    }
}

/// Number of strings strictly shorter than `length`: `b + b^2 + ... + b^(length-1)`.
fn words_shorter_than(base: u128, length: usize) -> u128 {
    let mut total = 0_u128;
    let mut power = base;
    for _ in 1..length {
        total = total.saturating_add(power);
        power = power.saturating_mul(base);
    }
    total
}
