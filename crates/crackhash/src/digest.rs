use crate::{Error, Result};
use core::str::FromStr;
use md5::{Digest, Md5};

/// Length in bytes of an MD5 digest.
pub const MD5_DIGEST_LEN: usize = 16;

/// A decoded MD5 target digest.
///
/// The hex form is decoded once so matching a candidate is a single hash and
/// a byte comparison, independent of the case of the original hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Md5Target {
    digest: [u8; MD5_DIGEST_LEN],
}

impl Md5Target {
    /// Parses a 32-character hex digest (either case).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHash`] if `hex` is not exactly 32 hex digits.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let mut digest = [0_u8; MD5_DIGEST_LEN];
        hex::decode_to_slice(hex, &mut digest).map_err(|e| Error::InvalidHash {
            reason: format!("{hex:?}: {e}"),
        })?;
        Ok(Self { digest })
    }

    /// Returns `true` if `candidate` hashes to this digest.
    #[inline]
    pub fn matches(&self, candidate: &[u8]) -> bool {
        Md5::digest(candidate)[..] == self.digest[..]
    }

    pub const fn as_bytes(&self) -> &[u8; MD5_DIGEST_LEN] {
        &self.digest
    }
}

impl FromStr for Md5Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

/// Lowercase hex MD5 of `input`.
pub fn md5_hex(input: &[u8]) -> String {
    hex::encode(Md5::digest(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_digest() {
        // md5("ab")
        let target = Md5Target::from_hex("187ef4436122d1cc2f40dc2b92f0eba0").unwrap();
        assert!(target.matches(b"ab"));
        assert!(!target.matches(b"ba"));
        assert!(!target.matches(b""));
    }

    #[test]
    fn hex_case_is_ignored() {
        let lower = Md5Target::from_hex("187ef4436122d1cc2f40dc2b92f0eba0").unwrap();
        let upper: Md5Target = "187EF4436122D1CC2F40DC2B92F0EBA0".parse().unwrap();
        assert_eq!(lower, upper);
        assert!(upper.matches(b"ab"));
    }

    #[test]
    fn md5_hex_is_lowercase() {
        assert_eq!(md5_hex(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(md5_hex(b""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn rejects_malformed_hex() {
        for bad in ["", "abc", "zz7ef4436122d1cc2f40dc2b92f0eba0", "187ef4436122d1cc2f40dc2b92f0eba0ff"] {
            assert!(
                matches!(Md5Target::from_hex(bad), Err(Error::InvalidHash { .. })),
                "{bad:?} should be rejected"
            );
        }
    }
}
