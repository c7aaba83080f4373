//! Strongly-typed 32-byte digests.
//!
//! Following `TigerStyle`: explicit types prevent bugs from mixing up
//! addresses. An `OverlayAddress` locates a node in the routing space,
//! a `ContentAddress` locates a chunk or file by its bytes, and a
//! `FileHash` is the whole-object digest used for equality checks.
//! All three are 32-byte Keccak-256 digests but must never be confused.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::error::CoreError;

/// Size of every digest type in bytes.
pub const DIGEST_SIZE: usize = 32;

/// Macro to generate strongly-typed 32-byte digest wrappers.
///
/// Each digest type wraps a `[u8; 32]` and provides:
/// - Type safety (can't mix `OverlayAddress` with `ContentAddress`)
/// - Hex Display/FromStr formatting
/// - Zero-cost abstraction (same as the raw array)
macro_rules! define_digest {
    ($name:ident, $prefix:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[repr(transparent)]
        pub struct $name([u8; DIGEST_SIZE]);

        impl $name {
            /// Creates a digest from raw bytes.
            #[inline]
            #[must_use]
            pub const fn new(bytes: [u8; DIGEST_SIZE]) -> Self {
                Self(bytes)
            }

            /// The all-zero digest.
            #[inline]
            #[must_use]
            pub const fn zero() -> Self {
                Self([0u8; DIGEST_SIZE])
            }

            /// Returns the raw bytes.
            #[inline]
            #[must_use]
            pub const fn bytes(&self) -> &[u8; DIGEST_SIZE] {
                &self.0
            }

            /// Returns true if this is the all-zero digest.
            #[must_use]
            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; DIGEST_SIZE]
            }

            /// Draws a uniformly random digest from the generator.
            #[must_use]
            pub fn random<R: Rng>(rng: &mut R) -> Self {
                let mut bytes = [0u8; DIGEST_SIZE];
                rng.fill(&mut bytes[..]);
                Self(bytes)
            }

            /// Parses a digest from a 64-character hex string.
            ///
            /// # Errors
            ///
            /// Returns an error if the input is not 64 hex characters.
            pub fn from_hex(input: &str) -> Result<Self, CoreError> {
                if input.len() != DIGEST_SIZE * 2
                    || !input.bytes().all(|b| b.is_ascii_hexdigit())
                {
                    return Err(CoreError::InvalidAddress {
                        input: input.to_string(),
                        reason: "expected 64 hex characters",
                    });
                }
                let mut bytes = [0u8; DIGEST_SIZE];
                for (i, byte) in bytes.iter_mut().enumerate() {
                    let pair = &input[i * 2..i * 2 + 2];
                    *byte = u8::from_str_radix(pair, 16).map_err(|_| {
                        CoreError::InvalidAddress {
                            input: input.to_string(),
                            reason: "not valid hex",
                        }
                    })?;
                }
                Ok(Self(bytes))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                for byte in &self.0 {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // Short form: prefix plus the first four bytes.
                write!(
                    f,
                    "{}({:02x}{:02x}{:02x}{:02x}..)",
                    $prefix, self.0[0], self.0[1], self.0[2], self.0[3]
                )
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl From<[u8; DIGEST_SIZE]> for $name {
            fn from(bytes: [u8; DIGEST_SIZE]) -> Self {
                Self::new(bytes)
            }
        }
    };
}

define_digest!(
    OverlayAddress,
    "overlay",
    "A node's address in the content-addressed routing space, distinct from its network URL."
);
define_digest!(
    ContentAddress,
    "content",
    "Deterministic digest of a chunk or file's bytes; the correctness oracle for retrieval."
);
define_digest!(
    FileHash,
    "filehash",
    "Whole-object digest of a file's bytes, compared after download for equality."
);

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_hex_roundtrip() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let addr = OverlayAddress::random(&mut rng);
        let hex = addr.to_string();
        assert_eq!(hex.len(), 64);
        assert_eq!(OverlayAddress::from_hex(&hex).unwrap(), addr);
    }

    #[test]
    fn test_from_hex_rejects_bad_length() {
        let result = ContentAddress::from_hex("abcd");
        assert!(matches!(result, Err(CoreError::InvalidAddress { .. })));
    }

    #[test]
    fn test_from_hex_rejects_non_hex() {
        let input = "zz".repeat(32);
        let result = ContentAddress::from_hex(&input);
        assert!(matches!(result, Err(CoreError::InvalidAddress { .. })));
    }

    #[test]
    fn test_from_hex_rejects_signed_digits() {
        // from_str_radix would accept a leading sign; the digest parser
        // must not.
        let input = format!("+{}", "a".repeat(63));
        assert!(matches!(
            ContentAddress::from_hex(&input),
            Err(CoreError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_zero_digest() {
        let zero = OverlayAddress::zero();
        assert!(zero.is_zero());
        assert_eq!(zero.to_string(), "0".repeat(64));
    }

    #[test]
    fn test_random_digests_differ() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let a = ContentAddress::random(&mut rng);
        let b = ContentAddress::random(&mut rng);
        assert_ne!(a, b);
    }
}
