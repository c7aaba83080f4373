//! Seeded file content units.
//!
//! A file is a larger byte sequence verified as a whole object: after a
//! download the returned hash is compared against [`File::hash`]. The
//! file also has a content address in the same scheme as chunks, used to
//! request it from a node.

use bytes::Bytes;
use rand::Rng;
use sha3::{Digest, Keccak256};

use crate::address::{ContentAddress, FileHash};
use crate::chunk::content_address;

/// A named, content-addressed file of test data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    name: String,
    data: Bytes,
}

impl File {
    /// Creates a file from existing bytes.
    #[must_use]
    pub fn new(name: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Draws a file of exactly `size` random bytes from the generator.
    #[must_use]
    pub fn random<R: Rng>(rng: &mut R, name: impl Into<String>, size: u64) -> Self {
        #[allow(clippy::cast_possible_truncation)] // sizes are test payloads, well below usize::MAX.
        let mut data = vec![0u8; size as usize];
        rng.fill(&mut data[..]);
        Self {
            name: name.into(),
            data: Bytes::from(data),
        }
    }

    /// Returns the file name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the file bytes.
    #[must_use]
    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Computes the file's content address (request key).
    #[must_use]
    pub fn address(&self) -> ContentAddress {
        content_address(&self.data)
    }

    /// Computes the whole-object hash used for equality after download.
    #[must_use]
    pub fn hash(&self) -> FileHash {
        hash_bytes(&self.data)
    }
}

/// Computes the whole-object hash for a byte sequence.
///
/// Node clients compute the same digest over downloaded bytes so the
/// verification engine can compare hashes instead of full payloads.
#[must_use]
pub fn hash_bytes(data: &[u8]) -> FileHash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    FileHash::new(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_file_size() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let file = File::random(&mut rng, "test", 1024);
        assert_eq!(file.size(), 1024);
        assert_eq!(file.name(), "test");
    }

    #[test]
    fn test_file_hash_matches_bytes() {
        let file = File::new("f", Bytes::from_static(b"some content"));
        assert_eq!(file.hash(), hash_bytes(b"some content"));
        assert_ne!(file.hash(), hash_bytes(b"other content"));
    }

    #[test]
    fn test_seeded_files_reproducible() {
        let mut rng1 = ChaCha8Rng::seed_from_u64(42);
        let mut rng2 = ChaCha8Rng::seed_from_u64(42);
        let a = File::random(&mut rng1, "f", 4096);
        let b = File::random(&mut rng2, "f", 4096);
        assert_eq!(a, b);
        assert_eq!(a.address(), b.address());
        assert_eq!(a.hash(), b.hash());
    }
}
