//! Postage batch sizing.
//!
//! Uploads require a prepaid postage batch. A batch of depth `d` pays for
//! `2^d` chunks, so the depth for a payload is the ceiling log2 of its
//! chunk count, floored at the network's minimum accepted depth. Callers
//! add [`BATCH_DEPTH_MARGIN`] on top to leave headroom for intermediate
//! chunks and retries.

use crate::chunk::MAX_CHUNK_PAYLOAD;

/// Fixed margin callers add to the estimated depth.
pub const BATCH_DEPTH_MARGIN: u64 = 2;

/// Minimum batch depth nodes accept.
pub const MIN_BATCH_DEPTH: u64 = 16;

/// Estimates the postage batch depth needed to cover a payload.
///
/// Returns the smallest depth whose chunk capacity covers the payload,
/// never less than [`MIN_BATCH_DEPTH`].
#[must_use]
pub fn estimate_batch_depth(payload_size: u64) -> u64 {
    let chunks = payload_size.div_ceil(MAX_CHUNK_PAYLOAD as u64).max(1);
    let depth = u64::from(64 - (chunks - 1).leading_zeros());
    depth.max(MIN_BATCH_DEPTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_payloads_use_minimum_depth() {
        assert_eq!(estimate_batch_depth(0), MIN_BATCH_DEPTH);
        assert_eq!(estimate_batch_depth(1), MIN_BATCH_DEPTH);
        assert_eq!(estimate_batch_depth(1024 * 1024), MIN_BATCH_DEPTH);
    }

    #[test]
    fn test_large_payloads_grow_depth() {
        // 2^20 chunks of 4096 bytes is 4 GiB, needing depth 20.
        let four_gib = 4 * 1024 * 1024 * 1024;
        assert_eq!(estimate_batch_depth(four_gib), 20);
        // One byte more rolls over to the next depth.
        assert_eq!(estimate_batch_depth(four_gib + 1), 21);
    }

    #[test]
    fn test_depth_is_monotonic() {
        let mut last = 0;
        for size in [1, 4096, 1 << 20, 1 << 30, 1 << 33, 1 << 40] {
            let depth = estimate_batch_depth(size);
            assert!(depth >= last);
            last = depth;
        }
    }
}
