//! CRC32 checksums for item records
//!
//! Every record carries a CRC32 (IEEE) over its length prefix and body.
//! A mismatch on read is corruption and is never skipped.

use crc32fast::Hasher;

/// Computes a CRC32 checksum over `data`.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_deterministic() {
        let data = br#"{"id":"a","name":"b","price":1}"#;
        assert_eq!(compute_checksum(data), compute_checksum(data));
    }

    #[test]
    fn test_single_bit_flip_detected() {
        let mut data = b"item record body".to_vec();
        let original = compute_checksum(&data);
        data[4] ^= 0x01;
        assert_ne!(compute_checksum(&data), original);
    }
}
