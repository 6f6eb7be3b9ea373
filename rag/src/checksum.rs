//! Content checksums using xxhash.

use xxhash_rust::xxh3::xxh3_64;

/// Computes the checksum binding the metadata file to the vector file it was written with.
#[must_use]
pub fn checksum(bytes: &[u8]) -> u64 {
    xxh3_64(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_content_same_hash() {
        let bytes = b"Hello, world!";
        assert_eq!(checksum(bytes), checksum(bytes));
    }

    #[test]
    fn different_content_different_hash() {
        assert_ne!(checksum(b"Hello, world!"), checksum(b"Goodbye, world!"));
    }

    #[test]
    fn empty_input_hash() {
        assert_ne!(checksum(b""), 0);
    }
}
