//! Content checksum: CRC-32/ISO-HDLC.
//!
//! Reflected polynomial 0xEDB88320, initial value and final XOR 0xFFFFFFFF.
//! The same variant as zlib, PNG and Ethernet, so values can be checked with
//! standard tooling.

/// Checksum of `bytes`.
pub fn checksum(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}
