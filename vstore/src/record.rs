//! Version record and its fixed-layout binary codec.
//!
//! Layout, all fields little-endian `u32`:
//! ```text
//! current_version
//! timestamp          (only when the layout includes it)
//! file_size
//! checksum
//! history_count
//! history[H]         (zero-padded to the configured depth)
//! ```
//! The encoded size depends only on the layout, never on the record.

use crate::history::History;

const WORD: usize = 4;
const FIXED_WORDS: usize = 4;

/// Shape of an encoded record, fixed per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    pub history_depth: usize,
    pub timestamp: bool,
}

impl RecordLayout {
    pub fn new(history_depth: usize, timestamp: bool) -> Self {
        Self {
            history_depth,
            timestamp,
        }
    }

    /// Exact size of every record encoded with this layout.
    pub fn encoded_len(&self) -> usize {
        WORD * (self.header_words() + self.history_depth)
    }

    fn header_words(&self) -> usize {
        FIXED_WORDS + usize::from(self.timestamp)
    }

    /// History depth a buffer of `len` bytes would have under this layout's
    /// timestamp setting.
    fn depth_for_len(&self, len: usize) -> Option<usize> {
        let header = WORD * self.header_words();
        if len < header || (len - header) % WORD != 0 {
            return None;
        }
        Some((len - header) / WORD)
    }
}

/// Per-key version metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    /// 0 until the first successful write.
    pub current_version: u32,
    pub file_size: u32,
    pub checksum: u32,
    /// Epoch seconds of the last write; 0 when the layout omits it.
    pub timestamp: u32,
    pub history: History,
}

impl VersionRecord {
    /// The record of a key that has never been written.
    pub fn new(history_depth: usize) -> Self {
        Self {
            current_version: 0,
            file_size: 0,
            checksum: 0,
            timestamp: 0,
            history: History::new(history_depth),
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.current_version == 0
    }
}

/// Where a loaded record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaStatus {
    /// No metadata object; the record is the default.
    Absent,
    /// Decoded cleanly with the configured layout.
    Valid,
    /// Decoded from a record written with a different history depth.
    Resized { stored_depth: usize },
    /// Present but undecodable; the record is the default.
    Corrupt,
}

/// Result of decoding a metadata buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub record: VersionRecord,
    pub status: MetaStatus,
}

/// Encode `record` into exactly `layout.encoded_len()` bytes.
///
/// At most `history_depth` entries are written.
pub fn encode(record: &VersionRecord, layout: &RecordLayout) -> Vec<u8> {
    let mut buf = Vec::with_capacity(layout.encoded_len());
    let count = record.history.len().min(layout.history_depth);

    buf.extend_from_slice(&record.current_version.to_le_bytes());
    if layout.timestamp {
        buf.extend_from_slice(&record.timestamp.to_le_bytes());
    }
    buf.extend_from_slice(&record.file_size.to_le_bytes());
    buf.extend_from_slice(&record.checksum.to_le_bytes());
    buf.extend_from_slice(&(count as u32).to_le_bytes());

    let padded = record
        .history
        .iter()
        .take(count)
        .chain(std::iter::repeat(0))
        .take(layout.history_depth);
    for version in padded {
        buf.extend_from_slice(&version.to_le_bytes());
    }
    buf
}

/// Decode a buffer produced by `encode` with the same layout.
///
/// Anything else yields the default record with `MetaStatus::Corrupt`;
/// a partially valid record is never returned.
pub fn decode(buf: &[u8], layout: &RecordLayout) -> Decoded {
    if buf.len() == layout.encoded_len() {
        if let Some(record) = parse(buf, layout, layout.history_depth) {
            return Decoded {
                record,
                status: MetaStatus::Valid,
            };
        }
    }
    corrupt(layout)
}

/// Decode a record written with a different history depth.
///
/// The result keeps the configured capacity, so its history may be longer
/// than the capacity until cleaned up.
pub fn decode_resized(buf: &[u8], layout: &RecordLayout) -> Option<Decoded> {
    let stored_depth = layout.depth_for_len(buf.len())?;
    if stored_depth == layout.history_depth {
        return None;
    }
    let record = parse(buf, layout, stored_depth)?;
    Some(Decoded {
        record,
        status: MetaStatus::Resized { stored_depth },
    })
}

fn corrupt(layout: &RecordLayout) -> Decoded {
    Decoded {
        record: VersionRecord::new(layout.history_depth),
        status: MetaStatus::Corrupt,
    }
}

fn parse(buf: &[u8], layout: &RecordLayout, stored_depth: usize) -> Option<VersionRecord> {
    let words: Vec<u32> = buf
        .chunks_exact(WORD)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    let mut words = words.into_iter();

    let current_version = words.next()?;
    let timestamp = if layout.timestamp { words.next()? } else { 0 };
    let file_size = words.next()?;
    let checksum = words.next()?;
    let count = words.next()? as usize;
    let slots: Vec<u32> = words.collect();

    if slots.len() != stored_depth || count > stored_depth {
        return None;
    }
    let (live, padding) = slots.split_at(count);
    if padding.iter().any(|&v| v != 0) {
        return None;
    }
    // Archived versions are non-zero, unique, and older than the current one
    for (i, &version) in live.iter().enumerate() {
        if version == 0 || version >= current_version || live[..i].contains(&version) {
            return None;
        }
    }

    Some(VersionRecord {
        current_version,
        file_size,
        checksum,
        timestamp,
        history: History::from_entries(live.iter().copied(), layout.history_depth),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(layout: &RecordLayout) -> VersionRecord {
        let mut record = VersionRecord::new(layout.history_depth);
        record.current_version = 4;
        record.file_size = 11;
        record.checksum = 0xDEAD_BEEF;
        record.timestamp = 1_700_000_000;
        record.history.push(2);
        record.history.push(3);
        record
    }

    // ===========================================
    // Layout
    // ===========================================

    #[test]
    fn test_encoded_len() {
        assert_eq!(RecordLayout::new(5, true).encoded_len(), 40);
        assert_eq!(RecordLayout::new(5, false).encoded_len(), 36);
        assert_eq!(RecordLayout::new(2, true).encoded_len(), 28);
    }

    #[test]
    fn test_size_independent_of_history() {
        let layout = RecordLayout::new(5, true);
        let empty = VersionRecord::new(5);
        let full = sample(&layout);
        assert_eq!(encode(&empty, &layout).len(), encode(&full, &layout).len());
    }

    // ===========================================
    // Field order
    // ===========================================

    #[test]
    fn test_field_order_with_timestamp() {
        let layout = RecordLayout::new(3, true);
        let buf = encode(&sample(&layout), &layout);

        let word = |i: usize| u32::from_le_bytes(buf[i * 4..i * 4 + 4].try_into().unwrap());
        assert_eq!(word(0), 4); // current_version
        assert_eq!(word(1), 1_700_000_000); // timestamp
        assert_eq!(word(2), 11); // file_size
        assert_eq!(word(3), 0xDEAD_BEEF); // checksum
        assert_eq!(word(4), 2); // history_count
        assert_eq!(word(5), 2);
        assert_eq!(word(6), 3);
        assert_eq!(word(7), 0); // padding
    }

    #[test]
    fn test_field_order_without_timestamp() {
        let layout = RecordLayout::new(2, false);
        let buf = encode(&sample(&layout), &layout);

        assert_eq!(buf.len(), 24);
        assert_eq!(&buf[4..8], &11u32.to_le_bytes());
    }

    #[test]
    fn test_decode_inverts_encode() {
        for layout in [RecordLayout::new(5, true), RecordLayout::new(2, false)] {
            let record = sample(&layout);
            let decoded = decode(&encode(&record, &layout), &layout);

            assert_eq!(decoded.status, MetaStatus::Valid);
            let mut expected = record.clone();
            if !layout.timestamp {
                expected.timestamp = 0;
            }
            assert_eq!(decoded.record, expected);
        }
    }

    // ===========================================
    // Corruption falls back to the default record
    // ===========================================

    #[test]
    fn test_decode_wrong_length() {
        let layout = RecordLayout::new(5, true);
        let mut buf = encode(&sample(&layout), &layout);
        buf.pop();

        let decoded = decode(&buf, &layout);
        assert_eq!(decoded.status, MetaStatus::Corrupt);
        assert_eq!(decoded.record, VersionRecord::new(5));
    }

    #[test]
    fn test_decode_empty_buffer() {
        let layout = RecordLayout::new(5, true);
        assert_eq!(decode(&[], &layout).status, MetaStatus::Corrupt);
    }

    #[test]
    fn test_decode_count_exceeds_depth() {
        let layout = RecordLayout::new(2, true);
        let mut buf = encode(&sample(&layout), &layout);
        buf[16..20].copy_from_slice(&3u32.to_le_bytes());

        assert_eq!(decode(&buf, &layout).status, MetaStatus::Corrupt);
    }

    #[test]
    fn test_decode_duplicate_entries() {
        let layout = RecordLayout::new(2, true);
        let mut buf = encode(&sample(&layout), &layout);
        buf[24..28].copy_from_slice(&2u32.to_le_bytes());

        assert_eq!(decode(&buf, &layout).status, MetaStatus::Corrupt);
    }

    #[test]
    fn test_decode_entry_not_older_than_current() {
        let layout = RecordLayout::new(2, true);
        let mut buf = encode(&sample(&layout), &layout);
        buf[24..28].copy_from_slice(&4u32.to_le_bytes());

        assert_eq!(decode(&buf, &layout).status, MetaStatus::Corrupt);
    }

    #[test]
    fn test_decode_dirty_padding() {
        let layout = RecordLayout::new(3, true);
        let mut buf = encode(&sample(&layout), &layout);
        buf[28..32].copy_from_slice(&1u32.to_le_bytes());

        assert_eq!(decode(&buf, &layout).status, MetaStatus::Corrupt);
    }

    // ===========================================
    // Records written with another depth
    // ===========================================

    #[test]
    fn test_decode_resized_from_deeper_history() {
        let old = RecordLayout::new(5, true);
        let mut record = VersionRecord::new(5);
        record.current_version = 6;
        for v in 1..=5 {
            record.history.push(v);
        }
        let buf = encode(&record, &old);

        let new = RecordLayout::new(2, true);
        assert_eq!(decode(&buf, &new).status, MetaStatus::Corrupt);

        let resized = decode_resized(&buf, &new).expect("resized");
        assert_eq!(resized.status, MetaStatus::Resized { stored_depth: 5 });
        assert_eq!(resized.record.history.as_slice(), &[1, 2, 3, 4, 5]);
        assert_eq!(resized.record.history.capacity(), 2);
        assert_eq!(resized.record.current_version, 6);
    }

    #[test]
    fn test_decode_resized_rejects_same_depth_and_garbage() {
        let layout = RecordLayout::new(2, true);
        let buf = encode(&sample(&layout), &layout);

        assert!(decode_resized(&buf, &layout).is_none());
        assert!(decode_resized(&[1, 2, 3], &layout).is_none());
        assert!(decode_resized(&buf[..buf.len() - 2], &layout).is_none());
    }

    #[test]
    fn test_encode_truncates_over_capacity_history() {
        let layout = RecordLayout::new(2, false);
        let mut record = VersionRecord::new(2);
        record.current_version = 9;
        record.history = History::from_entries([5, 6, 7], 2);

        let buf = encode(&record, &layout);
        assert_eq!(buf.len(), layout.encoded_len());
        let decoded = decode(&buf, &layout);
        assert_eq!(decoded.status, MetaStatus::Valid);
        assert_eq!(decoded.record.history.as_slice(), &[5, 6]);
    }
}
