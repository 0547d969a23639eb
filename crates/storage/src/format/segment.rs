//! Segment file format
//!
//! Segments are named `<uuid>.seg` under `segments/`. Each file carries a
//! fixed header, a bincode payload of node records, and a trailing CRC32
//! over everything before it. Any validation failure here is reported by
//! the reader as the segment being unavailable; the formats themselves
//! stay policy-free.
//!
//! # File Structure
//!
//! ```text
//! +------------------+ 0
//! | SegmentHeader    | 32 bytes
//! +------------------+ 32
//! | Payload          | header.payload_len bytes (bincode Vec<NodeRecord>)
//! +------------------+
//! | CRC32            | 4 bytes, over header + payload
//! +------------------+
//! ```

use crate::format::records::{NodeRecord, SegmentId};
use thiserror::Error;

/// Segment magic bytes: "GRVS"
pub const SEGMENT_MAGIC: [u8; 4] = *b"GRVS";

/// Current segment format version
pub const SEGMENT_FORMAT_VERSION: u32 = 1;

/// Segment header size in bytes
pub const SEGMENT_HEADER_SIZE: usize = 32;

/// Segment file header (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentHeader {
    /// Format version for forward compatibility.
    pub format_version: u32,
    /// Identifier this file claims; must match the file name and the
    /// reference that led here.
    pub segment_id: SegmentId,
    /// Number of records in the payload.
    pub record_count: u32,
    /// Payload length in bytes.
    pub payload_len: u32,
}

impl SegmentHeader {
    /// Serialize to the fixed on-disk form.
    pub fn to_bytes(&self) -> [u8; SEGMENT_HEADER_SIZE] {
        let mut bytes = [0u8; SEGMENT_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&SEGMENT_MAGIC);
        bytes[4..8].copy_from_slice(&self.format_version.to_le_bytes());
        bytes[8..24].copy_from_slice(self.segment_id.as_bytes());
        bytes[24..28].copy_from_slice(&self.record_count.to_le_bytes());
        bytes[28..32].copy_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }

    /// Parse the fixed on-disk form.
    pub fn from_bytes(bytes: &[u8; SEGMENT_HEADER_SIZE]) -> Result<Self, SegmentError> {
        if bytes[0..4] != SEGMENT_MAGIC {
            return Err(SegmentError::InvalidMagic);
        }
        let format_version = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        if format_version > SEGMENT_FORMAT_VERSION {
            return Err(SegmentError::UnsupportedVersion {
                version: format_version,
                max_supported: SEGMENT_FORMAT_VERSION,
            });
        }
        Ok(SegmentHeader {
            format_version,
            segment_id: SegmentId::from_bytes(bytes[8..24].try_into().unwrap()),
            record_count: u32::from_le_bytes(bytes[24..28].try_into().unwrap()),
            payload_len: u32::from_le_bytes(bytes[28..32].try_into().unwrap()),
        })
    }
}

/// Encode a complete segment file for `id` holding `records`.
pub fn encode_segment(id: SegmentId, records: &[NodeRecord]) -> Result<Vec<u8>, SegmentError> {
    let payload = bincode::serialize(records).map_err(|e| SegmentError::Encode(e.to_string()))?;
    let header = SegmentHeader {
        format_version: SEGMENT_FORMAT_VERSION,
        segment_id: id,
        record_count: records.len() as u32,
        payload_len: payload.len() as u32,
    };

    let mut bytes = Vec::with_capacity(SEGMENT_HEADER_SIZE + payload.len() + 4);
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(&payload);
    let crc = crc32fast::hash(&bytes);
    bytes.extend_from_slice(&crc.to_le_bytes());
    Ok(bytes)
}

/// Decode and validate a complete segment file.
pub fn decode_segment(bytes: &[u8]) -> Result<(SegmentHeader, Vec<NodeRecord>), SegmentError> {
    if bytes.len() < SEGMENT_HEADER_SIZE + 4 {
        return Err(SegmentError::TooShort);
    }

    let body = &bytes[..bytes.len() - 4];
    let stored_crc = u32::from_le_bytes(bytes[bytes.len() - 4..].try_into().unwrap());
    let computed_crc = crc32fast::hash(body);
    if stored_crc != computed_crc {
        return Err(SegmentError::ChecksumMismatch {
            expected: stored_crc,
            computed: computed_crc,
        });
    }

    let header_bytes: &[u8; SEGMENT_HEADER_SIZE] =
        body[..SEGMENT_HEADER_SIZE].try_into().unwrap();
    let header = SegmentHeader::from_bytes(header_bytes)?;

    let payload = &body[SEGMENT_HEADER_SIZE..];
    if payload.len() != header.payload_len as usize {
        return Err(SegmentError::PayloadLengthMismatch {
            expected: header.payload_len,
            actual: payload.len() as u32,
        });
    }

    let records: Vec<NodeRecord> =
        bincode::deserialize(payload).map_err(|e| SegmentError::Decode(e.to_string()))?;
    if records.len() != header.record_count as usize {
        return Err(SegmentError::RecordCountMismatch {
            expected: header.record_count,
            actual: records.len() as u32,
        });
    }

    Ok((header, records))
}

/// Errors from encoding or validating a segment file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    /// The file is shorter than a header plus checksum.
    #[error("segment file too short")]
    TooShort,

    /// Magic bytes do not match.
    #[error("invalid segment magic bytes")]
    InvalidMagic,

    /// Written by a newer format than this reader supports.
    #[error("unsupported segment version {version}, max supported is {max_supported}")]
    UnsupportedVersion {
        /// Version found in the file
        version: u32,
        /// Maximum version this reader understands
        max_supported: u32,
    },

    /// Checksum over header and payload failed.
    #[error("segment checksum mismatch: stored {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// CRC stored in the file
        expected: u32,
        /// CRC computed over the file body
        computed: u32,
    },

    /// Payload length does not match the header.
    #[error("segment payload length mismatch: header says {expected}, found {actual}")]
    PayloadLengthMismatch {
        /// Length claimed by the header
        expected: u32,
        /// Length actually present
        actual: u32,
    },

    /// Record count does not match the header.
    #[error("segment record count mismatch: header says {expected}, found {actual}")]
    RecordCountMismatch {
        /// Count claimed by the header
        expected: u32,
        /// Count actually decoded
        actual: u32,
    },

    /// Payload could not be serialized.
    #[error("payload serialization failed: {0}")]
    Encode(String),

    /// Payload could not be deserialized.
    #[error("payload deserialization failed: {0}")]
    Decode(String),
}
