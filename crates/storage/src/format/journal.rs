//! Journal file format
//!
//! The journal is the store's single entry point: a fixed-size file naming
//! the root node. Without a valid journal there is nothing to export, so
//! journal errors are fatal, unlike segment damage.
//!
//! # Format
//!
//! ```text
//! +--------------------+
//! | Magic: "GRVJ"      | 4 bytes
//! | Format Version     | 4 bytes (u32 LE)
//! | Store UUID         | 16 bytes
//! | Root Segment UUID  | 16 bytes
//! | Root Record Index  | 4 bytes (u32 LE)
//! | CRC32              | 4 bytes
//! +--------------------+
//! ```

use crate::format::records::{NodeRef, SegmentId};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Journal magic bytes: "GRVJ"
pub const JOURNAL_MAGIC: [u8; 4] = *b"GRVJ";

/// Current journal format version
pub const JOURNAL_FORMAT_VERSION: u32 = 1;

/// Journal file size in bytes
pub const JOURNAL_SIZE: usize = 48;

/// File name of the journal inside the store directory.
pub const JOURNAL_FILE: &str = "journal";

/// Path of the journal file under `store_dir`.
pub fn journal_path(store_dir: &Path) -> PathBuf {
    store_dir.join(JOURNAL_FILE)
}

/// The parsed journal: store identity plus the root node reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Journal {
    /// Format version for forward compatibility.
    pub format_version: u32,
    /// Unique store identifier, assigned when the store is written.
    pub store_uuid: [u8; 16],
    /// Reference to the root node record.
    pub root: NodeRef,
}

impl Journal {
    /// Journal for a fresh store rooted at `root`.
    pub fn new(store_uuid: [u8; 16], root: NodeRef) -> Self {
        Journal {
            format_version: JOURNAL_FORMAT_VERSION,
            store_uuid,
            root,
        }
    }

    /// Serialize to the fixed on-disk form.
    pub fn to_bytes(&self) -> [u8; JOURNAL_SIZE] {
        let mut bytes = [0u8; JOURNAL_SIZE];
        bytes[0..4].copy_from_slice(&JOURNAL_MAGIC);
        bytes[4..8].copy_from_slice(&self.format_version.to_le_bytes());
        bytes[8..24].copy_from_slice(&self.store_uuid);
        bytes[24..40].copy_from_slice(self.root.segment.as_bytes());
        bytes[40..44].copy_from_slice(&self.root.index.to_le_bytes());
        let crc = crc32fast::hash(&bytes[..44]);
        bytes[44..48].copy_from_slice(&crc.to_le_bytes());
        bytes
    }

    /// Parse and validate the on-disk form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, JournalError> {
        if bytes.len() != JOURNAL_SIZE {
            return Err(JournalError::WrongSize {
                expected: JOURNAL_SIZE,
                actual: bytes.len(),
            });
        }
        if bytes[0..4] != JOURNAL_MAGIC {
            return Err(JournalError::InvalidMagic);
        }

        let stored_crc = u32::from_le_bytes(bytes[44..48].try_into().unwrap());
        let computed_crc = crc32fast::hash(&bytes[..44]);
        if stored_crc != computed_crc {
            return Err(JournalError::ChecksumMismatch {
                expected: stored_crc,
                computed: computed_crc,
            });
        }

        let format_version = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        if format_version > JOURNAL_FORMAT_VERSION {
            return Err(JournalError::UnsupportedVersion {
                version: format_version,
                max_supported: JOURNAL_FORMAT_VERSION,
            });
        }

        let store_uuid: [u8; 16] = bytes[8..24].try_into().unwrap();
        let root_segment: [u8; 16] = bytes[24..40].try_into().unwrap();
        let root_index = u32::from_le_bytes(bytes[40..44].try_into().unwrap());

        Ok(Journal {
            format_version,
            store_uuid,
            root: NodeRef {
                segment: SegmentId::from_bytes(root_segment),
                index: root_index,
            },
        })
    }
}

/// Errors from validating a journal file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JournalError {
    /// The file is not exactly [`JOURNAL_SIZE`] bytes.
    #[error("journal must be {expected} bytes, found {actual}")]
    WrongSize {
        /// Required size
        expected: usize,
        /// Size found on disk
        actual: usize,
    },

    /// Magic bytes do not match.
    #[error("invalid journal magic bytes")]
    InvalidMagic,

    /// Checksum over the journal body failed.
    #[error("journal checksum mismatch: stored {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// CRC stored in the file
        expected: u32,
        /// CRC computed over the file body
        computed: u32,
    },

    /// Written by a newer format than this reader supports.
    #[error("unsupported journal version {version}, max supported is {max_supported}")]
    UnsupportedVersion {
        /// Version found in the file
        version: u32,
        /// Maximum version this reader understands
        max_supported: u32,
    },
}
