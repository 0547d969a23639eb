//! Segment-file storage backend for grove
//!
//! This crate implements a read-only, file-backed node store and the
//! writer that produces it:
//! - on-disk formats (journal + segment files, CRC32-validated)
//! - SegmentStore: reader implementing the capability traits, with a
//!   segment cache; missing or corrupt segments surface as recoverable
//!   fragment-unavailable conditions
//! - BlobStore: content-addressed files for large binary payloads
//! - StoreWriter: packs any `NodeSource` into store files
//!
//! # Store layout
//!
//! ```text
//! <store>/
//!   journal                 fixed-size root pointer, CRC-terminated
//!   segments/<uuid>.seg     node record segments
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod blobs;
pub mod error;
pub mod format;
pub mod store;
pub mod writer;

pub use blobs::BlobStore;
pub use error::{Result, StoreError};
pub use format::journal::{
    journal_path, Journal, JournalError, JOURNAL_FORMAT_VERSION, JOURNAL_MAGIC, JOURNAL_SIZE,
};
pub use format::records::{
    segment_path, BlobId, NodeRecord, NodeRef, PropertyRecord, SegmentId, ValueRecord,
};
pub use format::segment::{SegmentError, SegmentHeader, SEGMENT_FORMAT_VERSION, SEGMENT_HEADER_SIZE, SEGMENT_MAGIC};
pub use store::{is_store, SegmentStore, StoreNode};
pub use writer::StoreWriter;
