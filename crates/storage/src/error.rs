//! Fatal store errors
//!
//! Everything here aborts the run. Recoverable read failures never appear
//! as `StoreError`; they travel as `grove_core::FragmentUnavailable`.

use crate::format::journal::JournalError;
use crate::format::segment::SegmentError;
use grove_core::FragmentUnavailable;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Fatal errors from opening or writing a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No journal file at the given store location
    #[error("no store at {0}: journal file missing")]
    MissingJournal(PathBuf),

    /// The journal file is present but invalid
    #[error("invalid journal: {0}")]
    Journal(#[from] JournalError),

    /// A segment could not be encoded while writing a store
    #[error("segment encoding failed: {0}")]
    Segment(#[from] SegmentError),

    /// The source tree handed to the writer was itself partially
    /// unreadable; writers only operate on healthy trees
    #[error("source unreadable: {0}")]
    Source(#[from] FragmentUnavailable),
}
