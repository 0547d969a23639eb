//! Content-addressed blob store
//!
//! Large binary values live outside the segments as individual files named
//! by the xxh3-128 hash of their content, fanned out by the first two hex
//! characters:
//!
//! ```text
//! <blobs>/
//!   3f/3fa92c....blob
//!   c0/c01d17....blob
//! ```
//!
//! `get` opens a fresh file handle per call, so every access yields an
//! independently readable stream. A blob that cannot be opened is reported
//! as an unavailable fragment (`blob/<id>`), never as a fatal error: an
//! export can proceed without its binaries.

use crate::error::{Result, StoreError};
use crate::format::records::BlobId;
use grove_core::{FragmentUnavailable, ReadResult};
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::xxh3_128;

/// A directory of content-addressed blob files.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Open an existing blob directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("blob store directory not found: {}", root.display()),
            )));
        }
        Ok(BlobStore { root })
    }

    /// Create the blob directory if needed and open it.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(BlobStore { root })
    }

    /// Path of the file holding `id`.
    pub fn blob_path(&self, id: &BlobId) -> PathBuf {
        let hex = id.as_str();
        let fan = &hex[..hex.len().min(2)];
        self.root.join(fan).join(format!("{hex}.blob"))
    }

    /// The fragment identifier reported when `id` cannot be read.
    pub fn fragment_id(id: &BlobId) -> String {
        format!("blob/{id}")
    }

    /// Open a fresh stream over the blob's content.
    ///
    /// Failures mid-stream are reported the same way as failures to open:
    /// as the blob's fragment being unavailable.
    pub fn get(&self, id: &BlobId) -> ReadResult<BlobReader> {
        let file = File::open(self.blob_path(id))
            .map_err(|_| FragmentUnavailable::new(Self::fragment_id(id)))?;
        Ok(BlobReader {
            inner: BufReader::new(file),
            fragment: Self::fragment_id(id),
        })
    }

    /// Write `content` and return its identifier. Writing the same content
    /// twice is a no-op returning the same id.
    pub fn put(&self, content: &[u8]) -> Result<BlobId> {
        let id = BlobId::new(format!("{:032x}", xxh3_128(content)));
        let path = self.blob_path(&id);
        if path.exists() {
            return Ok(id);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(id)
    }
}

/// Stream over one blob's content.
///
/// Read failures carry the blob's fragment identifier, so a payload that
/// goes unreadable mid-stream is contained like any other fragment loss.
#[derive(Debug)]
pub struct BlobReader {
    inner: BufReader<File>,
    fragment: String,
}

impl Read for BlobReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner
            .read(buf)
            .map_err(|_| FragmentUnavailable::new(self.fragment.as_str()).into_io())
    }
}
