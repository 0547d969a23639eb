//! Node records carried in segment payloads
//!
//! A segment payload is a bincode-encoded `Vec<NodeRecord>`. Records refer
//! to nodes in other segments through `NodeRef`, so a tree can span any
//! number of segment files and a damaged file takes out only the subtrees
//! rooted in it.

use grove_core::TypeTag;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Unique identifier of one segment file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentId(Uuid);

impl SegmentId {
    /// A fresh random identifier.
    pub fn new() -> Self {
        SegmentId(Uuid::new_v4())
    }

    /// Rebuild an identifier from its raw bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        SegmentId(Uuid::from_bytes(bytes))
    }

    /// The raw bytes of this identifier.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for SegmentId {
    fn default() -> Self {
        SegmentId::new()
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Directory holding segment files, relative to the store root.
pub const SEGMENTS_DIR: &str = "segments";

/// Path of the segment file for `id` under `store_dir`.
pub fn segment_path(store_dir: &Path, id: SegmentId) -> PathBuf {
    store_dir.join(SEGMENTS_DIR).join(format!("{id}.seg"))
}

/// Identifier of a blob in the blob store: the hex form of the content
/// hash, assigned when the blob is written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobId(String);

impl BlobId {
    /// Wrap an identifier in its string form.
    pub fn new(id: impl Into<String>) -> Self {
        BlobId(id.into())
    }

    /// The string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a node record: which segment, which slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    /// Segment holding the record.
    pub segment: SegmentId,
    /// Index of the record within the segment.
    pub index: u32,
}

/// One stored node: its properties and its named children, both in store
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Properties in store order.
    pub properties: Vec<PropertyRecord>,
    /// Child name/reference pairs in store order.
    pub children: Vec<(String, NodeRef)>,
}

/// One stored property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    /// Property name, emitted verbatim.
    pub name: String,
    /// Declared type tag.
    pub tag: TypeTag,
    /// Value slots; one for scalars, any number for arrays.
    pub values: Vec<ValueRecord>,
}

/// One stored value slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueRecord {
    /// Non-binary value in its final string form.
    Inline(String),
    /// Small binary value held in the segment itself.
    Bytes(Vec<u8>),
    /// Large binary value stored in the blob store.
    Blob(BlobId),
}
