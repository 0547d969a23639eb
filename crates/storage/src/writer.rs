//! Store writer
//!
//! Packs any `NodeSource` tree into store files: children are packed
//! before their parent so every `NodeRef` is assigned by the time the
//! referring record is placed, segments are cut at a bounded record count,
//! and the journal is written last so a store is never observable with a
//! root pointing at missing segments.

use crate::blobs::BlobStore;
use crate::error::{Result, StoreError};
use crate::format::journal::{journal_path, Journal};
use crate::format::records::{
    segment_path, NodeRecord, NodeRef, PropertyRecord, SegmentId, ValueRecord, SEGMENTS_DIR,
};
use crate::format::segment::encode_segment;
use grove_core::{FragmentUnavailable, NodeSource, PropertySource};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Default record count at which a segment is cut.
pub const DEFAULT_MAX_RECORDS_PER_SEGMENT: usize = 512;

/// Default size above which binary values go to the blob store.
pub const DEFAULT_INLINE_VALUE_LIMIT: usize = 4096;

/// Writes a store directory from a source tree.
#[derive(Debug)]
pub struct StoreWriter {
    dir: PathBuf,
    blobs: Option<BlobStore>,
    max_records: usize,
    inline_limit: usize,
}

impl StoreWriter {
    /// Writer targeting the store directory `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        StoreWriter {
            dir: dir.into(),
            blobs: None,
            max_records: DEFAULT_MAX_RECORDS_PER_SEGMENT,
            inline_limit: DEFAULT_INLINE_VALUE_LIMIT,
        }
    }

    /// Externalize large binary values into the blob store at `blob_dir`,
    /// creating it if needed.
    pub fn with_blob_store(mut self, blob_dir: impl Into<PathBuf>) -> Result<Self> {
        self.blobs = Some(BlobStore::create(blob_dir)?);
        Ok(self)
    }

    /// Cut segments after `count` records (minimum 1).
    pub fn max_records_per_segment(mut self, count: usize) -> Self {
        self.max_records = count.max(1);
        self
    }

    /// Keep binary values up to `bytes` long inline in their segment.
    pub fn inline_value_limit(mut self, bytes: usize) -> Self {
        self.inline_limit = bytes;
        self
    }

    /// Pack the tree rooted at `root` and write the store.
    ///
    /// The source must be fully readable: any fragment-unavailable from it
    /// aborts the write.
    pub fn write(self, root: &dyn NodeSource) -> Result<Journal> {
        fs::create_dir_all(self.dir.join(SEGMENTS_DIR))?;

        let mut packer = Packer {
            store_dir: &self.dir,
            blobs: self.blobs.as_ref(),
            max_records: self.max_records,
            inline_limit: self.inline_limit,
            current: SegmentId::new(),
            batch: Vec::new(),
            segments_written: 0,
        };
        let root_ref = packer.pack_node(root)?;
        packer.flush()?;
        let segments_written = packer.segments_written;

        let journal = Journal::new(*Uuid::new_v4().as_bytes(), root_ref);
        fs::write(journal_path(&self.dir), journal.to_bytes())?;

        tracing::info!(
            store = %self.dir.display(),
            segments = segments_written,
            "store written"
        );
        Ok(journal)
    }
}

struct Packer<'a> {
    store_dir: &'a Path,
    blobs: Option<&'a BlobStore>,
    max_records: usize,
    inline_limit: usize,
    current: SegmentId,
    batch: Vec<NodeRecord>,
    segments_written: usize,
}

impl Packer<'_> {
    fn pack_node(&mut self, node: &dyn NodeSource) -> Result<NodeRef> {
        let mut names = Vec::new();
        for item in node.child_names() {
            names.push(item?);
        }

        let mut children = Vec::with_capacity(names.len());
        for name in names {
            let child = node.child(&name)?;
            let child_ref = self.pack_node(&*child)?;
            children.push((name, child_ref));
        }

        let mut properties = Vec::new();
        for item in node.properties() {
            let property = item?;
            properties.push(self.pack_property(&*property)?);
        }

        self.place(NodeRecord {
            properties,
            children,
        })
    }

    fn pack_property(&mut self, property: &dyn PropertySource) -> Result<PropertyRecord> {
        let tag = property.type_tag();
        let mut values = Vec::with_capacity(property.count());
        for index in 0..property.count() {
            if tag.is_binary() {
                let mut bytes = Vec::new();
                property
                    .binary(index)?
                    .read_to_end(&mut bytes)
                    .map_err(|error| match FragmentUnavailable::from_io(&error) {
                        Some(failure) => StoreError::Source(failure.clone()),
                        None => StoreError::Io(error),
                    })?;
                values.push(self.pack_binary(bytes)?);
            } else {
                values.push(ValueRecord::Inline(property.text(index)?));
            }
        }
        Ok(PropertyRecord {
            name: property.name().to_string(),
            tag,
            values,
        })
    }

    fn pack_binary(&mut self, bytes: Vec<u8>) -> Result<ValueRecord> {
        match self.blobs {
            Some(blobs) if bytes.len() > self.inline_limit => {
                Ok(ValueRecord::Blob(blobs.put(&bytes)?))
            }
            _ => Ok(ValueRecord::Bytes(bytes)),
        }
    }

    fn place(&mut self, record: NodeRecord) -> Result<NodeRef> {
        let node_ref = NodeRef {
            segment: self.current,
            index: self.batch.len() as u32,
        };
        self.batch.push(record);
        if self.batch.len() >= self.max_records {
            self.flush()?;
        }
        Ok(node_ref)
    }

    fn flush(&mut self) -> Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let bytes = encode_segment(self.current, &self.batch)?;
        fs::write(segment_path(self.store_dir, self.current), bytes)?;
        self.segments_written += 1;
        self.batch.clear();
        self.current = SegmentId::new();
        Ok(())
    }
}
