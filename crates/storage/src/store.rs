//! Read-only segment store
//!
//! `SegmentStore` resolves the journal, loads segments lazily, and hands
//! out `StoreNode` views implementing the capability traits. Loaded
//! segments are cached for the lifetime of the store handle.
//!
//! Damage policy: a segment file that is missing, truncated, checksum-bad,
//! or undecodable makes exactly the nodes stored in it unavailable —
//! reads of those nodes report `segment/<uuid>` as the failed fragment.
//! Only the journal is load-bearing for the whole store.

use crate::blobs::BlobStore;
use crate::error::{Result, StoreError};
use crate::format::journal::{journal_path, Journal};
use crate::format::records::{
    segment_path, BlobId, NodeRecord, NodeRef, PropertyRecord, SegmentId, ValueRecord,
};
use crate::format::segment::decode_segment;
use grove_core::{
    FragmentUnavailable, NameIter, NodeSource, PropertyIter, PropertySource, ReadResult, TypeTag,
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn segment_fragment(id: SegmentId) -> FragmentUnavailable {
    FragmentUnavailable::new(format!("segment/{id}"))
}

struct StoreInner {
    dir: PathBuf,
    blobs: Option<BlobStore>,
    segments: RwLock<FxHashMap<SegmentId, Arc<Vec<NodeRecord>>>>,
}

impl StoreInner {
    /// Load a segment through the cache. Every failure mode maps to the
    /// segment's fragment being unavailable.
    fn segment(&self, id: SegmentId) -> ReadResult<Arc<Vec<NodeRecord>>> {
        if let Some(records) = self.segments.read().get(&id) {
            return Ok(Arc::clone(records));
        }

        let path = segment_path(&self.dir, id);
        let bytes = fs::read(&path).map_err(|_| segment_fragment(id))?;
        let (header, records) = decode_segment(&bytes).map_err(|error| {
            tracing::debug!(segment = %id, %error, "segment rejected");
            segment_fragment(id)
        })?;
        if header.segment_id != id {
            // The file answers to a different identity than its name.
            return Err(segment_fragment(id));
        }

        let records = Arc::new(records);
        self.segments.write().insert(id, Arc::clone(&records));
        Ok(records)
    }

}

fn load_node(store: &Arc<StoreInner>, node_ref: NodeRef) -> ReadResult<StoreNode> {
    let records = store.segment(node_ref.segment)?;
    if node_ref.index as usize >= records.len() {
        // Dangling reference; the segment cannot mean what the referrer
        // thinks it does.
        return Err(segment_fragment(node_ref.segment));
    }
    Ok(StoreNode {
        store: Arc::clone(store),
        records,
        index: node_ref.index as usize,
    })
}

/// Handle on an opened store.
///
/// Cheap to clone; all clones share one segment cache.
#[derive(Clone)]
pub struct SegmentStore {
    inner: Arc<StoreInner>,
    journal: Journal,
}

impl SegmentStore {
    /// Open the store at `dir` without a blob store. `Blob` values will
    /// read as unavailable fragments.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::open_inner(dir.into(), None)
    }

    /// Open the store at `dir` with the blob store at `blob_dir`.
    pub fn open_with_blobs(dir: impl Into<PathBuf>, blob_dir: impl Into<PathBuf>) -> Result<Self> {
        let blobs = BlobStore::open(blob_dir)?;
        Self::open_inner(dir.into(), Some(blobs))
    }

    fn open_inner(dir: PathBuf, blobs: Option<BlobStore>) -> Result<Self> {
        let path = journal_path(&dir);
        let bytes = fs::read(&path).map_err(|error| {
            if error.kind() == std::io::ErrorKind::NotFound {
                StoreError::MissingJournal(dir.clone())
            } else {
                StoreError::Io(error)
            }
        })?;
        let journal = Journal::from_bytes(&bytes)?;

        tracing::info!(
            store = %dir.display(),
            root_segment = %journal.root.segment,
            "opened segment store"
        );

        Ok(SegmentStore {
            inner: Arc::new(StoreInner {
                dir,
                blobs,
                segments: RwLock::new(FxHashMap::default()),
            }),
            journal,
        })
    }

    /// The journal this store was opened from.
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Resolve the root node.
    ///
    /// An unavailable root means there is nothing to export; callers treat
    /// this as fatal.
    pub fn root(&self) -> ReadResult<StoreNode> {
        load_node(&self.inner, self.journal.root)
    }
}

/// One node of an opened store.
pub struct StoreNode {
    store: Arc<StoreInner>,
    records: Arc<Vec<NodeRecord>>,
    index: usize,
}

impl StoreNode {
    fn record(&self) -> &NodeRecord {
        &self.records[self.index]
    }
}

impl NodeSource for StoreNode {
    fn properties(&self) -> PropertyIter<'_> {
        Box::new(self.record().properties.iter().map(move |record| {
            Ok(Box::new(StoreProperty {
                store: &self.store,
                record,
            }) as Box<dyn PropertySource + '_>)
        }))
    }

    fn child_names(&self) -> NameIter<'_> {
        Box::new(
            self.record()
                .children
                .iter()
                .map(|(name, _)| Ok(name.clone())),
        )
    }

    fn child(&self, name: &str) -> ReadResult<Box<dyn NodeSource + '_>> {
        let node_ref = self
            .record()
            .children
            .iter()
            .find(|(child_name, _)| child_name == name)
            .map(|(_, node_ref)| *node_ref)
            .ok_or_else(|| FragmentUnavailable::new(format!("child/{name}")))?;
        let node = load_node(&self.store, node_ref)?;
        Ok(Box::new(node))
    }
}

struct StoreProperty<'a> {
    store: &'a Arc<StoreInner>,
    record: &'a PropertyRecord,
}

impl StoreProperty<'_> {
    fn blob_stream(&self, id: &BlobId) -> ReadResult<Box<dyn Read + '_>> {
        match &self.store.blobs {
            Some(blobs) => Ok(Box::new(blobs.get(id)?)),
            // No blob store configured: the payload exists somewhere, just
            // not anywhere this reader can see.
            None => Err(FragmentUnavailable::new(BlobStore::fragment_id(id))),
        }
    }
}

impl PropertySource for StoreProperty<'_> {
    fn name(&self) -> &str {
        &self.record.name
    }

    fn type_tag(&self) -> TypeTag {
        self.record.tag
    }

    fn count(&self) -> usize {
        self.record.values.len()
    }

    fn text(&self, index: usize) -> ReadResult<String> {
        match &self.record.values[index] {
            ValueRecord::Inline(value) => Ok(value.clone()),
            ValueRecord::Bytes(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
            ValueRecord::Blob(id) => {
                // Tag/value shape mismatch in the store; read it anyway.
                let mut bytes = Vec::new();
                self.blob_stream(id)?
                    .read_to_end(&mut bytes)
                    .map_err(|error| match FragmentUnavailable::from_io(&error) {
                        Some(failure) => failure.clone(),
                        None => FragmentUnavailable::new(BlobStore::fragment_id(id)),
                    })?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
    }

    fn binary(&self, index: usize) -> ReadResult<Box<dyn Read + '_>> {
        match &self.record.values[index] {
            ValueRecord::Inline(value) => Ok(Box::new(Cursor::new(value.clone().into_bytes()))),
            ValueRecord::Bytes(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            ValueRecord::Blob(id) => self.blob_stream(id),
        }
    }
}

/// Whether `dir` looks like a store: an existing journal file.
pub fn is_store(dir: &Path) -> bool {
    journal_path(dir).is_file()
}
