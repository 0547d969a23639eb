//! Write-to-disk, damage, re-open, export.
//!
//! These tests drive the whole pipeline: pack a memory tree into a store
//! directory, then exercise the exporter against the intact store and
//! against deliberately damaged copies.

use crate::checker::assert_wellformed;
use grove::{
    journal_path, Exporter, ExportSummary, Journal, MemoryNode, SegmentStore, StoreWriter,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn sample_tree() -> MemoryNode {
    MemoryNode::new()
        .with_string("name", "catalog")
        .with_longs("counts", [10, 20, 30])
        .with_binary("thumb", vec![0x00, 0x01, 0x02])
        .with_child(
            "items",
            MemoryNode::new()
                .with_string("label", "first\nline two")
                .with_child("leaf", MemoryNode::new().with_boolean("done", true)),
        )
        .with_child("meta", MemoryNode::new().with_double("version", 2.5))
}

fn export_store(store: &SegmentStore) -> (String, String, ExportSummary) {
    let root = store.root().expect("root resolves");
    let mut out = Vec::new();
    let mut diag = Vec::new();
    let summary = Exporter::new(&mut out, &mut diag)
        .export(&root)
        .expect("in-memory sinks cannot fail");
    (
        String::from_utf8(out).unwrap(),
        String::from_utf8(diag).unwrap(),
        summary,
    )
}

fn export_memory(root: &MemoryNode) -> String {
    let mut out = Vec::new();
    Exporter::new(&mut out, Vec::new()).export(&root).unwrap();
    String::from_utf8(out).unwrap()
}

/// Segment files other than the one the journal's root lives in.
fn non_root_segments(store_dir: &Path) -> Vec<std::path::PathBuf> {
    let journal = Journal::from_bytes(&fs::read(journal_path(store_dir)).unwrap()).unwrap();
    let root_file = format!("{}.seg", journal.root.segment);
    fs::read_dir(store_dir.join("segments"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.file_name().unwrap().to_str().unwrap() != root_file)
        .collect()
}

#[test]
fn disk_round_trip_matches_the_memory_export() {
    let dir = tempdir().unwrap();
    let tree = sample_tree();

    StoreWriter::new(dir.path()).write(&tree).unwrap();
    let store = SegmentStore::open(dir.path()).unwrap();

    let (from_disk, diag, summary) = export_store(&store);
    assert_wellformed(&from_disk);
    assert!(!summary.is_partial());
    assert!(diag.is_empty());
    assert_eq!(from_disk, export_memory(&tree));
}

#[test]
fn blob_backed_store_round_trips_binaries() {
    let dir = tempdir().unwrap();
    let store_dir = dir.path().join("store");
    let blob_dir = dir.path().join("blobs");

    let payload: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
    let tree = sample_tree().with_binary("archive", payload);

    StoreWriter::new(&store_dir)
        .with_blob_store(&blob_dir)
        .unwrap()
        .inline_value_limit(256)
        .write(&tree)
        .unwrap();

    let store = SegmentStore::open_with_blobs(&store_dir, &blob_dir).unwrap();
    let (from_disk, _, summary) = export_store(&store);
    assert!(!summary.is_partial());
    assert_eq!(from_disk, export_memory(&tree));
}

#[test]
fn deleted_segment_yields_partial_but_wellformed_output() {
    let dir = tempdir().unwrap();
    StoreWriter::new(dir.path())
        .max_records_per_segment(1)
        .write(&sample_tree())
        .unwrap();

    let victims = non_root_segments(dir.path());
    assert!(!victims.is_empty(), "tree must span several segments");
    fs::remove_file(&victims[0]).unwrap();

    let store = SegmentStore::open(dir.path()).unwrap();
    let (output, diag, summary) = export_store(&store);
    assert_wellformed(&output);
    assert!(summary.is_partial());
    assert!(diag.starts_with("fragment unavailable: segment/"));
}

#[test]
fn corrupt_segment_yields_partial_but_wellformed_output() {
    let dir = tempdir().unwrap();
    StoreWriter::new(dir.path())
        .max_records_per_segment(1)
        .write(&sample_tree())
        .unwrap();

    let victims = non_root_segments(dir.path());
    let mut bytes = fs::read(&victims[0]).unwrap();
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0x80;
    fs::write(&victims[0], &bytes).unwrap();

    let store = SegmentStore::open(dir.path()).unwrap();
    let (output, _, summary) = export_store(&store);
    assert_wellformed(&output);
    assert!(summary.is_partial());
}

#[test]
fn store_without_its_blob_directory_omits_external_binaries_only() {
    let dir = tempdir().unwrap();
    let store_dir = dir.path().join("store");
    let blob_dir = dir.path().join("blobs");

    let tree = sample_tree().with_binary("archive", vec![0xaa; 50_000]);
    StoreWriter::new(&store_dir)
        .with_blob_store(&blob_dir)
        .unwrap()
        .inline_value_limit(256)
        .write(&tree)
        .unwrap();

    // Open with no blob store configured at all.
    let store = SegmentStore::open(&store_dir).unwrap();
    let (output, diag, summary) = export_store(&store);
    assert_wellformed(&output);
    assert!(summary.is_partial());
    assert!(!output.contains("p BINARY archive"));
    // Inline values are untouched by the missing blob directory.
    assert!(output.contains("p BINARY thumb\nx AAEC\n"));
    assert!(diag.starts_with("fragment unavailable: blob/"));
}

#[test]
fn deleted_blob_file_is_contained_to_its_property() {
    let dir = tempdir().unwrap();
    let store_dir = dir.path().join("store");
    let blob_dir = dir.path().join("blobs");

    let tree = sample_tree().with_binary("archive", vec![0xbb; 50_000]);
    StoreWriter::new(&store_dir)
        .with_blob_store(&blob_dir)
        .unwrap()
        .inline_value_limit(256)
        .write(&tree)
        .unwrap();

    // Remove every blob file, keep the directory.
    for entry in fs::read_dir(&blob_dir).unwrap() {
        fs::remove_dir_all(entry.unwrap().path()).unwrap();
    }

    let store = SegmentStore::open_with_blobs(&store_dir, &blob_dir).unwrap();
    let (output, _, summary) = export_store(&store);
    assert_wellformed(&output);
    assert!(summary.is_partial());
    assert!(!output.contains("p BINARY archive"));
    assert!(output.contains("c items\n"));
    assert!(output.contains("c meta\n"));
}

#[test]
fn truncated_journal_fails_the_open() {
    let dir = tempdir().unwrap();
    StoreWriter::new(dir.path()).write(&sample_tree()).unwrap();

    let path = journal_path(dir.path());
    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() - 4]).unwrap();

    assert!(SegmentStore::open(dir.path()).is_err());
}
