//! Omission behavior under injected store failures.
//!
//! The guiding invariant: failures change which blocks appear, never the
//! shape of the stream. An unreadable subtree exports exactly like a tree
//! that never contained it, apart from diagnostics.

use crate::checker::assert_wellformed;
use grove::{Exporter, ExportSummary, MemoryNode, MemoryProperty, MemoryValue, ValueKind};

fn export(root: &MemoryNode) -> (String, String, ExportSummary) {
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

#[test]
fn broken_subtree_exports_like_an_absent_one() {
    let shared = |node: MemoryNode| {
        node.with_string("before", "1")
            .with_child("left", MemoryNode::new().with_long("n", 1))
            .with_child("right", MemoryNode::new().with_long("n", 2))
    };

    let with_ghost = shared(MemoryNode::new())
        .with_unavailable_child("ghost", "segment/dead")
        .with_string("after", "2");
    let without_ghost = shared(MemoryNode::new()).with_string("after", "2");

    let (broken_out, broken_diag, broken_summary) = export(&with_ghost);
    let (clean_out, clean_diag, _) = export(&without_ghost);

    assert_eq!(broken_out, clean_out);
    assert_eq!(broken_diag, "fragment unavailable: segment/dead\n");
    assert!(clean_diag.is_empty());
    assert!(broken_summary.is_partial());
}

#[test]
fn failures_at_several_depths_are_all_contained() {
    let tree = MemoryNode::new()
        .with_property(MemoryProperty::scalar(
            "lost",
            ValueKind::String,
            MemoryValue::unavailable("segment/p1"),
        ))
        .with_string("kept", "yes")
        .with_child(
            "branch",
            MemoryNode::new()
                .with_unavailable_child("sub", "segment/c1")
                .with_child(
                    "deeper",
                    MemoryNode::new()
                        .with_longs("ok", [1, 2])
                        .cut_children_after(0, "segment/e1"),
                ),
        );

    let (out, _, summary) = export(&tree);
    assert_wellformed(&out);
    assert_eq!(summary.omissions, 3);
    assert_eq!(summary.fragments.len(), 3);
    assert!(out.contains("p STRING kept\n"));
    assert!(out.contains("p LONGS ok\n"));
    assert!(!out.contains("lost"));
    assert!(!out.contains("c sub"));
}

#[test]
fn property_listing_cut_spares_the_children() {
    let tree = MemoryNode::new()
        .with_string("first", "1")
        .with_string("second", "2")
        .with_string("third", "3")
        .cut_properties_after(2, "segment/plist")
        .with_child("still_here", MemoryNode::new());

    let (out, _, summary) = export(&tree);
    assert_wellformed(&out);
    assert!(out.contains("p STRING first\n"));
    assert!(out.contains("p STRING second\n"));
    assert!(!out.contains("third"));
    assert!(out.contains("c still_here\n"));
    assert_eq!(summary.omissions, 1);
}

#[test]
fn repeated_fragment_reports_once_but_counts_each_omission() {
    let tree = MemoryNode::new()
        .with_property(MemoryProperty::scalar(
            "a",
            ValueKind::Long,
            MemoryValue::unavailable("segment/shared"),
        ))
        .with_child(
            "inner",
            MemoryNode::new().with_property(MemoryProperty::scalar(
                "b",
                ValueKind::Long,
                MemoryValue::unavailable("segment/shared"),
            )),
        );

    let (out, diag, summary) = export(&tree);
    assert_wellformed(&out);
    assert_eq!(diag.lines().count(), 1);
    assert_eq!(summary.omissions, 2);
    assert_eq!(summary.fragments.len(), 1);
}

#[test]
fn summary_counts_committed_work_only() {
    let tree = MemoryNode::new()
        .with_string("kept", "v")
        .with_property(MemoryProperty::scalar(
            "dropped",
            ValueKind::String,
            MemoryValue::unavailable("segment/x"),
        ))
        .with_child("child", MemoryNode::new().with_long("n", 9));

    let (_, _, summary) = export(&tree);
    assert_eq!(summary.nodes, 2);
    assert_eq!(summary.properties, 2);
    assert_eq!(summary.omissions, 1);
}
