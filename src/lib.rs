//! grove - fault-tolerant exporter for hierarchical node stores
//!
//! grove walks a tree of nodes with named, typed properties and named,
//! ordered children, and serializes it to a self-describing, line-oriented
//! text stream. Pieces of the store that cannot be read are omitted
//! block-by-block; the output stays structurally well-formed no matter how
//! damaged the store is.
//!
//! # Quick Start
//!
//! ```ignore
//! use grove::{export_tree, MemoryNode};
//!
//! let tree = MemoryNode::new()
//!     .with_string("name", "x")
//!     .with_child("child", MemoryNode::new().with_boolean("flag", true));
//!
//! let mut out = Vec::new();
//! let summary = export_tree(&tree, &mut out)?;
//! assert!(!summary.is_partial());
//! ```
//!
//! # Architecture
//!
//! - [`grove_core`]: data model, capability traits, in-memory tree
//! - [`grove_export`]: the exporter and its line grammar
//! - [`grove_storage`]: the segment-file backend and blob store
//!
//! The `grove` binary (crates/cli) wires a segment store to the exporter
//! with standard output as the sink.

// Re-export the public API of the member crates
pub use grove_core::*;
pub use grove_export::*;
pub use grove_storage::*;
