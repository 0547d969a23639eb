//! Fault-tolerant tree serialization
//!
//! This crate implements the exporter: a depth-first walk over any
//! [`grove_core::NodeSource`] that writes a self-describing, line-oriented
//! text form of the tree. Fragments of the store that cannot be read are
//! omitted block-by-block without ever breaking the bracket structure of
//! the stream.
//!
//! # Output grammar
//!
//! ```text
//! document   := "r" NEWLINE nodebody "^" NEWLINE
//! nodebody   := propblock* childblock*
//! propblock  := "p" SP type SP name NEWLINE valueline* "^" NEWLINE
//! childblock := "c" SP name NEWLINE nodebody "^" NEWLINE
//! valueline  := ("v" SP escaped-string | "x" SP base64) NEWLINE
//! ```
//!
//! Every opened block is terminated, no matter where or how often the
//! store fails underneath the walk.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod escape;
mod exporter;

pub use exporter::{export_tree, ExportSummary, Exporter};
