//! Core types and traits for grove
//!
//! This crate defines the foundational pieces shared by every backend and
//! by the exporter:
//! - TypeTag / ValueKind: property type discriminators with wire tokens
//! - FragmentId / FragmentUnavailable / ReadResult: the recoverable error
//!   channel for partially readable stores
//! - NodeSource / PropertySource: capability traits any store implements
//! - MemoryNode: an owned in-memory tree with configurable fault injection

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod fragment;
pub mod memory;
pub mod source;
pub mod types;

pub use fragment::{FragmentId, FragmentUnavailable, ReadResult};
pub use memory::{MemoryNode, MemoryProperty, MemoryValue};
pub use source::{NameIter, NodeSource, PropertyIter, PropertySource};
pub use types::{TypeTag, ValueKind};
