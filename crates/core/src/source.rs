//! Capability traits implemented by storage backends
//!
//! A backend exposes its tree through two object-safe traits:
//! - [`NodeSource`]: property and child-name enumeration, child lookup
//! - [`PropertySource`]: name, tag, and lazy per-index value access
//!
//! Enumerations are iterators of [`ReadResult`] items, so a listing can
//! fail partway through: everything yielded before the failure is valid.
//! Any backend implementing these traits plugs into the exporter unchanged.

use crate::fragment::ReadResult;
use crate::types::TypeTag;
use std::io::Read;

/// Iterator over a node's properties. Items after an `Err` are undefined;
/// consumers stop at the first failure.
pub type PropertyIter<'a> = Box<dyn Iterator<Item = ReadResult<Box<dyn PropertySource + 'a>>> + 'a>;

/// Iterator over a node's child names, in store order.
pub type NameIter<'a> = Box<dyn Iterator<Item = ReadResult<String>> + 'a>;

/// Read-only view of one node in the tree.
pub trait NodeSource {
    /// Enumerate the node's properties in store order.
    fn properties(&self) -> PropertyIter<'_>;

    /// Enumerate the node's child names in store order.
    fn child_names(&self) -> NameIter<'_>;

    /// Resolve the child with the given name.
    ///
    /// `name` is expected to come from [`NodeSource::child_names`]; looking
    /// up any other name reports a synthetic unavailable fragment.
    fn child(&self, name: &str) -> ReadResult<Box<dyn NodeSource + '_>>;
}

/// Read-only view of one property: a name, a tag, and one or more values.
pub trait PropertySource {
    /// The property name. Emitted verbatim on the wire.
    fn name(&self) -> &str;

    /// The declared type tag, shared by every value.
    fn type_tag(&self) -> TypeTag;

    /// Number of values: 1 for scalars, the element count for arrays.
    /// An array property may be empty.
    fn count(&self) -> usize;

    /// The store-coerced string form of the value at `index`.
    fn text(&self, index: usize) -> ReadResult<String>;

    /// A fresh, independently readable byte stream for the value at
    /// `index`. Each call opens a new stream.
    fn binary(&self, index: usize) -> ReadResult<Box<dyn Read + '_>>;
}

impl<T: NodeSource + ?Sized> NodeSource for &T {
    fn properties(&self) -> PropertyIter<'_> {
        (**self).properties()
    }

    fn child_names(&self) -> NameIter<'_> {
        (**self).child_names()
    }

    fn child(&self, name: &str) -> ReadResult<Box<dyn NodeSource + '_>> {
        (**self).child(name)
    }
}

impl<T: PropertySource + ?Sized> PropertySource for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn type_tag(&self) -> TypeTag {
        (**self).type_tag()
    }

    fn count(&self) -> usize {
        (**self).count()
    }

    fn text(&self, index: usize) -> ReadResult<String> {
        (**self).text(index)
    }

    fn binary(&self, index: usize) -> ReadResult<Box<dyn Read + '_>> {
        (**self).binary(index)
    }
}
