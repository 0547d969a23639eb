//! The recoverable error channel
//!
//! A store that can only be partially read reports the unreadable pieces as
//! [`FragmentUnavailable`] values carrying an opaque [`FragmentId`]. Every
//! fallible store operation returns [`ReadResult`], so the condition is an
//! explicit result checked at each call site, never an unwind.

use std::fmt;
use std::io;
use thiserror::Error;

/// Opaque identifier of a storage fragment that could not be read.
///
/// Backends choose their own identifiers; consumers only compare and
/// display them. The on-disk segment store uses `segment/<uuid>` and
/// `blob/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FragmentId(String);

impl FragmentId {
    /// Create an identifier from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        FragmentId(id.into())
    }

    /// The string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FragmentId {
    fn from(id: &str) -> Self {
        FragmentId(id.to_string())
    }
}

impl From<String> for FragmentId {
    fn from(id: String) -> Self {
        FragmentId(id)
    }
}

/// A specific piece of the backing store could not be read at this moment.
///
/// This is the only recoverable failure in the system. Everything else
/// (sink I/O, malformed setup, unreadable journal) is fatal and surfaces
/// through ordinary error propagation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fragment unavailable: {fragment}")]
pub struct FragmentUnavailable {
    /// Identifier of the fragment that failed to load.
    pub fragment: FragmentId,
}

impl FragmentUnavailable {
    /// Report the fragment with the given identifier as unavailable.
    pub fn new(fragment: impl Into<FragmentId>) -> Self {
        FragmentUnavailable {
            fragment: fragment.into(),
        }
    }

    /// Wrap this condition in an `io::Error` so it can travel through a
    /// byte stream's `Read` implementation. [`FragmentUnavailable::from_io`]
    /// recovers it on the other side.
    pub fn into_io(self) -> io::Error {
        io::Error::new(io::ErrorKind::Other, self)
    }

    /// Recover a condition previously wrapped with
    /// [`FragmentUnavailable::into_io`], if the error carries one.
    pub fn from_io(error: &io::Error) -> Option<&FragmentUnavailable> {
        error
            .get_ref()
            .and_then(|source| source.downcast_ref::<FragmentUnavailable>())
    }
}

/// Result of a store operation that may find its fragment unavailable.
pub type ReadResult<T> = Result<T, FragmentUnavailable>;
