//! The exporter
//!
//! Depth-first, pre-order walk emitting the line grammar. Error
//! containment is all-or-nothing per block:
//! - property blocks render into an uncommitted buffer and are flushed
//!   only when complete
//! - child headers are written only after the child has resolved, so a
//!   started child block always gets its terminator
//! - enumeration failures stop the listing; emitted siblings stand and the
//!   parent still terminates
//!
//! The walk never mutates the source tree. Only sink I/O failures abort
//! the run; every fragment-unavailable condition is contained where it is
//! detected.

use crate::escape::escape_into;
use base64::engine::general_purpose::STANDARD;
use base64::write::EncoderWriter;
use grove_core::{FragmentId, FragmentUnavailable, NodeSource, PropertySource};
use std::collections::HashSet;
use std::io::{self, Read, Write};

/// Outcome of one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Nodes serialized, including the root.
    pub nodes: u64,
    /// Property blocks committed to the sink.
    pub properties: u64,
    /// Contained fragment-unavailable occurrences (omissions), counting
    /// repeats of the same fragment.
    pub omissions: u64,
    /// Distinct unavailable fragments, in first-seen order.
    pub fragments: Vec<FragmentId>,
}

impl ExportSummary {
    /// Whether any part of the tree was omitted.
    pub fn is_partial(&self) -> bool {
        self.omissions > 0
    }
}

/// Serializes one tree to a byte sink, containing recoverable store
/// failures as it goes.
///
/// The exporter owns its fragment dedup set for exactly one run; create a
/// fresh instance per export.
pub struct Exporter<W, D> {
    out: W,
    diag: D,
    seen: HashSet<FragmentId>,
    fragments: Vec<FragmentId>,
    nodes: u64,
    properties: u64,
    omissions: u64,
}

impl<W: Write, D: Write> Exporter<W, D> {
    /// Create an exporter writing the document to `out` and one diagnostic
    /// line per newly seen unavailable fragment to `diag`.
    pub fn new(out: W, diag: D) -> Self {
        Exporter {
            out,
            diag,
            seen: HashSet::new(),
            fragments: Vec::new(),
            nodes: 0,
            properties: 0,
            omissions: 0,
        }
    }

    /// Export the tree rooted at `root`.
    ///
    /// Returns an error only for sink I/O failures; fragment-unavailable
    /// conditions are contained and reported through the summary.
    pub fn export(mut self, root: &dyn NodeSource) -> io::Result<ExportSummary> {
        self.out.write_all(b"r\n")?;
        self.node(root)?;
        self.out.write_all(b"^\n")?;
        self.out.flush()?;

        tracing::debug!(
            nodes = self.nodes,
            properties = self.properties,
            omissions = self.omissions,
            "export finished"
        );

        Ok(ExportSummary {
            nodes: self.nodes,
            properties: self.properties,
            omissions: self.omissions,
            fragments: self.fragments,
        })
    }

    fn node(&mut self, node: &dyn NodeSource) -> io::Result<()> {
        self.nodes += 1;
        self.properties_of(node)?;
        self.children_of(node)
    }

    fn properties_of(&mut self, node: &dyn NodeSource) -> io::Result<()> {
        for item in node.properties() {
            match item {
                Ok(property) => self.property(&*property)?,
                Err(failure) => {
                    // The listing itself broke; whatever was already
                    // committed stands.
                    self.contain(failure);
                    break;
                }
            }
        }
        Ok(())
    }

    fn property(&mut self, property: &dyn PropertySource) -> io::Result<()> {
        match render_property(property) {
            Ok(block) => {
                self.properties += 1;
                self.out.write_all(&block)
            }
            Err(Interrupt::Fragment(failure)) => {
                // Discard the whole block, header included.
                self.contain(failure);
                Ok(())
            }
            Err(Interrupt::Io(error)) => Err(error),
        }
    }

    fn children_of(&mut self, node: &dyn NodeSource) -> io::Result<()> {
        for item in node.child_names() {
            match item {
                Ok(name) => self.child(node, &name)?,
                Err(failure) => {
                    self.contain(failure);
                    break;
                }
            }
        }
        Ok(())
    }

    fn child(&mut self, parent: &dyn NodeSource, name: &str) -> io::Result<()> {
        // Resolve before emitting the header; a child that fails to load
        // leaves no trace in the output.
        let child = match parent.child(name) {
            Ok(child) => child,
            Err(failure) => {
                self.contain(failure);
                return Ok(());
            }
        };

        self.out.write_all(b"c ")?;
        self.out.write_all(name.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.node(&*child)?;
        self.out.write_all(b"^\n")
    }

    fn contain(&mut self, failure: FragmentUnavailable) {
        self.omissions += 1;
        if self.seen.insert(failure.fragment.clone()) {
            self.fragments.push(failure.fragment.clone());
            // Diagnostics are best-effort; a failing diagnostic sink must
            // not abort the export.
            let _ = writeln!(self.diag, "{failure}");
        }
    }
}

/// Export `root` to `out`, sending diagnostics to standard error.
pub fn export_tree<W: Write>(root: &dyn NodeSource, out: W) -> io::Result<ExportSummary> {
    Exporter::new(out, io::stderr().lock()).export(root)
}

/// Why rendering a property block stopped: a contained fragment loss, or a
/// fatal I/O failure. Replaces the exception control flow of stores that
/// unwind, so containment never depends on stack unwinding.
enum Interrupt {
    Fragment(FragmentUnavailable),
    Io(io::Error),
}

impl From<FragmentUnavailable> for Interrupt {
    fn from(failure: FragmentUnavailable) -> Self {
        Interrupt::Fragment(failure)
    }
}

impl From<io::Error> for Interrupt {
    fn from(error: io::Error) -> Self {
        // A fragment loss may surface mid-stream through a reader's
        // io::Error; unwrap it back into the recoverable channel.
        match FragmentUnavailable::from_io(&error) {
            Some(failure) => Interrupt::Fragment(failure.clone()),
            None => Interrupt::Io(error),
        }
    }
}

/// Render one complete property block, or fail without side effects.
fn render_property(property: &dyn PropertySource) -> Result<Vec<u8>, Interrupt> {
    let tag = property.type_tag();

    let mut block = Vec::new();
    block.extend_from_slice(b"p ");
    block.extend_from_slice(tag.token().as_bytes());
    block.push(b' ');
    block.extend_from_slice(property.name().as_bytes());
    block.push(b'\n');

    for index in 0..property.count() {
        if tag.is_binary() {
            let reader = property.binary(index)?;
            binary_line(&mut block, reader)?;
        } else {
            let text = property.text(index)?;
            text_line(&mut block, &text);
        }
    }

    block.extend_from_slice(b"^\n");
    Ok(block)
}

fn text_line(block: &mut Vec<u8>, value: &str) {
    block.extend_from_slice(b"v ");
    escape_into(value, block);
    block.push(b'\n');
}

/// Base64-encode the stream onto one `x` line, reading incrementally so
/// arbitrarily large payloads never sit in memory at once.
fn binary_line(block: &mut Vec<u8>, mut reader: Box<dyn Read + '_>) -> Result<(), Interrupt> {
    block.extend_from_slice(b"x ");
    {
        let mut encoder = EncoderWriter::new(&mut *block, &STANDARD);
        io::copy(&mut reader, &mut encoder)?;
        encoder.finish()?;
    }
    block.push(b'\n');
    Ok(())
}
