//! Value-line escaping
//!
//! Exactly two escapes, nothing else: a literal backslash becomes `\\` and
//! a literal newline becomes `\n`. Both 0x5C and 0x0A only ever appear in
//! UTF-8 as themselves, so the pass works on bytes.
//!
//! Property names and type tokens are emitted without escaping. A name
//! containing a newline would make the line grammar ambiguous; that
//! limitation is deliberate and preserved.

/// Append the escaped form of `value` to `out`.
pub(crate) fn escape_into(value: &str, out: &mut Vec<u8>) {
    for byte in value.bytes() {
        match byte {
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'\n' => out.extend_from_slice(b"\\n"),
            _ => out.push(byte),
        }
    }
}
