//! The contract between the codec and a wire format.
//!
//! The codec decides *what* is written: values, arrays, structs, objects and
//! references, each framed by headers and tails. A backend decides *how* it
//! looks on the wire by implementing [`FormatWriter`] and [`FormatReader`].
//! [`tokens`] is an in-memory backend.

// -----------------------------------------------------------------------------
// Modules

mod primitive;
mod reader;
mod writer;

pub mod tokens;

// -----------------------------------------------------------------------------
// Exports

pub use primitive::{Primitive, PrimitiveKind, PrimitiveValue};
pub use reader::{FormatReader, ReadArrayResult, ReadObjectResult};
pub use writer::FormatWriter;

/// Revision of the framing emitted by the codec.
///
/// Written once per stream by [`FormatWriter::initialize`]. Streams with a
/// different revision are rejected when read.
pub const FORMAT_VERSION: u32 = 500;
