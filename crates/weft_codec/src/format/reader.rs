use alloc::string::String;
use alloc::vec::Vec;

use crate::Result;
use crate::format::{Primitive, PrimitiveKind};
use crate::info::TypeDescriptor;

// -----------------------------------------------------------------------------
// Results

/// What an object header read found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadObjectResult {
    Null,
    /// A new object. `id` is its position in the stream's object sequence.
    Object { type_name: String, id: u32 },
    /// A reference to an object read earlier.
    Reference(u32),
}

/// What an array header read found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadArrayResult {
    Null,
    Array { count: usize, bounds: Vec<usize> },
}

// -----------------------------------------------------------------------------
// FormatReader

/// Input side of a wire format, mirroring [`FormatWriter`](crate::format::FormatWriter).
pub trait FormatReader {
    /// Reads the stream start, making both versions available.
    fn initialize(&mut self) -> Result<()>;

    /// Framing revision found by [`initialize`](Self::initialize).
    fn format_version(&self) -> u32;

    /// Data version found by [`initialize`](Self::initialize).
    fn version(&self) -> i32;

    fn can_read_value(&self, ty: &TypeDescriptor) -> bool {
        ty.value_info().is_some()
    }

    /// Reads a leaf, `None` for a null node.
    ///
    /// `kind` is the expected variant. Backends without typed values use it
    /// to parse, others may return whatever variant the stream holds.
    fn read_value(&mut self, name: &str, kind: PrimitiveKind) -> Result<Option<Primitive>>;

    fn read_array_header(&mut self, name: &str) -> Result<ReadArrayResult>;

    fn read_array_tail(&mut self) -> Result<()>;

    /// `false` for a null node. Backends that record the type name fail with
    /// [`Error::MalformedStream`](crate::Error::MalformedStream) when it is
    /// not `ty`'s.
    fn read_struct_header(&mut self, name: &str, ty: &TypeDescriptor) -> Result<bool>;

    fn read_struct_tail(&mut self) -> Result<()>;

    fn read_object_header(&mut self, name: &str) -> Result<ReadObjectResult>;

    fn read_object_tail(&mut self) -> Result<()>;

    /// Discards the next node, including everything nested in it.
    fn skip(&mut self, name: &str) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}
