use crate::Result;
use crate::format::Primitive;
use crate::info::TypeDescriptor;

/// Output side of a wire format.
///
/// Calls arrive in document order. Every `*_header` is matched by its tail
/// once the nested nodes are written. `name` is the member name, the root
/// name, or an element label such as `items[1,2]`.
pub trait FormatWriter {
    /// Starts the stream, recording both versions.
    fn initialize(&mut self, format_version: u32, data_version: i32) -> Result<()>;

    /// Whether `ty` can be written natively with [`write_value`](Self::write_value).
    ///
    /// When `false` the codec converts the value to text through a
    /// registered value converter first.
    fn can_write_value(&self, ty: &TypeDescriptor) -> bool {
        ty.value_info().is_some()
    }

    fn write_value(&mut self, name: &str, value: &Primitive) -> Result<()>;

    fn write_null(&mut self, name: &str) -> Result<()>;

    /// `count` is the total element count, `bounds` one entry per dimension.
    fn write_array_header(&mut self, name: &str, count: usize, bounds: &[usize]) -> Result<()>;

    fn write_array_tail(&mut self) -> Result<()>;

    fn write_struct_header(&mut self, name: &str, ty: &TypeDescriptor) -> Result<()>;

    fn write_struct_tail(&mut self) -> Result<()>;

    /// Opens object `id`, `type_name` being the external runtime type name.
    fn write_object_header(&mut self, name: &str, type_name: &str, id: u32) -> Result<()>;

    fn write_object_tail(&mut self) -> Result<()>;

    /// Refers back to an object already opened in this stream.
    fn write_object_reference(&mut self, name: &str, id: u32) -> Result<()>;

    /// Ends the stream. Called even when serialization failed.
    fn close(&mut self) -> Result<()>;
}
