use alloc::boxed::Box;
use core::any::Any;

use crate::info::{TypeDescriptor, TypeKind};
use crate::strategy::Strategy;
use crate::strategy::value::{read_text, write_text};
use crate::{DeserializationContext, Error, Result, SerializationContext};

// -----------------------------------------------------------------------------
// StructStrategy

/// Value aggregates: a header naming the type, the members, a tail.
///
/// Structs are copied, never tracked by identity. A struct type claimed by a
/// value converter is written as a single text value instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructStrategy;

impl Strategy for StructStrategy {
    #[inline]
    fn name(&self) -> &str {
        "struct"
    }

    fn can_handle(&self, ty: &TypeDescriptor) -> bool {
        matches!(ty.kind(), TypeKind::Struct(_))
    }

    fn serialize(
        &self,
        ctx: &mut SerializationContext<'_>,
        name: &str,
        declared: &TypeDescriptor,
        value: Option<&dyn Any>,
    ) -> Result<()> {
        let Some(value) = value else {
            return ctx.writer().write_null(name);
        };
        if let Some(converter) = ctx.converters().find(declared) {
            return write_text(ctx, converter, name, declared, value);
        }
        ctx.writer().write_struct_header(name, declared)?;
        ctx.serialize_body(declared, value)?;
        ctx.writer().write_struct_tail()
    }

    fn deserialize(
        &self,
        ctx: &mut DeserializationContext<'_>,
        name: &str,
        declared: &TypeDescriptor,
    ) -> Result<Option<Box<dyn Any>>> {
        if let Some(converter) = ctx.converters().find(declared) {
            return read_text(ctx, converter, name, declared);
        }
        let TypeKind::Struct(info) = declared.kind() else {
            return Err(Error::UnsupportedType { type_path: declared.type_path() });
        };
        if !ctx.reader().read_struct_header(name, declared)? {
            return Ok(None);
        }
        let mut value = info.create(ctx)?;
        ctx.deserialize_body(declared, &mut *value)?;
        ctx.reader().read_struct_tail()?;
        Ok(Some(value))
    }
}
