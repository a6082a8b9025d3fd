use alloc::boxed::Box;
use alloc::string::ToString;
use core::any::Any;

use crate::format::{Primitive, PrimitiveKind};
use crate::info::{TypeDescriptor, TypeKind};
use crate::registry::ValueConverter;
use crate::strategy::Strategy;
use crate::{DeserializationContext, Error, Result, SerializationContext};

// -----------------------------------------------------------------------------
// Converted text

pub(super) fn write_text(
    ctx: &mut SerializationContext<'_>,
    converter: &dyn ValueConverter,
    name: &str,
    declared: &TypeDescriptor,
    value: &dyn Any,
) -> Result<()> {
    let text = converter.to_text(value, declared)?;
    ctx.writer().write_value(name, &Primitive::Str(text))
}

pub(super) fn read_text(
    ctx: &mut DeserializationContext<'_>,
    converter: &dyn ValueConverter,
    name: &str,
    declared: &TypeDescriptor,
) -> Result<Option<Box<dyn Any>>> {
    match ctx.reader().read_value(name, PrimitiveKind::Str)? {
        None => Ok(None),
        Some(Primitive::Str(text)) => converter.from_text(&text, declared).map(Some),
        Some(other) => converter.from_text(&other.to_string(), declared).map(Some),
    }
}

fn no_converter(declared: &TypeDescriptor) -> Error {
    Error::conversion(declared.type_path(), "no native form and no value converter")
}

// -----------------------------------------------------------------------------
// ValueStrategy

/// Leaf values, written as a single [`Primitive`].
///
/// Types with a native form go straight to the backend when it accepts
/// them. Everything else, and every [`TypeKind::Opaque`] type, goes through
/// the first value converter that claims the type.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValueStrategy;

impl Strategy for ValueStrategy {
    #[inline]
    fn name(&self) -> &str {
        "value"
    }

    fn can_handle(&self, ty: &TypeDescriptor) -> bool {
        matches!(ty.kind(), TypeKind::Value(_) | TypeKind::Opaque)
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
        if let Some(info) = declared.value_info()
            && ctx.writer().can_write_value(declared)
        {
            let primitive = info
                .to_primitive(value)
                .ok_or_else(|| Error::mismatch(declared.type_path(), "value"))?;
            return ctx.writer().write_value(name, &primitive);
        }
        let converter = ctx.converters().find(declared).ok_or_else(|| no_converter(declared))?;
        write_text(ctx, converter, name, declared, value)
    }

    fn deserialize(
        &self,
        ctx: &mut DeserializationContext<'_>,
        name: &str,
        declared: &TypeDescriptor,
    ) -> Result<Option<Box<dyn Any>>> {
        if let Some(info) = declared.value_info()
            && ctx.reader().can_read_value(declared)
        {
            return match ctx.reader().read_value(name, info.kind())? {
                None => Ok(None),
                Some(primitive) => info.from_primitive(primitive).map(Some),
            };
        }
        let converter = ctx.converters().find(declared).ok_or_else(|| no_converter(declared))?;
        read_text(ctx, converter, name, declared)
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use core::fmt;
    use core::str::FromStr;

    use weft_codec_derive::Describe;

    use crate::format::Primitive;
    use crate::format::tokens::{Token, TokenReader, TokenWriter};
    use crate::registry::{TextConverter, TypeRegistry, ValueConverters};
    use crate::{Error, Serializer};

    #[derive(Describe, Debug, Clone, Copy, PartialEq)]
    enum Mode {
        Fast,
        #[describe(rename = "careful")]
        Slow,
    }

    #[derive(Describe, Debug, PartialEq)]
    #[describe(opaque, alias = "Color")]
    struct Rgb(u8, u8, u8);

    impl fmt::Display for Rgb {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
        }
    }

    impl FromStr for Rgb {
        type Err = core::num::ParseIntError;

        fn from_str(text: &str) -> Result<Self, Self::Err> {
            let hex = text.trim_start_matches('#');
            let channel = |at: usize| u8::from_str_radix(hex.get(at..at + 2).unwrap_or("?"), 16);
            Ok(Self(channel(0)?, channel(2)?, channel(4)?))
        }
    }

    fn start() -> Token {
        Token::Start { format_version: crate::format::FORMAT_VERSION, data_version: 0 }
    }

    #[test]
    fn enums_are_written_by_name() {
        let serializer = Serializer::new(TypeRegistry::new());
        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &[Mode::Fast, Mode::Slow]).unwrap();
        assert_eq!(writer.tokens()[2], Token::value("root[0]", Primitive::Str("Fast".into())));
        assert_eq!(writer.tokens()[3], Token::value("root[1]", Primitive::Str("careful".into())));

        let mut reader = TokenReader::new(writer.into_tokens());
        let back: [Mode; 2] = serializer.deserialize(&mut reader).unwrap();
        assert_eq!(back, [Mode::Fast, Mode::Slow]);

        let mut reader = TokenReader::new([start(), Token::value("root", Primitive::Str("Slow".into()))]);
        let err = serializer.deserialize::<Mode, _>(&mut reader).unwrap_err();
        assert!(matches!(err, Error::ConversionFailure { .. }));
    }

    #[test]
    fn opaque_types_need_a_converter() {
        let color = Rgb(10, 20, 30);

        let mut writer = TokenWriter::new();
        let err = Serializer::new(TypeRegistry::new())
            .serialize(&mut writer, &color)
            .unwrap_err();
        assert!(matches!(err, Error::ConversionFailure { .. }));

        let converters = ValueConverters::new().with(TextConverter::<Rgb>::new());
        let serializer = Serializer::new(TypeRegistry::new()).with_converters(converters);
        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &color).unwrap();
        assert_eq!(writer.tokens()[1], Token::value("root", Primitive::Str(format!("{color}"))));

        let mut reader = TokenReader::new(writer.into_tokens());
        assert_eq!(serializer.deserialize::<Rgb, _>(&mut reader).unwrap(), color);
    }

    #[test]
    fn values_widen_on_read() {
        let serializer = Serializer::new(TypeRegistry::new());
        let mut reader = TokenReader::new([start(), Token::value("root", Primitive::U8(200))]);
        assert_eq!(serializer.deserialize::<i64, _>(&mut reader).unwrap(), 200);

        let mut reader = TokenReader::new([start(), Token::value("root", Primitive::I32(-1))]);
        let err = serializer.deserialize::<u32, _>(&mut reader).unwrap_err();
        assert!(matches!(err, Error::ConversionFailure { .. }));
    }
}
