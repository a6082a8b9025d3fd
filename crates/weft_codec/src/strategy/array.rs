use alloc::boxed::Box;
use alloc::format;
use alloc::vec::Vec;
use core::any::Any;

use crate::format::ReadArrayResult;
use crate::index::{IndexLabel, MultiIndex};
use crate::info::{ArrayInfo, TypeDescriptor, TypeKind};
use crate::strategy::Strategy;
use crate::{DeserializationContext, Error, Result, SerializationContext};

/// Upper bound on elements reserved up front from an untrusted header.
const PREALLOC_LIMIT: usize = 4096;

fn array_info(declared: &TypeDescriptor) -> Result<&ArrayInfo> {
    match declared.kind() {
        TypeKind::Array(info) => Ok(info),
        _ => Err(Error::UnsupportedType { type_path: declared.type_path() }),
    }
}

// -----------------------------------------------------------------------------
// ArrayStrategy

/// Arrays of any rank.
///
/// The header carries the element count and the per-dimension bounds.
/// Elements follow in row-major order, each labelled with its coordinate
/// (`items[0,1]`) and written against the declared element type. Arrays are
/// values, never tracked by identity.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArrayStrategy;

impl Strategy for ArrayStrategy {
    #[inline]
    fn name(&self) -> &str {
        "array"
    }

    fn can_handle(&self, ty: &TypeDescriptor) -> bool {
        matches!(ty.kind(), TypeKind::Array(_))
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
        let info = array_info(declared)?;
        let bounds = info
            .bounds(value)
            .ok_or_else(|| Error::mismatch(declared.type_path(), "array"))?;
        let index = MultiIndex::new(&bounds);

        ctx.writer().write_array_header(name, index.len(), &bounds)?;
        for coord in index {
            let element = info
                .element_at(value, &coord)
                .ok_or_else(|| Error::malformed(format!("no element at {name}[{}]", IndexLabel(&coord))))?;
            let label = format!("{name}[{}]", IndexLabel(&coord));
            ctx.serialize_value(&label, info.element(), element)?;
        }
        ctx.writer().write_array_tail()
    }

    fn deserialize(
        &self,
        ctx: &mut DeserializationContext<'_>,
        name: &str,
        declared: &TypeDescriptor,
    ) -> Result<Option<Box<dyn Any>>> {
        let info = array_info(declared)?;
        let (count, bounds) = match ctx.reader().read_array_header(name)? {
            ReadArrayResult::Null => return Ok(None),
            ReadArrayResult::Array { count, bounds } => (count, bounds),
        };
        let index = MultiIndex::new(&bounds);
        if index.len() != count {
            return Err(Error::malformed(format!(
                "array `{name}` claims {count} elements for bounds {bounds:?}"
            )));
        }

        let mut elements = Vec::with_capacity(count.min(PREALLOC_LIMIT));
        for coord in index {
            let label = format!("{name}[{}]", IndexLabel(&coord));
            elements.push(ctx.deserialize_value(&label, info.element())?);
        }
        ctx.reader().read_array_tail()?;
        info.build(&bounds, elements).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::format::Primitive;
    use crate::format::tokens::{Token, TokenReader, TokenWriter};
    use crate::object::NdArray;
    use crate::registry::TypeRegistry;
    use crate::{Error, Serializer};

    fn start() -> Token {
        Token::Start { format_version: crate::format::FORMAT_VERSION, data_version: 0 }
    }

    fn array_start(name: &str, count: usize, bounds: &[usize]) -> Token {
        Token::ArrayStart { name: name.into(), count, bounds: bounds.to_vec() }
    }

    #[test]
    fn rank_one() {
        let serializer = Serializer::new(TypeRegistry::new());
        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &[7_u8, 8, 9]).unwrap();
        assert_eq!(writer.tokens()[1], array_start("root", 3, &[3]));
        assert_eq!(writer.tokens()[4], Token::value("root[2]", Primitive::U8(9)));

        let mut reader = TokenReader::new(writer.into_tokens());
        let back: Vec<u8> = serializer.deserialize(&mut reader).unwrap();
        assert_eq!(back, [7, 8, 9]);
    }

    #[test]
    fn rank_two_is_row_major() {
        let serializer = Serializer::new(TypeRegistry::new());
        let grid = NdArray::from_fn(vec![2, 3], |coord| (coord[0] * 10 + coord[1]) as u16);

        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &grid).unwrap();
        assert_eq!(writer.tokens()[1], array_start("root", 6, &[2, 3]));
        assert_eq!(writer.tokens()[2], Token::value("root[0,0]", Primitive::U16(0)));
        assert_eq!(writer.tokens()[4], Token::value("root[0,2]", Primitive::U16(2)));
        assert_eq!(writer.tokens()[5], Token::value("root[1,0]", Primitive::U16(10)));
        assert_eq!(writer.tokens()[8], Token::ArrayEnd);

        let mut reader = TokenReader::new(writer.into_tokens());
        let back: NdArray<u16> = serializer.deserialize(&mut reader).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn zero_bounds_keep_their_shape() {
        let serializer = Serializer::new(TypeRegistry::new());
        let empty = NdArray::<i64>::from_vec(vec![2, 0, 4], Vec::new()).unwrap();

        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &empty).unwrap();
        assert_eq!(writer.tokens()[1..], [array_start("root", 0, &[2, 0, 4]), Token::ArrayEnd]);

        let mut reader = TokenReader::new(writer.into_tokens());
        let back: NdArray<i64> = serializer.deserialize(&mut reader).unwrap();
        assert_eq!(back.bounds(), [2, 0, 4]);
        assert!(back.is_empty());
    }

    #[test]
    fn nested_arrays_and_nulls() {
        let serializer = Serializer::new(TypeRegistry::new());
        let value = vec![Some(vec![1_i32]), None, Some(Vec::new())];

        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &value).unwrap();
        assert_eq!(writer.tokens()[2], array_start("root[0]", 1, &[1]));
        assert_eq!(writer.tokens()[3], Token::value("root[0][0]", Primitive::I32(1)));
        assert_eq!(writer.tokens()[5], Token::null("root[1]"));

        let mut reader = TokenReader::new(writer.into_tokens());
        let back: Vec<Option<Vec<i32>>> = serializer.deserialize(&mut reader).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn inconsistent_headers_fail() {
        let serializer = Serializer::new(TypeRegistry::new());

        let mut reader = TokenReader::new([start(), array_start("root", 5, &[2, 3]), Token::ArrayEnd]);
        let err = serializer.deserialize::<NdArray<u8>, _>(&mut reader).unwrap_err();
        assert!(matches!(err, Error::MalformedStream(_)));

        let mut reader = TokenReader::new([
            start(),
            array_start("root", 1, &[1]),
            Token::value("root[0]", Primitive::U8(1)),
            Token::ArrayEnd,
        ]);
        let err = serializer.deserialize::<[u8; 2], _>(&mut reader).unwrap_err();
        assert!(matches!(err, Error::MalformedStream(_)));
    }
}
