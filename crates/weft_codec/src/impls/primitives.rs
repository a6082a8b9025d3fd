use alloc::format;
use alloc::string::{String, ToString};
use core::any::type_name;
use core::str::FromStr;

use crate::format::{Primitive, PrimitiveKind, PrimitiveValue};
use crate::info::{Describe, TypeDescriptor};
use crate::{Error, Result};

// -----------------------------------------------------------------------------
// Helpers

fn integer<T: TryFrom<i128> + FromStr>(value: Primitive) -> Result<T> {
    if let Primitive::Str(text) = &value {
        return text
            .trim()
            .parse()
            .map_err(|_| Error::conversion(type_name::<T>(), format!("`{text}` is not an integer")));
    }
    value
        .as_i128()
        .and_then(|wide| T::try_from(wide).ok())
        .ok_or_else(|| Error::conversion(type_name::<T>(), format!("{value} is out of range")))
}

fn float(value: Primitive) -> Result<f64> {
    if let Primitive::Str(text) = &value {
        return text
            .trim()
            .parse()
            .map_err(|_| Error::conversion("f64", format!("`{text}` is not a number")));
    }
    value
        .as_f64()
        .ok_or_else(|| Error::conversion("f64", format!("{value} is not a number")))
}

// -----------------------------------------------------------------------------
// Integers

macro_rules! impl_integer {
    ($($ty:ty => $kind:ident($wire:ty), $name:literal;)*) => {$(
        impl PrimitiveValue for $ty {
            const KIND: PrimitiveKind = PrimitiveKind::$kind;

            #[inline]
            #[allow(clippy::unnecessary_cast, reason = "macro covers `isize` and `usize`")]
            fn to_primitive(&self) -> Primitive {
                Primitive::$kind(*self as $wire)
            }

            #[inline]
            fn from_primitive(value: Primitive) -> Result<Self> {
                integer(value)
            }
        }

        impl Describe for $ty {
            fn describe() -> TypeDescriptor {
                TypeDescriptor::value::<Self>($name)
            }
        }
    )*};
}

impl_integer! {
    i8 => I8(i8), "sbyte";
    i16 => I16(i16), "int16";
    i32 => I32(i32), "int32";
    i64 => I64(i64), "int64";
    isize => I64(i64), "isize";
    u8 => U8(u8), "byte";
    u16 => U16(u16), "uint16";
    u32 => U32(u32), "uint32";
    u64 => U64(u64), "uint64";
    usize => U64(u64), "usize";
}

// -----------------------------------------------------------------------------
// Floats

impl PrimitiveValue for f32 {
    const KIND: PrimitiveKind = PrimitiveKind::F32;

    #[inline]
    fn to_primitive(&self) -> Primitive {
        Primitive::F32(*self)
    }

    fn from_primitive(value: Primitive) -> Result<Self> {
        match value {
            Primitive::F32(v) => Ok(v),
            other => float(other).map(|v| v as f32),
        }
    }
}

impl PrimitiveValue for f64 {
    const KIND: PrimitiveKind = PrimitiveKind::F64;

    #[inline]
    fn to_primitive(&self) -> Primitive {
        Primitive::F64(*self)
    }

    #[inline]
    fn from_primitive(value: Primitive) -> Result<Self> {
        float(value)
    }
}

impl Describe for f32 {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::value::<Self>("single")
    }
}

impl Describe for f64 {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::value::<Self>("double")
    }
}

// -----------------------------------------------------------------------------
// bool, char, String

impl PrimitiveValue for bool {
    const KIND: PrimitiveKind = PrimitiveKind::Bool;

    #[inline]
    fn to_primitive(&self) -> Primitive {
        Primitive::Bool(*self)
    }

    fn from_primitive(value: Primitive) -> Result<Self> {
        match value {
            Primitive::Bool(v) => Ok(v),
            Primitive::Str(text) => text
                .trim()
                .parse()
                .map_err(|_| Error::conversion("bool", format!("`{text}` is not a boolean"))),
            other => Err(Error::conversion("bool", format!("{other} is not a boolean"))),
        }
    }
}

impl PrimitiveValue for char {
    const KIND: PrimitiveKind = PrimitiveKind::Char;

    #[inline]
    fn to_primitive(&self) -> Primitive {
        Primitive::Char(*self)
    }

    fn from_primitive(value: Primitive) -> Result<Self> {
        match value {
            Primitive::Char(v) => Ok(v),
            Primitive::Str(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(Error::conversion("char", format!("`{text}` is not one character"))),
                }
            }
            other => other
                .as_i128()
                .and_then(|code| u32::try_from(code).ok())
                .and_then(char::from_u32)
                .ok_or_else(|| Error::conversion("char", format!("{other} is not a scalar value"))),
        }
    }
}

impl PrimitiveValue for String {
    const KIND: PrimitiveKind = PrimitiveKind::Str;

    #[inline]
    fn to_primitive(&self) -> Primitive {
        Primitive::Str(self.clone())
    }

    fn from_primitive(value: Primitive) -> Result<Self> {
        match value {
            Primitive::Str(text) => Ok(text),
            other => Ok(other.to_string()),
        }
    }
}

impl Describe for bool {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::value::<Self>("boolean")
    }
}

impl Describe for char {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::value::<Self>("char")
    }
}

impl Describe for String {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::value::<Self>("string")
    }
}

#[cfg(test)]
mod tests {
    use crate::format::{Primitive, PrimitiveValue};
    use alloc::string::String;

    #[test]
    fn wide_integers_use_64_bit_wire_forms() {
        assert_eq!(usize::MAX.to_primitive(), Primitive::U64(usize::MAX as u64));
        assert_eq!((-3isize).to_primitive(), Primitive::I64(-3));
        assert_eq!(isize::from_primitive(Primitive::I64(-3)).unwrap(), -3);
    }

    #[test]
    fn lenient_reads() {
        assert_eq!(u64::from_primitive(Primitive::I8(5)).unwrap(), 5);
        assert!(i8::from_primitive(Primitive::U16(300)).is_err());
        assert!(u32::from_primitive(Primitive::Str("x".into())).is_err());
        assert_eq!(f64::from_primitive(Primitive::U8(2)).unwrap(), 2.0);
        assert!(bool::from_primitive(Primitive::Str("true".into())).unwrap());
        assert_eq!(char::from_primitive(Primitive::Str("é".into())).unwrap(), 'é');
        assert!(char::from_primitive(Primitive::Str("ab".into())).is_err());
        assert_eq!(String::from_primitive(Primitive::I32(-4)).unwrap(), "-4");
    }
}
