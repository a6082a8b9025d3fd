use alloc::string::String;
use core::any::Any;
use core::fmt;

use crate::Result;

// -----------------------------------------------------------------------------
// PrimitiveKind

/// Variants of [`Primitive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimitiveKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Str,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Str => "str",
        };
        f.write_str(name)
    }
}

// -----------------------------------------------------------------------------
// Primitive

/// A leaf value in the form every backend can write.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Primitive {
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Bool(_) => PrimitiveKind::Bool,
            Self::Char(_) => PrimitiveKind::Char,
            Self::I8(_) => PrimitiveKind::I8,
            Self::I16(_) => PrimitiveKind::I16,
            Self::I32(_) => PrimitiveKind::I32,
            Self::I64(_) => PrimitiveKind::I64,
            Self::U8(_) => PrimitiveKind::U8,
            Self::U16(_) => PrimitiveKind::U16,
            Self::U32(_) => PrimitiveKind::U32,
            Self::U64(_) => PrimitiveKind::U64,
            Self::F32(_) => PrimitiveKind::F32,
            Self::F64(_) => PrimitiveKind::F64,
            Self::Str(_) => PrimitiveKind::Str,
        }
    }

    /// The value widened to `i128` if it is an integer.
    pub fn as_i128(&self) -> Option<i128> {
        Some(match *self {
            Self::I8(v) => v.into(),
            Self::I16(v) => v.into(),
            Self::I32(v) => v.into(),
            Self::I64(v) => v.into(),
            Self::U8(v) => v.into(),
            Self::U16(v) => v.into(),
            Self::U32(v) => v.into(),
            Self::U64(v) => v.into(),
            _ => return None,
        })
    }

    /// The value as `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::F32(v) => Some(v.into()),
            Self::F64(v) => Some(v),
            _ => self.as_i128().map(|v| v as f64),
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Char(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}

// -----------------------------------------------------------------------------
// PrimitiveValue

/// A Rust type with a native [`Primitive`] form.
///
/// Reading is lenient: integers accept any integer variant that fits, numbers
/// and booleans also parse from text.
///
/// # Examples
///
/// ```
/// use weft_codec::format::{Primitive, PrimitiveValue};
///
/// assert_eq!(i16::from_primitive(Primitive::U8(200)).unwrap(), 200);
/// assert_eq!(u8::from_primitive(Primitive::Str("17".into())).unwrap(), 17);
/// assert!(u8::from_primitive(Primitive::I32(-1)).is_err());
/// ```
pub trait PrimitiveValue: Any + Sized {
    const KIND: PrimitiveKind;

    fn to_primitive(&self) -> Primitive;

    fn from_primitive(value: Primitive) -> Result<Self>;
}
