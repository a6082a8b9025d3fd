use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt::{self, Display};
use core::marker::PhantomData;
use core::str::FromStr;

use crate::info::{Describe, TypeDescriptor};
use crate::{Error, Result};

// -----------------------------------------------------------------------------
// ValueConverter

/// Converts a value to and from text.
///
/// Used for leaf types the backend cannot write natively, and for any struct
/// type a converter claims, which is then written as a single text value.
pub trait ValueConverter: Send + Sync {
    fn can_convert(&self, ty: &TypeDescriptor) -> bool;

    fn to_text(&self, value: &dyn Any, ty: &TypeDescriptor) -> Result<String>;

    fn from_text(&self, text: &str, ty: &TypeDescriptor) -> Result<Box<dyn Any>>;
}

// -----------------------------------------------------------------------------
// ValueConverters

/// An ordered set of converters. The first one claiming a type wins.
#[derive(Default, Clone)]
pub struct ValueConverters {
    converters: Vec<Arc<dyn ValueConverter>>,
}

impl ValueConverters {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, converter: impl ValueConverter + 'static) -> &mut Self {
        self.converters.push(Arc::new(converter));
        self
    }

    /// Builder form of [`add`](Self::add).
    pub fn with(mut self, converter: impl ValueConverter + 'static) -> Self {
        self.add(converter);
        self
    }

    pub fn find(&self, ty: &TypeDescriptor) -> Option<&dyn ValueConverter> {
        self.converters
            .iter()
            .find(|converter| converter.can_convert(ty))
            .map(|converter| &**converter)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl fmt::Debug for ValueConverters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueConverters")
            .field("len", &self.converters.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// TextConverter

/// Converts `T` through its `Display` and `FromStr` implementations.
///
/// # Examples
///
/// ```
/// use weft_codec::registry::{TextConverter, ValueConverter};
/// use weft_codec::Describe;
///
/// let converter = TextConverter::<u16>::new();
/// let desc = u16::describe();
///
/// assert!(converter.can_convert(&desc));
/// assert_eq!(converter.to_text(&7_u16, &desc).unwrap(), "7");
/// let back = converter.from_text("9", &desc).unwrap();
/// assert_eq!(back.downcast_ref::<u16>(), Some(&9));
/// ```
pub struct TextConverter<T>(PhantomData<fn() -> T>);

impl<T> TextConverter<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for TextConverter<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TextConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextConverter<{}>", core::any::type_name::<T>())
    }
}

impl<T> ValueConverter for TextConverter<T>
where
    T: Describe + Display + FromStr,
    T::Err: Display,
{
    #[inline]
    fn can_convert(&self, ty: &TypeDescriptor) -> bool {
        ty.id() == TypeId::of::<T>()
    }

    fn to_text(&self, value: &dyn Any, ty: &TypeDescriptor) -> Result<String> {
        value
            .downcast_ref::<T>()
            .map(ToString::to_string)
            .ok_or_else(|| Error::mismatch(ty.type_path(), "converted value"))
    }

    fn from_text(&self, text: &str, ty: &TypeDescriptor) -> Result<Box<dyn Any>> {
        text.parse::<T>()
            .map(|value| Box::new(value) as Box<dyn Any>)
            .map_err(|err| Error::conversion(ty.type_path(), format!("`{text}`: {err}")))
    }
}
