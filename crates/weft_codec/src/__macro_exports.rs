//! Support items for `#[derive(Describe)]`. Not public API.

use alloc::format;
use alloc::string::String;
use core::any::type_name;

use crate::format::Primitive;
use crate::{Error, Result};

/// Text of an enum value read from the stream.
pub fn enum_text(value: &Primitive) -> Result<&str> {
    value
        .as_str()
        .ok_or_else(|| Error::conversion("enum", format!("{value} is not a variant name")))
}

#[cold]
pub fn unknown_variant<T>(text: &str) -> Error {
    Error::conversion(type_name::<T>(), format!("unknown variant `{text}`"))
}

#[inline]
pub fn text(variant: &'static str) -> Primitive {
    Primitive::Str(String::from(variant))
}

#[cfg(feature = "auto_register")]
pub mod auto_register {
    pub use inventory;

    use crate::info::TypeKey;

    /// One `#[describe(auto_register)]` type.
    pub struct AutoRegistration(fn() -> TypeKey);

    impl AutoRegistration {
        #[inline]
        pub const fn new(key: fn() -> TypeKey) -> Self {
            Self(key)
        }

        #[inline]
        pub fn key(&self) -> TypeKey {
            (self.0)()
        }
    }

    inventory::collect!(AutoRegistration);
}
