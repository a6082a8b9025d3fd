// -----------------------------------------------------------------------------
// Modules

mod auto_register;
mod enum_kind;
mod struct_kind;
mod trait_describe;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use auto_register::auto_register;
#[cfg(feature = "auto_register")]
pub(crate) use auto_register::submit_registration;

use proc_macro2::TokenStream;

use crate::derive_data::{DescribeData, DescribeMeta};

/// Implement `Describe`, plus `PrimitiveValue` for enums.
pub(crate) fn impl_describe(meta: &DescribeMeta) -> TokenStream {
    match meta.data() {
        DescribeData::Struct(_) if meta.attrs().opaque.is_some() => struct_kind::impl_opaque(meta),
        DescribeData::Struct(fields) => struct_kind::impl_struct(meta, fields),
        DescribeData::Enum(variants) => enum_kind::impl_enum(meta, variants),
    }
}
