use proc_macro2::TokenStream;
use quote::quote;

use super::trait_describe::impl_trait_describe;

use crate::derive_data::{DescribeMeta, EnumVariant};
use crate::path;

/// `Describe` and `PrimitiveValue` for a fieldless enum.
///
/// Variants are written as their external name.
pub(crate) fn impl_enum(meta: &DescribeMeta, variants: &[EnumVariant]) -> TokenStream {
    let codec = meta.codec_path();
    let info_ = path::info_(codec);
    let format_ = path::format_(codec);
    let result_ = path::result_(codec);
    let exports_ = path::macro_exports_(codec);
    let ident = meta.ident();
    let name = meta.type_name();

    let idents: Vec<_> = variants.iter().map(|variant| variant.ident).collect();
    let names: Vec<_> = variants.iter().map(EnumVariant::external_name).collect();

    let describe = impl_trait_describe(
        meta,
        quote! { #info_::TypeDescriptor::value::<Self>(#name) },
    );

    quote! {
        #describe

        impl #format_::PrimitiveValue for #ident {
            const KIND: #format_::PrimitiveKind = #format_::PrimitiveKind::Str;

            fn to_primitive(&self) -> #format_::Primitive {
                match self {
                    #(Self::#idents => #exports_::text(#names),)*
                }
            }

            fn from_primitive(value: #format_::Primitive) -> #result_<Self> {
                match #exports_::enum_text(&value)? {
                    #(#names => ::core::result::Result::Ok(Self::#idents),)*
                    other => ::core::result::Result::Err(#exports_::unknown_variant::<Self>(other)),
                }
            }
        }
    }
}
