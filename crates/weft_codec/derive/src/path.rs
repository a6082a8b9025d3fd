//! Paths into `weft_codec` used by generated code.

use proc_macro2::TokenStream;
use quote::quote;

// -----------------------------------------------------------------------------
// Crate Path

/// Get the correct access path to the `weft_codec` crate.
///
/// 1. For crates that depend on `weft_codec`, `::weft_codec` is returned.
/// 2. For crates that depend on `weft`, `::weft::codec` is returned.
/// 3. For other situations, `::weft_codec` is returned, which may be wrong.
///
/// This reads the builder's manifest, so it is computed once per expansion
/// and passed around.
pub(crate) fn weft_codec() -> syn::Path {
    weft_macro_utils::Manifest::shared(|manifest| manifest.crate_path("weft_codec"))
}

// -----------------------------------------------------------------------------
// Internal API

#[inline(always)]
pub(crate) fn info_(codec: &syn::Path) -> TokenStream {
    quote! { #codec::info }
}

#[inline(always)]
pub(crate) fn format_(codec: &syn::Path) -> TokenStream {
    quote! { #codec::format }
}

#[inline(always)]
pub(crate) fn result_(codec: &syn::Path) -> TokenStream {
    quote! { #codec::Result }
}

#[inline(always)]
pub(crate) fn macro_exports_(codec: &syn::Path) -> TokenStream {
    quote! { #codec::__macro_exports }
}

#[cfg(feature = "auto_register")]
#[inline(always)]
pub(crate) fn auto_register_(codec: &syn::Path) -> TokenStream {
    quote! { #codec::__macro_exports::auto_register }
}
