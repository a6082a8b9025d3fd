use proc_macro2::TokenStream;

use crate::derive_data::DescribeMeta;

/// Generate the `auto_register` submission.
#[cfg(feature = "auto_register")]
pub(crate) fn auto_register(meta: &DescribeMeta) -> TokenStream {
    let Some(span) = meta.attrs().auto_register else {
        return TokenStream::new();
    };
    if meta.impl_with_generic() {
        return syn::Error::new(span, "`auto_register` cannot be used on generic types, use `impl_auto_register!`")
            .into_compile_error();
    }
    let ident = meta.ident();
    submit_registration(meta.codec_path(), &quote::quote_spanned!(span => #ident))
}

/// Generate the `auto_register` submission.
#[cfg(not(feature = "auto_register"))]
pub(crate) fn auto_register(_: &DescribeMeta) -> TokenStream {
    TokenStream::new()
}

/// Submit `ty` to the link-time collection.
#[cfg(feature = "auto_register")]
pub(crate) fn submit_registration(codec: &syn::Path, ty: &TokenStream) -> TokenStream {
    let auto_register_ = crate::path::auto_register_(codec);
    let info_ = crate::path::info_(codec);

    quote::quote! {
        #auto_register_::inventory::submit! {
            #auto_register_::AutoRegistration::new(#info_::TypeKey::of::<#ty>)
        }
    }
}
