use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::DescribeMeta;
use crate::path;

/// Wrap a `TypeDescriptor` expression in the `Describe` impl.
///
/// Applies `strategy` and `members` when present.
pub(super) fn impl_trait_describe(meta: &DescribeMeta, descriptor: TokenStream) -> TokenStream {
    let info_ = path::info_(meta.codec_path());
    let ident = meta.ident();
    let (impl_generics, ty_generics, where_clause) = meta.split_generics();

    let strategy = match &meta.attrs().strategy {
        Some(strategy) => quote! { .with_strategy::<#strategy>() },
        None => TokenStream::new(),
    };
    let members = match &meta.attrs().members {
        Some(members) => quote! { .with_member_strategy::<#members>() },
        None => TokenStream::new(),
    };

    quote! {
        impl #impl_generics #info_::Describe for #ident #ty_generics #where_clause {
            fn describe() -> #info_::TypeDescriptor {
                #descriptor #strategy #members
            }
        }
    }
}
