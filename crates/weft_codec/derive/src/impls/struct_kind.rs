use proc_macro2::{Literal, TokenStream};
use quote::quote;

use super::trait_describe::impl_trait_describe;

use crate::derive_data::{DescribeMeta, StructField};
use crate::path;

/// `Describe` for an opaque leaf type.
pub(crate) fn impl_opaque(meta: &DescribeMeta) -> TokenStream {
    let info_ = path::info_(meta.codec_path());
    let name = meta.type_name();

    impl_trait_describe(meta, quote! { #info_::TypeDescriptor::opaque::<Self>(#name) })
}

/// `Describe` for a struct, as a value aggregate or as a class.
pub(crate) fn impl_struct(meta: &DescribeMeta, fields: &[StructField]) -> TokenStream {
    let info_ = path::info_(meta.codec_path());
    let attrs = meta.attrs();
    let name = meta.type_name();

    let count = Literal::usize_unsuffixed(fields.len());
    let members = fields.iter().map(|field| get_member_tokens(meta, field));
    let members = quote! {
        ::core::convert::identity::<[#info_::MemberDescriptor; #count]>([#(#members),*])
    };

    let (kind_info, constructor) = if attrs.class.is_some() {
        (quote!(ClassInfo), quote!(class))
    } else {
        (quote!(StructInfo), quote!(structure))
    };

    let info = match &attrs.factory {
        Some(factory) => quote! { #info_::#kind_info::with_factory::<Self>(#members, #factory) },
        None => quote! { #info_::#kind_info::new::<Self>(#members) },
    };

    let bases = attrs.bases.iter().map(|base| {
        quote! { .with_base(#info_::TypeKey::of::<#base>()) }
    });

    let serialize_hook = attrs.serialize_with.as_ref().map(|hook| {
        quote! { .with_serialize_hook::<Self>(#hook) }
    });
    let deserialize_hook = attrs.deserialize_with.as_ref().map(|hook| {
        quote! { .with_deserialize_hook::<Self>(#hook) }
    });

    impl_trait_describe(
        meta,
        quote! {
            #info_::TypeDescriptor::#constructor::<Self>(#name, #info #(#bases)*)
                #serialize_hook
                #deserialize_hook
        },
    )
}

fn get_member_tokens(meta: &DescribeMeta, field: &StructField) -> TokenStream {
    let info_ = path::info_(meta.codec_path());
    let ident = field.ident;
    let ty = field.ty;
    let field_name = syn::LitStr::new(&syn::ext::IdentExt::unraw(ident).to_string(), ident.span());
    let external = field.external_name();

    let rename = if external.value() != field_name.value() {
        quote! { .rename(#external) }
    } else {
        TokenStream::new()
    };

    if field.attrs.skip.is_some() {
        return quote! { #info_::MemberDescriptor::skipped(#field_name) #rename };
    }

    quote! {
        #info_::MemberDescriptor::field::<Self, #ty>(
            #field_name,
            |this| &this.#ident,
            |this| &mut this.#ident,
        ) #rename
    }
}
