//! See following macros:
//!
//! - [`Describe`]
//! - [`impl_auto_register`]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

static DESCRIBE_ATTRIBUTE_NAME: &str = "describe";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// # Deriving `Describe`
///
/// `#[derive(Describe)]` implements `weft_codec::info::Describe`, which gives
/// the codec the layout of the type.
///
/// - Structs with named fields (and unit structs) become value aggregates,
///   copied when serialized.
/// - With `#[describe(class)]` they become shared objects instead, always
///   held through `Obj` or `Ref<T>` handles.
/// - Enums whose variants are all units become leaf values written by
///   variant name.
///
/// Tuple structs, enums with data and unions are rejected.
///
/// ## Type Attributes
///
/// ```rust, ignore
/// #[derive(Describe, Default)]
/// #[describe(class, alias = "Shape.Circle", base = dyn Shape)]
/// struct Circle { radius: f64 }
/// ```
///
/// - `class`: shared object, tracked by identity.
/// - `opaque`: leaf without members, written through a value converter.
/// - `alias = "..."`: external name, defaults to the type ident. Generic
///   types default to their full type name.
/// - `base = Type`: a base the class is assignable to. Repeatable. The base
///   is a class or a trait object given `Describe` by `describe_abstract!`.
/// - `strategy = Type`: a `Strategy + Default` that handles this type ahead
///   of every other strategy. Not allowed on classes.
/// - `members = Type`: a `MemberStrategy + Default` replacing the member
///   traversal of a struct or class. For classes it applies wherever the
///   object is met, whatever the declared type.
/// - `factory = path`: `fn(&DeserializationContext<'_>) -> Result<Self>`
///   creating the instance that members are read into. Without it the type
///   must implement `Default`.
/// - `serialize_with = path`, `deserialize_with = path`: replace the member
///   traversal, `fn(&Self, &mut SerializationContext<'_>) -> Result<()>` and
///   `fn(&mut Self, &mut DeserializationContext<'_>) -> Result<()>`.
/// - `auto_register`: collect the type for `TypeRegistry::auto_register`.
///   Needs the `auto_register` feature and a non-generic type.
///
/// ## Field and Variant Attributes
///
/// - `skip`: the member is known by name but never serialized. Its value
///   comes from the factory or `Default`.
/// - `rename = "..."`: external member or variant name.
///
/// Members are serialized in ordinal order of their external names, not in
/// declaration order. Two members with the same external name are a
/// compile error.
#[proc_macro_derive(Describe, attributes(describe))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let meta = match derive_data::DescribeMeta::from_input(&ast) {
        Ok(meta) => meta,
        Err(err) => return err.into_compile_error().into(),
    };

    let describe_impls = impls::impl_describe(&meta);
    let auto_register = impls::auto_register(&meta);

    TokenStream::from(quote! {
        const _: () = {
            #describe_impls
            #auto_register
        };
    })
}

/// Add the type to the automatic registry.
///
/// If the feature is not enabled, this macro will not do anything.
///
/// The type must be concrete (no uncertain generic parameters).
///
/// ## Example
///
/// ```ignore
/// impl_auto_register!(foo::Foo);
/// impl_auto_register!(Vec<u32>); // Ok
/// ```
///
/// This does not conflict with the `describe(auto_register)` attribute.
#[proc_macro]
pub fn impl_auto_register(_input: TokenStream) -> TokenStream {
    #[cfg(not(feature = "auto_register"))]
    return TokenStream::new();

    #[cfg(feature = "auto_register")]
    {
        let ty = parse_macro_input!(_input as syn::Type);
        let codec = path::weft_codec();
        let submit = impls::submit_registration(&codec, &quote!(#ty));

        TokenStream::from(quote! {
            const _: () = {
                #submit
            };
        })
    }
}
