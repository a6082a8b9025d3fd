use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, GenericParam, Generics, Ident, LitStr, Type};

use crate::derive_data::{FieldAttributes, TypeAttributes};
use crate::path;

// -----------------------------------------------------------------------------
// Parsed items

pub(crate) struct StructField<'a> {
    pub ident: &'a Ident,
    pub ty: &'a Type,
    pub attrs: FieldAttributes,
}

impl StructField<'_> {
    /// The name the member is written under.
    pub fn external_name(&self) -> LitStr {
        external_name(self.ident, &self.attrs)
    }
}

pub(crate) struct EnumVariant<'a> {
    pub ident: &'a Ident,
    pub attrs: FieldAttributes,
}

impl EnumVariant<'_> {
    pub fn external_name(&self) -> LitStr {
        external_name(self.ident, &self.attrs)
    }
}

fn external_name(ident: &Ident, attrs: &FieldAttributes) -> LitStr {
    match &attrs.rename {
        Some(name) => name.clone(),
        None => LitStr::new(&ident.unraw().to_string(), ident.span()),
    }
}

pub(crate) enum DescribeData<'a> {
    Struct(Vec<StructField<'a>>),
    Enum(Vec<EnumVariant<'a>>),
}

// -----------------------------------------------------------------------------
// DescribeMeta

/// Everything the code generators need to know about the input type.
pub(crate) struct DescribeMeta<'a> {
    ident: &'a Ident,
    generics: &'a Generics,
    attrs: TypeAttributes,
    data: DescribeData<'a>,
    codec: syn::Path,
}

impl<'a> DescribeMeta<'a> {
    pub fn from_input(input: &'a DeriveInput) -> syn::Result<Self> {
        let attrs = TypeAttributes::parse_attrs(&input.attrs)?;
        attrs.validity()?;

        if let Some(lifetime) = input.generics.lifetimes().next() {
            return Err(syn::Error::new(
                lifetime.span(),
                "`Describe` types must be 'static, lifetime parameters are not supported",
            ));
        }

        let data = match &input.data {
            Data::Struct(data) => DescribeData::Struct(Self::parse_fields(&data.fields, attrs.opaque.is_some())?),
            Data::Enum(data) => {
                Self::check_enum_attrs(input, &attrs)?;
                let mut variants = Vec::with_capacity(data.variants.len());
                for variant in &data.variants {
                    if !matches!(variant.fields, Fields::Unit) {
                        return Err(syn::Error::new(
                            variant.span(),
                            "only enums with unit variants can derive `Describe`",
                        ));
                    }
                    let attrs = FieldAttributes::parse_attrs(&variant.attrs)?;
                    if let Some(span) = attrs.skip {
                        return Err(syn::Error::new(span, "enum variants cannot be skipped"));
                    }
                    variants.push(EnumVariant {
                        ident: &variant.ident,
                        attrs,
                    });
                }
                if variants.is_empty() {
                    return Err(syn::Error::new(input.ident.span(), "enums without variants cannot derive `Describe`"));
                }
                check_unique(variants.iter().map(EnumVariant::external_name))?;
                DescribeData::Enum(variants)
            }
            Data::Union(data) => {
                return Err(syn::Error::new(
                    data.union_token.span(),
                    "unions cannot derive `Describe`",
                ));
            }
        };

        Ok(Self {
            ident: &input.ident,
            generics: &input.generics,
            attrs,
            data,
            codec: path::weft_codec(),
        })
    }

    fn parse_fields(fields: &'a Fields, opaque: bool) -> syn::Result<Vec<StructField<'a>>> {
        let named = match fields {
            // Opaque types carry no members, whatever their shape.
            _ if opaque => return Ok(Vec::new()),
            Fields::Named(named) => named,
            Fields::Unit => return Ok(Vec::new()),
            Fields::Unnamed(unnamed) => {
                return Err(syn::Error::new(
                    unnamed.span(),
                    "tuple structs cannot derive `Describe`, use named fields or `opaque`",
                ));
            }
        };
        let mut result = Vec::with_capacity(named.named.len());
        for field in &named.named {
            let Some(ident) = &field.ident else {
                return Err(syn::Error::new(field.span(), "expected a named field"));
            };
            result.push(StructField {
                ident,
                ty: &field.ty,
                attrs: FieldAttributes::parse_attrs(&field.attrs)?,
            });
        }
        check_unique(result.iter().map(StructField::external_name))?;
        Ok(result)
    }

    fn check_enum_attrs(input: &DeriveInput, attrs: &TypeAttributes) -> syn::Result<()> {
        if let Some(param) = input.generics.params.first() {
            return Err(syn::Error::new(param.span(), "generic enums cannot derive `Describe`"));
        }
        let invalid = [
            attrs.class.map(|_| "class"),
            attrs.opaque.map(|_| "opaque"),
            attrs.members.as_ref().map(|_| "members"),
            attrs.factory.as_ref().map(|_| "factory"),
            attrs.serialize_with.as_ref().map(|_| "serialize_with"),
            attrs.deserialize_with.as_ref().map(|_| "deserialize_with"),
        ];
        match invalid.into_iter().flatten().next() {
            Some(name) => Err(syn::Error::new(
                input.ident.span(),
                format!("`{name}` is not supported on enums"),
            )),
            None => Ok(()),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors

    #[inline]
    pub fn ident(&self) -> &Ident {
        self.ident
    }

    #[inline]
    pub fn attrs(&self) -> &TypeAttributes {
        &self.attrs
    }

    #[inline]
    pub fn data(&self) -> &DescribeData<'a> {
        &self.data
    }

    #[inline]
    pub fn codec_path(&self) -> &syn::Path {
        &self.codec
    }

    /// Whether the type has type or const parameters.
    pub fn impl_with_generic(&self) -> bool {
        !self
            .generics
            .params
            .iter()
            .all(|param| matches!(param, GenericParam::Lifetime(_)))
    }

    /// Whether deserialization builds the value with `Default`.
    fn needs_default(&self) -> bool {
        self.attrs.factory.is_none() && self.attrs.opaque.is_none()
    }

    /// Expression of type `&'static str` naming the type.
    pub fn type_name(&self) -> TokenStream {
        if let Some(alias) = &self.attrs.alias {
            return alias.to_token_stream();
        }
        if self.impl_with_generic() {
            return quote! { ::core::any::type_name::<Self>() };
        }
        LitStr::new(&self.ident.unraw().to_string(), self.ident.span()).to_token_stream()
    }

    /// `impl_generics`, `ty_generics` and a where clause bounding every type
    /// parameter by `Describe`.
    pub fn split_generics(&self) -> (TokenStream, TokenStream, TokenStream) {
        let info_ = path::info_(&self.codec);
        let (impl_generics, ty_generics, where_clause) = self.generics.split_for_impl();

        let mut predicates: Vec<TokenStream> = match where_clause {
            Some(clause) => clause.predicates.iter().map(ToTokens::to_token_stream).collect(),
            None => Vec::new(),
        };
        for param in self.generics.type_params() {
            let ident = &param.ident;
            predicates.push(quote! { #ident: #info_::Describe });
        }
        if self.impl_with_generic() && self.needs_default() {
            predicates.push(quote! { Self: ::core::default::Default });
        }

        let where_clause = if predicates.is_empty() {
            TokenStream::new()
        } else {
            quote! { where #(#predicates,)* }
        };
        (
            impl_generics.to_token_stream(),
            ty_generics.to_token_stream(),
            where_clause,
        )
    }
}

/// Rejects two members or variants sharing an external name.
fn check_unique(names: impl Iterator<Item = LitStr>) -> syn::Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.value()) {
            return Err(syn::Error::new(
                name.span(),
                format!("duplicate member name `{}`", name.value()),
            ));
        }
    }
    Ok(())
}
