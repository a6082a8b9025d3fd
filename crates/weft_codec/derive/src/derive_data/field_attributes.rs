use proc_macro2::Span;
use syn::{Attribute, LitStr, spanned::Spanned};

use crate::DESCRIBE_ATTRIBUTE_NAME;

/// Attributes on a field or variant: `#[describe(skip)]`, `#[describe(rename = "..")]`.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    pub skip: Option<Span>,
    pub rename: Option<LitStr>,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(DESCRIBE_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    this.skip = Some(meta.path.span());
                    Ok(())
                } else if meta.path.is_ident("rename") {
                    let name: LitStr = meta.value()?.parse()?;
                    if name.value().is_empty() {
                        return Err(syn::Error::new(name.span(), "name must not be empty"));
                    }
                    this.rename = Some(name);
                    Ok(())
                } else {
                    Err(meta.error("unknown `describe` field attribute, expected `skip` or `rename`"))
                }
            })?;
        }
        Ok(this)
    }
}
