use proc_macro2::Span;
use syn::{Attribute, LitStr, Path, Type, spanned::Spanned};

use crate::DESCRIBE_ATTRIBUTE_NAME;

/// Attributes on the type: `#[describe(...)]`.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    pub class: Option<Span>,
    pub opaque: Option<Span>,
    pub alias: Option<LitStr>,
    pub bases: Vec<Type>,
    pub strategy: Option<Type>,
    pub members: Option<Type>,
    pub factory: Option<Path>,
    pub serialize_with: Option<Path>,
    pub deserialize_with: Option<Path>,
    pub auto_register: Option<Span>,
}

fn set_once<T>(slot: &mut Option<T>, value: T, span: Span, name: &str) -> syn::Result<()> {
    if slot.is_some() {
        return Err(syn::Error::new(span, format!("duplicate `{name}` attribute")));
    }
    *slot = Some(value);
    Ok(())
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in attrs {
            if attr.path().is_ident(DESCRIBE_ATTRIBUTE_NAME) {
                this.parse_attr(attr)?;
            }
        }
        Ok(this)
    }

    fn parse_attr(&mut self, attr: &Attribute) -> syn::Result<()> {
        attr.parse_nested_meta(|meta| {
            let span = meta.path.span();
            if meta.path.is_ident("class") {
                set_once(&mut self.class, span, span, "class")
            } else if meta.path.is_ident("opaque") {
                set_once(&mut self.opaque, span, span, "opaque")
            } else if meta.path.is_ident("auto_register") {
                set_once(&mut self.auto_register, span, span, "auto_register")
            } else if meta.path.is_ident("alias") {
                let alias: LitStr = meta.value()?.parse()?;
                if alias.value().is_empty() {
                    return Err(syn::Error::new(alias.span(), "alias must not be empty"));
                }
                set_once(&mut self.alias, alias, span, "alias")
            } else if meta.path.is_ident("base") {
                self.bases.push(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("strategy") {
                let strategy: Type = meta.value()?.parse()?;
                set_once(&mut self.strategy, strategy, span, "strategy")
            } else if meta.path.is_ident("members") {
                let members: Type = meta.value()?.parse()?;
                set_once(&mut self.members, members, span, "members")
            } else if meta.path.is_ident("factory") {
                let factory: Path = meta.value()?.parse()?;
                set_once(&mut self.factory, factory, span, "factory")
            } else if meta.path.is_ident("serialize_with") {
                let hook: Path = meta.value()?.parse()?;
                set_once(&mut self.serialize_with, hook, span, "serialize_with")
            } else if meta.path.is_ident("deserialize_with") {
                let hook: Path = meta.value()?.parse()?;
                set_once(&mut self.deserialize_with, hook, span, "deserialize_with")
            } else {
                Err(meta.error("unknown `describe` attribute"))
            }
        })
    }

    /// Rejects combinations that have no meaning.
    pub fn validity(&self) -> syn::Result<()> {
        if let (Some(_), Some(span)) = (self.class, self.opaque) {
            return Err(syn::Error::new(span, "`opaque` and `class` are mutually exclusive"));
        }
        if self.class.is_none()
            && let Some(base) = self.bases.first()
        {
            return Err(syn::Error::new(base.span(), "`base` requires `class`"));
        }
        if let (Some(_), Some(strategy)) = (self.class, &self.strategy) {
            return Err(syn::Error::new(
                strategy.span(),
                "classes are always written by the class strategy, use `members = ..` instead",
            ));
        }
        if self.opaque.is_some() {
            let members_only = [
                self.members.as_ref().map(|ty| ty.span()),
                self.factory.as_ref().map(|p| p.span()),
                self.serialize_with.as_ref().map(|p| p.span()),
                self.deserialize_with.as_ref().map(|p| p.span()),
            ];
            if let Some(span) = members_only.into_iter().flatten().next() {
                return Err(syn::Error::new(span, "opaque types have no members"));
            }
        }
        Ok(())
    }
}

