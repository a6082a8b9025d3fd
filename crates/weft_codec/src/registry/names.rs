use alloc::borrow::Cow;
use alloc::string::ToString;
use alloc::sync::Arc;

use crate::info::{TypeDescriptor, TypeKey};
use crate::registry::TypeRegistry;
use crate::{Error, Result};

// -----------------------------------------------------------------------------
// TypeNameResolver

/// Maps runtime types of class objects to the names written in the stream.
///
/// `name_to_type(type_to_name(t))` must give back `t` for every type that is
/// written. The [`TypeRegistry`] implementation uses registered names and aliases.
pub trait TypeNameResolver: Send + Sync {
    fn type_to_name(&self, ty: &TypeDescriptor) -> Result<Cow<'static, str>>;

    /// Fails with [`Error::UnresolvedTypeName`] for unknown names.
    fn name_to_type(&self, name: &str) -> Result<TypeKey>;
}

impl TypeNameResolver for TypeRegistry {
    fn type_to_name(&self, ty: &TypeDescriptor) -> Result<Cow<'static, str>> {
        Ok(Cow::Borrowed(self.name_of(ty.id()).unwrap_or(ty.name())))
    }

    fn name_to_type(&self, name: &str) -> Result<TypeKey> {
        self.get_with_name(name)
            .ok_or_else(|| Error::UnresolvedTypeName(name.to_string()))
    }
}

// -----------------------------------------------------------------------------
// TypePathResolver

/// Writes full Rust type paths instead of external names.
///
/// Streams stay readable without aliases, at the cost of breaking whenever a
/// type moves.
#[derive(Debug, Clone)]
pub struct TypePathResolver {
    registry: Arc<TypeRegistry>,
}

impl TypePathResolver {
    #[inline]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }
}

impl TypeNameResolver for TypePathResolver {
    #[inline]
    fn type_to_name(&self, ty: &TypeDescriptor) -> Result<Cow<'static, str>> {
        Ok(Cow::Borrowed(ty.type_path()))
    }

    fn name_to_type(&self, name: &str) -> Result<TypeKey> {
        self.registry
            .get_with_type_path(name)
            .ok_or_else(|| Error::UnresolvedTypeName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{TypeNameResolver, TypePathResolver};
    use crate::info::TypeKey;
    use crate::registry::TypeRegistry;
    use crate::Error;
    use alloc::sync::Arc;

    #[test]
    fn aliases_are_written() {
        let mut registry = TypeRegistry::new();
        registry.register_alias::<Option<u8>>("maybe_byte").unwrap();
        let desc = registry.describe_type::<Option<u8>>().unwrap();

        assert_eq!(registry.type_to_name(&desc).unwrap(), "maybe_byte");
        assert_eq!(registry.name_to_type("maybe_byte").unwrap(), TypeKey::of::<Option<u8>>());
        assert_eq!(
            registry.name_to_type("missing").unwrap_err(),
            Error::UnresolvedTypeName("missing".into())
        );
    }

    #[test]
    fn paths_round_trip() {
        let resolver = TypePathResolver::new(Arc::new(TypeRegistry::new()));
        let desc = <u32 as crate::Describe>::describe();
        let name = resolver.type_to_name(&desc).unwrap();
        assert_eq!(name, "u32");
        assert_eq!(resolver.name_to_type(&name).unwrap(), TypeKey::of::<u32>());
    }
}
