use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use weft_utils::hash::HashSet;

use crate::format::PrimitiveValue;
use crate::info::{
    ArrayInfo, ClassInfo, Describe, HandleInfo, Hooks, MemberDescriptor, NullableInfo, StructInfo,
    TypeKey, ValueInfo,
};
use crate::strategy::{MemberStrategy, Strategy};
use crate::{DeserializationContext, Error, Result, SerializationContext};

// -----------------------------------------------------------------------------
// TypeKind

/// Classification of a type, which decides the strategy that handles it.
pub enum TypeKind {
    /// Leaf with a native [`Primitive`](crate::format::Primitive) form.
    Value(ValueInfo),
    /// Leaf without a native form. Needs a registered value converter.
    Opaque,
    /// Array of any rank.
    Array(ArrayInfo),
    /// Value aggregate, copied and never tracked by identity.
    Struct(StructInfo),
    /// Shared object, tracked by identity and possibly polymorphic.
    Class(ClassInfo),
    /// Trait object or `dyn Any`. Only ever a declared type.
    Abstract,
    /// `Option<T>`.
    Nullable(NullableInfo),
    /// A handle to a shared object, `Obj` or `Ref<T>`.
    Handle(HandleInfo),
}

impl TypeKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Value(_) => "value",
            Self::Opaque => "opaque",
            Self::Array(_) => "array",
            Self::Struct(_) => "struct",
            Self::Class(_) => "class",
            Self::Abstract => "abstract",
            Self::Nullable(_) => "nullable",
            Self::Handle(_) => "handle",
        }
    }
}

impl fmt::Debug for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// -----------------------------------------------------------------------------
// TypeDescriptor

/// Serialization layout of one type.
///
/// Immutable once built. The registry caches one per type.
pub struct TypeDescriptor {
    key: TypeKey,
    name: &'static str,
    kind: TypeKind,
    strategy: Option<fn() -> Arc<dyn Strategy>>,
    member_strategy: Option<Arc<dyn MemberStrategy>>,
    hooks: Hooks,
}

fn make_strategy<S: Strategy + Default>() -> Arc<dyn Strategy> {
    Arc::new(S::default())
}

impl TypeDescriptor {
    /// Creates a descriptor for `T` with external name `name`.
    pub fn new<T: ?Sized + Describe>(name: &'static str, kind: TypeKind) -> Self {
        Self {
            key: TypeKey::of::<T>(),
            name,
            kind,
            strategy: None,
            member_strategy: None,
            hooks: Hooks::default(),
        }
    }

    #[inline]
    pub fn value<T: PrimitiveValue + Describe>(name: &'static str) -> Self {
        Self::new::<T>(name, TypeKind::Value(ValueInfo::of::<T>()))
    }

    #[inline]
    pub fn opaque<T: Describe>(name: &'static str) -> Self {
        Self::new::<T>(name, TypeKind::Opaque)
    }

    #[inline]
    pub fn structure<T: Describe>(name: &'static str, info: StructInfo) -> Self {
        Self::new::<T>(name, TypeKind::Struct(info))
    }

    #[inline]
    pub fn class<T: Describe>(name: &'static str, info: ClassInfo) -> Self {
        Self::new::<T>(name, TypeKind::Class(info))
    }

    #[inline]
    pub fn abstract_type<T: ?Sized + Describe>(name: &'static str) -> Self {
        Self::new::<T>(name, TypeKind::Abstract)
    }

    /// Routes this type to strategy `S` ahead of every other strategy.
    ///
    /// Class and abstract types always go through the class strategy, a
    /// marker on them fails validation. Use
    /// [`with_member_strategy`](Self::with_member_strategy) instead.
    pub fn with_strategy<S: Strategy + Default>(mut self) -> Self {
        self.strategy = Some(make_strategy::<S>);
        self
    }

    /// Replaces the member traversal of this struct or class with `M`.
    pub fn with_member_strategy<M: MemberStrategy + Default>(mut self) -> Self {
        self.member_strategy = Some(Arc::new(M::default()));
        self
    }

    /// Replaces member traversal with `hook` when writing.
    pub fn with_serialize_hook<S: Any>(
        mut self,
        hook: fn(&S, &mut SerializationContext<'_>) -> Result<()>,
    ) -> Self {
        self.hooks.set_serialize(hook);
        self
    }

    /// Replaces member population with `hook` when reading.
    pub fn with_deserialize_hook<S: Any>(
        mut self,
        hook: fn(&mut S, &mut DeserializationContext<'_>) -> Result<()>,
    ) -> Self {
        self.hooks.set_deserialize(hook);
        self
    }

    #[inline]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.key.id()
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.key.path()
    }

    /// External name, the default name written for class objects.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    #[inline]
    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    #[inline]
    pub fn strategy_marker(&self) -> Option<fn() -> Arc<dyn Strategy>> {
        self.strategy
    }

    #[inline]
    pub fn member_strategy(&self) -> Option<&dyn MemberStrategy> {
        self.member_strategy.as_deref()
    }

    #[inline]
    pub fn value_info(&self) -> Option<&ValueInfo> {
        match &self.kind {
            TypeKind::Value(info) => Some(info),
            _ => None,
        }
    }

    #[inline]
    pub fn is_class(&self) -> bool {
        matches!(self.kind, TypeKind::Class(_))
    }

    /// A growable list, which may also be shared behind a handle.
    #[inline]
    pub fn is_list(&self) -> bool {
        matches!(&self.kind, TypeKind::Array(info) if info.list_ops().is_some())
    }

    /// Members in serialization order, empty for non-aggregates.
    pub fn members(&self) -> &[MemberDescriptor] {
        match &self.kind {
            TypeKind::Struct(info) => info.members(),
            TypeKind::Class(info) => info.members(),
            _ => &[],
        }
    }

    /// Direct base types, empty unless this is a class.
    pub fn bases(&self) -> &[TypeKey] {
        match &self.kind {
            TypeKind::Class(info) => info.bases(),
            _ => &[],
        }
    }

    /// Every type this descriptor refers to.
    pub fn dependencies(&self) -> Vec<TypeKey> {
        let mut deps: Vec<TypeKey> = self.members().iter().filter_map(MemberDescriptor::ty).collect();
        match &self.kind {
            TypeKind::Array(info) => deps.push(info.element()),
            TypeKind::Nullable(info) => deps.push(info.inner()),
            TypeKind::Handle(info) => deps.push(info.target()),
            TypeKind::Class(info) => deps.extend_from_slice(info.bases()),
            _ => {}
        }
        deps
    }

    /// Checks invariants a hand-written [`Describe`] impl could break.
    pub(crate) fn validate(&self, requested: TypeKey) -> Result<()> {
        if self.key != requested {
            return Err(Error::mismatch(requested.path(), self.key.path()));
        }
        if self.strategy.is_some() && matches!(self.kind, TypeKind::Class(_) | TypeKind::Abstract) {
            return Err(Error::InvalidDescriptor {
                type_path: self.key.path(),
                reason: "object types cannot carry a strategy marker",
            });
        }
        let mut seen: HashSet<&str> = HashSet::default();
        for member in self.members() {
            if !seen.insert(member.name()) {
                return Err(Error::DuplicateRegistration(format!(
                    "{}::{}",
                    self.name,
                    member.name()
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("path", &self.key.path())
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("members", &self.members())
            .finish()
    }
}
