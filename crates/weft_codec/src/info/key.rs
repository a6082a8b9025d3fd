use core::any::{Any, TypeId};
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::info::TypeDescriptor;

// -----------------------------------------------------------------------------
// Describe

/// A type that can describe its own serialization layout.
///
/// Implemented for primitives, `String`, `Option<T>`, `Vec<T>`, `[T; N]`,
/// [`NdArray<T>`](crate::object::NdArray), the object handles and `dyn Any`.
/// User types derive it with `#[derive(Describe)]`, trait objects use
/// [`describe_abstract!`](crate::describe_abstract).
///
/// The descriptor is built lazily and at most once per registry, so
/// `describe` may do some work.
///
/// # Examples
///
/// ```
/// use weft_codec::info::{Describe, TypeKind};
///
/// let desc = <u32 as Describe>::describe();
/// assert_eq!(desc.name(), "uint32");
/// assert!(matches!(desc.kind(), TypeKind::Value(_)));
/// ```
pub trait Describe: Any {
    fn describe() -> TypeDescriptor;
}

// -----------------------------------------------------------------------------
// TypeKey

/// Identity of a describable type plus the means to describe it.
///
/// Descriptors refer to other types (member types, element types, bases)
/// through keys, so building a descriptor never recurses into its dependencies.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    path: &'static str,
    describe: fn() -> TypeDescriptor,
}

impl TypeKey {
    #[inline]
    pub fn of<T: ?Sized + Describe>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            path: core::any::type_name::<T>(),
            describe: T::describe,
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The Rust type path, for diagnostics.
    #[inline]
    pub fn path(&self) -> &'static str {
        self.path
    }

    /// Builds a fresh descriptor. Prefer the registry's cached copy.
    #[inline]
    pub fn describe(&self) -> TypeDescriptor {
        (self.describe)()
    }

    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.path)
    }
}
