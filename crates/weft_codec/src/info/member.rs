use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::{Any, type_name};
use core::fmt;

use crate::info::{Describe, TypeKey};
use crate::{Error, Result};

// -----------------------------------------------------------------------------
// MemberAccess

/// Type-erased read and write access to one member of an aggregate.
pub trait MemberAccess: Send + Sync {
    fn can_read(&self) -> bool;

    fn can_write(&self) -> bool;

    /// The member of `target`, `None` if `target` is not the owning type.
    fn get<'a>(&self, target: &'a dyn Any) -> Option<&'a dyn Any>;

    /// Moves `value` into the member of `target`.
    fn set(&self, target: &mut dyn Any, value: Box<dyn Any>) -> Result<()>;
}

struct FieldAccess<S, T> {
    get: fn(&S) -> &T,
    get_mut: Option<fn(&mut S) -> &mut T>,
}

impl<S: Any, T: Any> MemberAccess for FieldAccess<S, T> {
    #[inline]
    fn can_read(&self) -> bool {
        true
    }

    #[inline]
    fn can_write(&self) -> bool {
        self.get_mut.is_some()
    }

    fn get<'a>(&self, target: &'a dyn Any) -> Option<&'a dyn Any> {
        let target = target.downcast_ref::<S>()?;
        Some((self.get)(target) as &dyn Any)
    }

    fn set(&self, target: &mut dyn Any, value: Box<dyn Any>) -> Result<()> {
        let get_mut = self
            .get_mut
            .ok_or_else(|| Error::conversion(type_name::<S>(), "member is read-only"))?;
        let target = target
            .downcast_mut::<S>()
            .ok_or_else(|| Error::mismatch(type_name::<S>(), "member owner"))?;
        let value = value
            .downcast::<T>()
            .map_err(|_| Error::mismatch(type_name::<T>(), "member value"))?;
        *get_mut(target) = *value;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// MemberDescriptor

/// One data member of a struct or class.
///
/// Only members that are readable, writable and not excluded take part in
/// serialization, see [`is_serializable`](Self::is_serializable).
///
/// # Examples
///
/// ```
/// use weft_codec::info::MemberDescriptor;
///
/// #[derive(Default)]
/// struct Point { x: i32 }
///
/// let member = MemberDescriptor::field::<Point, i32>("x", |p| &p.x, |p| &mut p.x)
///     .rename("X");
///
/// assert_eq!(member.name(), "X");
/// assert_eq!(member.field_name(), "x");
/// assert!(member.is_serializable());
///
/// let point = Point { x: 7 };
/// let x = member.get(&point).unwrap();
/// assert_eq!(x.downcast_ref::<i32>(), Some(&7));
/// ```
#[derive(Clone)]
pub struct MemberDescriptor {
    name: &'static str,
    field: &'static str,
    ty: Option<TypeKey>,
    access: Option<Arc<dyn MemberAccess>>,
    excluded: bool,
}

impl MemberDescriptor {
    /// A readable and writable field of `S` with declared type `T`.
    pub fn field<S: Any, T: Describe>(
        field: &'static str,
        get: fn(&S) -> &T,
        get_mut: fn(&mut S) -> &mut T,
    ) -> Self {
        Self::with_access(field, TypeKey::of::<T>(), FieldAccess { get, get_mut: Some(get_mut) })
    }

    /// A member that can be read but not written, never serialized.
    pub fn read_only<S: Any, T: Describe>(field: &'static str, get: fn(&S) -> &T) -> Self {
        Self::with_access(field, TypeKey::of::<T>(), FieldAccess { get, get_mut: None })
    }

    /// A member with custom access.
    pub fn with_access(field: &'static str, ty: TypeKey, access: impl MemberAccess + 'static) -> Self {
        Self {
            name: field,
            field,
            ty: Some(ty),
            access: Some(Arc::new(access)),
            excluded: false,
        }
    }

    /// A member known by name only, always excluded.
    pub fn skipped(field: &'static str) -> Self {
        Self {
            name: field,
            field,
            ty: None,
            access: None,
            excluded: true,
        }
    }

    /// Sets the external name.
    pub fn rename(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Marks the member as excluded from serialization.
    pub fn exclude(mut self) -> Self {
        self.excluded = true;
        self
    }

    /// External name, used as the node name and as the sort key.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Rust field name.
    #[inline]
    pub fn field_name(&self) -> &'static str {
        self.field
    }

    /// Declared type, `None` for members known by name only.
    #[inline]
    pub fn ty(&self) -> Option<TypeKey> {
        self.ty
    }

    #[inline]
    pub fn can_read(&self) -> bool {
        self.access.as_ref().is_some_and(|access| access.can_read())
    }

    #[inline]
    pub fn can_write(&self) -> bool {
        self.access.as_ref().is_some_and(|access| access.can_write())
    }

    #[inline]
    pub fn is_excluded(&self) -> bool {
        self.excluded
    }

    pub fn is_serializable(&self) -> bool {
        !self.excluded && self.ty.is_some() && self.can_read() && self.can_write()
    }

    pub fn get<'a>(&self, target: &'a dyn Any) -> Option<&'a dyn Any> {
        self.access.as_ref()?.get(target)
    }

    pub fn set(&self, target: &mut dyn Any, value: Box<dyn Any>) -> Result<()> {
        match &self.access {
            Some(access) => access.set(target, value),
            None => Err(Error::conversion(self.field, "member has no accessor")),
        }
    }
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("serializable", &self.is_serializable())
            .finish()
    }
}
