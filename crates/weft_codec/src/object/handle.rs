use core::any::Any;
use core::cell;
use core::fmt;
use core::marker::PhantomData;

use crate::info::Describe;
use crate::object::{Obj, ObjectHandle};

// -----------------------------------------------------------------------------
// Ref

/// A typed handle to a shared object.
///
/// `T` is the declared type. It is either the concrete class or a trait
/// object standing for a family of classes, in which case the object behind
/// the handle may be any class registered with `T` as a base.
///
/// Cloning shares the object.
pub struct Ref<T: ?Sized> {
    obj: Obj,
    marker: PhantomData<*const T>,
}

impl<T: Describe> Ref<T> {
    pub fn new(value: T) -> Self {
        Self::from_obj(Obj::new(value))
    }

    /// `None` if the object is mutably borrowed.
    #[inline]
    pub fn borrow(&self) -> Option<cell::Ref<'_, T>> {
        self.obj.borrow::<T>()
    }

    /// `None` if the object is borrowed.
    #[inline]
    pub fn borrow_mut(&self) -> Option<cell::RefMut<'_, T>> {
        self.obj.borrow_mut::<T>()
    }
}

impl<T: ?Sized + Describe> Ref<T> {
    /// Wraps `obj` without checking its runtime type against `T`.
    #[inline]
    pub fn from_obj(obj: Obj) -> Self {
        Self { obj, marker: PhantomData }
    }

    #[inline]
    pub fn obj(&self) -> &Obj {
        &self.obj
    }

    #[inline]
    pub fn into_obj(self) -> Obj {
        self.obj
    }

    /// A handle typed as the concrete class `U`, `None` if the object is not a `U`.
    pub fn downcast<U: Describe>(&self) -> Option<Ref<U>> {
        self.obj
            .is::<U>()
            .then(|| Ref::from_obj(self.obj.clone()))
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.obj.ptr_eq(&other.obj)
    }
}

impl<T: ?Sized> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            obj: self.obj.clone(),
            marker: PhantomData,
        }
    }
}

impl<T: ?Sized + Describe> ObjectHandle for Ref<T> {
    type Target = T;

    #[inline]
    fn as_obj(&self) -> &Obj {
        &self.obj
    }

    #[inline]
    fn from_obj(obj: Obj) -> Self {
        Ref::from_obj(obj)
    }
}

impl<T: ?Sized + Any> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref<{}>({:?})", core::any::type_name::<T>(), self.obj)
    }
}
