use alloc::rc::Rc;
use core::any::{Any, TypeId};
use core::cell::{self, RefCell};
use core::fmt;

use crate::info::{Describe, TypeKey};
use crate::{Error, Result};

// -----------------------------------------------------------------------------
// ObjectHandle

/// A handle type through which the codec reaches a shared object.
///
/// The handle's [`Target`](Self::Target) is the declared type of the object.
/// Objects of any type assignable to it may sit behind the handle.
pub trait ObjectHandle: Describe + Sized {
    type Target: ?Sized + Describe;

    fn as_obj(&self) -> &Obj;

    /// Wraps `obj`. The caller has checked that it is assignable to `Target`.
    fn from_obj(obj: Obj) -> Self;
}

// -----------------------------------------------------------------------------
// Obj

struct ObjBox<T: ?Sized> {
    key: TypeKey,
    cell: RefCell<T>,
}

/// An untyped shared object.
///
/// Cloning shares the object. Identity is the address of the allocation, see
/// [`ptr_eq`](Self::ptr_eq).
///
/// Reference cycles between objects are never collected. Break them by hand
/// when the graph is dropped.
///
/// # Examples
///
/// ```
/// use weft_codec::object::Obj;
///
/// let a = Obj::new(String::from("hello"));
/// let b = a.clone();
///
/// b.borrow_mut::<String>().unwrap().push('!');
/// assert_eq!(&*a.borrow::<String>().unwrap(), "hello!");
/// assert!(a.ptr_eq(&b));
/// assert!(a.borrow::<u32>().is_none());
/// ```
#[derive(Clone)]
pub struct Obj(Rc<ObjBox<dyn Any>>);

impl Obj {
    pub fn new<T: Describe>(value: T) -> Self {
        let inner: Rc<ObjBox<dyn Any>> = Rc::new(ObjBox {
            key: TypeKey::of::<T>(),
            cell: RefCell::new(value),
        });
        Self(inner)
    }

    /// Runtime type of the object.
    #[inline]
    pub fn key(&self) -> TypeKey {
        self.0.key
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.0.key.path()
    }

    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.0.key.id() == TypeId::of::<T>()
    }

    /// `None` if the object is not a `T` or is mutably borrowed.
    pub fn borrow<T: Any>(&self) -> Option<cell::Ref<'_, T>> {
        let guard = self.0.cell.try_borrow().ok()?;
        cell::Ref::filter_map(guard, |value| value.downcast_ref::<T>()).ok()
    }

    /// `None` if the object is not a `T` or is borrowed.
    pub fn borrow_mut<T: Any>(&self) -> Option<cell::RefMut<'_, T>> {
        let guard = self.0.cell.try_borrow_mut().ok()?;
        cell::RefMut::filter_map(guard, |value| value.downcast_mut::<T>()).ok()
    }

    pub fn try_borrow_any(&self) -> Result<cell::Ref<'_, dyn Any>> {
        self.0
            .cell
            .try_borrow()
            .map_err(|_| Error::ObjectBusy(self.type_path()))
    }

    pub fn try_borrow_any_mut(&self) -> Result<cell::RefMut<'_, dyn Any>> {
        self.0
            .cell
            .try_borrow_mut()
            .map_err(|_| Error::ObjectBusy(self.type_path()))
    }

    /// Whether both handles point at the same object.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of handles sharing the object.
    #[inline]
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    #[inline]
    pub(crate) fn addr(&self) -> *const () {
        self.0.cell.as_ptr() as *const ()
    }
}

impl ObjectHandle for Obj {
    type Target = dyn Any;

    #[inline]
    fn as_obj(&self) -> &Obj {
        self
    }

    #[inline]
    fn from_obj(obj: Obj) -> Self {
        obj
    }
}

impl fmt::Debug for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Obj({} @ {:p})", self.type_path(), self.addr())
    }
}

#[cfg(test)]
mod tests {
    use super::Obj;
    use crate::Error;
    use alloc::string::String;

    #[test]
    fn busy_objects_report_their_type() {
        let obj = Obj::new(String::from("x"));
        let _guard = obj.try_borrow_any_mut().unwrap();
        assert!(obj.borrow::<String>().is_none());
        let err = obj.try_borrow_any().unwrap_err();
        assert_eq!(err, Error::ObjectBusy(core::any::type_name::<String>()));
    }

    #[test]
    fn identity_is_per_allocation() {
        let a = Obj::new(1u8);
        let b = Obj::new(1u8);
        assert!(!a.ptr_eq(&b));
        assert_ne!(a.addr(), b.addr());
        assert_eq!(a.clone().addr(), a.addr());
        assert_eq!(a.handle_count(), 1);
    }
}
