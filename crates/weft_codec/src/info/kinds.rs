use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, type_name};

use crate::format::{Primitive, PrimitiveKind, PrimitiveValue};
use crate::info::{Describe, MemberDescriptor, TypeKey};
use crate::object::{Obj, ObjectHandle};
use crate::{DeserializationContext, Error, Result};

// -----------------------------------------------------------------------------
// ValueInfo

/// Conversion of a leaf type to and from its native [`Primitive`].
#[derive(Clone, Copy)]
pub struct ValueInfo {
    kind: PrimitiveKind,
    to_primitive: fn(&dyn Any) -> Option<Primitive>,
    from_primitive: fn(Primitive) -> Result<Box<dyn Any>>,
}

fn erased_to_primitive<T: PrimitiveValue>(value: &dyn Any) -> Option<Primitive> {
    value.downcast_ref::<T>().map(T::to_primitive)
}

fn erased_from_primitive<T: PrimitiveValue>(value: Primitive) -> Result<Box<dyn Any>> {
    T::from_primitive(value).map(|v| Box::new(v) as Box<dyn Any>)
}

impl ValueInfo {
    pub fn of<T: PrimitiveValue>() -> Self {
        Self {
            kind: T::KIND,
            to_primitive: erased_to_primitive::<T>,
            from_primitive: erased_from_primitive::<T>,
        }
    }

    /// The primitive variant this type is written as.
    #[inline]
    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    /// `None` if `value` is not of the described type.
    #[inline]
    pub fn to_primitive(&self, value: &dyn Any) -> Option<Primitive> {
        (self.to_primitive)(value)
    }

    #[inline]
    pub fn from_primitive(&self, value: Primitive) -> Result<Box<dyn Any>> {
        (self.from_primitive)(value)
    }
}

// -----------------------------------------------------------------------------
// ArrayInfo

/// A container laid out as a rectangular array.
pub trait ArrayLike: Describe + Sized {
    type Element: Describe;

    /// Per-dimension bounds. Their product is the element count.
    fn bounds(&self) -> Vec<usize>;

    /// The element at a row-major coordinate.
    fn element(&self, coord: &[usize]) -> Option<&Self::Element>;

    /// Rebuilds the container from elements listed in row-major order.
    fn build(bounds: &[usize], elements: Vec<Self::Element>) -> Result<Self>;
}

/// Element access of an array type.
///
/// Growable lists also carry [`ListOps`], which let them be shared behind an
/// object handle and read back in place.
#[derive(Clone, Copy)]
pub struct ArrayInfo {
    element: TypeKey,
    bounds: fn(&dyn Any) -> Option<Vec<usize>>,
    element_at: for<'a> fn(&'a dyn Any, &[usize]) -> Option<&'a dyn Any>,
    build: fn(&[usize], Vec<Box<dyn Any>>) -> Result<Box<dyn Any>>,
    list: Option<ListOps>,
}

/// Construction of a shared `Vec<T>`, one item at a time.
#[derive(Clone, Copy)]
pub struct ListOps {
    create: fn() -> Obj,
    push: fn(&mut dyn Any, Box<dyn Any>) -> Result<()>,
}

fn empty_list<T: Describe>() -> Obj {
    Obj::new(Vec::<T>::new())
}

fn push_item<T: Describe>(list: &mut dyn Any, item: Box<dyn Any>) -> Result<()> {
    let list = list
        .downcast_mut::<Vec<T>>()
        .ok_or_else(|| Error::mismatch(type_name::<Vec<T>>(), "list"))?;
    let item = item
        .downcast::<T>()
        .map_err(|_| Error::mismatch(type_name::<T>(), "list item"))?;
    list.push(*item);
    Ok(())
}

impl ListOps {
    /// A new empty list object.
    #[inline]
    pub fn create(&self) -> Obj {
        (self.create)()
    }

    /// Appends `item` to `list`.
    #[inline]
    pub fn push(&self, list: &mut dyn Any, item: Box<dyn Any>) -> Result<()> {
        (self.push)(list, item)
    }
}

fn erased_bounds<A: ArrayLike>(value: &dyn Any) -> Option<Vec<usize>> {
    value.downcast_ref::<A>().map(A::bounds)
}

fn erased_element<'a, A: ArrayLike>(value: &'a dyn Any, coord: &[usize]) -> Option<&'a dyn Any> {
    let element = value.downcast_ref::<A>()?.element(coord)?;
    Some(element as &dyn Any)
}

fn erased_build<A: ArrayLike>(bounds: &[usize], elements: Vec<Box<dyn Any>>) -> Result<Box<dyn Any>> {
    let elements = elements
        .into_iter()
        .map(|element| {
            element
                .downcast::<A::Element>()
                .map(|element| *element)
                .map_err(|_| Error::mismatch(type_name::<A::Element>(), "array element"))
        })
        .collect::<Result<Vec<_>>>()?;
    A::build(bounds, elements).map(|array| Box::new(array) as Box<dyn Any>)
}

impl ArrayInfo {
    pub fn of<A: ArrayLike>() -> Self {
        Self {
            element: TypeKey::of::<A::Element>(),
            bounds: erased_bounds::<A>,
            element_at: erased_element::<A>,
            build: erased_build::<A>,
            list: None,
        }
    }

    /// `Vec<T>`, which may also be shared as a list object.
    pub fn list<T: Describe>() -> Self {
        Self {
            list: Some(ListOps {
                create: empty_list::<T>,
                push: push_item::<T>,
            }),
            ..Self::of::<Vec<T>>()
        }
    }

    /// Present for growable lists.
    #[inline]
    pub fn list_ops(&self) -> Option<&ListOps> {
        self.list.as_ref()
    }

    /// Declared element type.
    #[inline]
    pub fn element(&self) -> TypeKey {
        self.element
    }

    #[inline]
    pub fn bounds(&self, value: &dyn Any) -> Option<Vec<usize>> {
        (self.bounds)(value)
    }

    #[inline]
    pub fn element_at<'a>(&self, value: &'a dyn Any, coord: &[usize]) -> Option<&'a dyn Any> {
        (self.element_at)(value, coord)
    }

    #[inline]
    pub fn build(&self, bounds: &[usize], elements: Vec<Box<dyn Any>>) -> Result<Box<dyn Any>> {
        (self.build)(bounds, elements)
    }
}

// -----------------------------------------------------------------------------
// Construction

trait Construct: Send + Sync {
    fn boxed(&self, ctx: &DeserializationContext<'_>) -> Result<Box<dyn Any>>;

    fn object(&self, ctx: &DeserializationContext<'_>) -> Result<Obj>;
}

struct Factory<S>(fn(&DeserializationContext<'_>) -> Result<S>);

impl<S: Describe> Construct for Factory<S> {
    fn boxed(&self, ctx: &DeserializationContext<'_>) -> Result<Box<dyn Any>> {
        (self.0)(ctx).map(|value| Box::new(value) as Box<dyn Any>)
    }

    fn object(&self, ctx: &DeserializationContext<'_>) -> Result<Obj> {
        (self.0)(ctx).map(Obj::new)
    }
}

fn default_factory<S: Default>(_: &DeserializationContext<'_>) -> Result<S> {
    Ok(S::default())
}

fn sorted(members: impl IntoIterator<Item = MemberDescriptor>) -> Vec<MemberDescriptor> {
    let mut members: Vec<MemberDescriptor> = members.into_iter().collect();
    // Stable and ordinal, independent of declaration order.
    members.sort_by(|a, b| a.name().cmp(b.name()));
    members
}

// -----------------------------------------------------------------------------
// StructInfo

/// Members and construction of a value aggregate.
#[derive(Clone)]
pub struct StructInfo {
    members: Vec<MemberDescriptor>,
    factory: Arc<dyn Construct>,
}

impl StructInfo {
    /// Built with `S::default()` before members are populated.
    pub fn new<S: Describe + Default>(members: impl IntoIterator<Item = MemberDescriptor>) -> Self {
        Self::with_factory::<S>(members, default_factory::<S>)
    }

    pub fn with_factory<S: Describe>(
        members: impl IntoIterator<Item = MemberDescriptor>,
        factory: fn(&DeserializationContext<'_>) -> Result<S>,
    ) -> Self {
        Self {
            members: sorted(members),
            factory: Arc::new(Factory(factory)),
        }
    }

    #[inline]
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    #[inline]
    pub fn create(&self, ctx: &DeserializationContext<'_>) -> Result<Box<dyn Any>> {
        self.factory.boxed(ctx)
    }
}

// -----------------------------------------------------------------------------
// ClassInfo

/// Members, bases and construction of a shared object type.
#[derive(Clone)]
pub struct ClassInfo {
    members: Vec<MemberDescriptor>,
    bases: Vec<TypeKey>,
    factory: Arc<dyn Construct>,
}

impl ClassInfo {
    /// Built with `S::default()` before members are populated.
    pub fn new<S: Describe + Default>(members: impl IntoIterator<Item = MemberDescriptor>) -> Self {
        Self::with_factory::<S>(members, default_factory::<S>)
    }

    pub fn with_factory<S: Describe>(
        members: impl IntoIterator<Item = MemberDescriptor>,
        factory: fn(&DeserializationContext<'_>) -> Result<S>,
    ) -> Self {
        Self {
            members: sorted(members),
            bases: Vec::new(),
            factory: Arc::new(Factory(factory)),
        }
    }

    /// Declares `base` as a supertype. Handles declared as `base` accept this type.
    pub fn with_base(mut self, base: TypeKey) -> Self {
        if !self.bases.contains(&base) {
            self.bases.push(base);
        }
        self
    }

    #[inline]
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    #[inline]
    pub fn bases(&self) -> &[TypeKey] {
        &self.bases
    }

    #[inline]
    pub fn create(&self, ctx: &DeserializationContext<'_>) -> Result<Obj> {
        self.factory.object(ctx)
    }
}

// -----------------------------------------------------------------------------
// NullableInfo

/// Projection of `Option<T>` onto its inner value.
#[derive(Clone, Copy)]
pub struct NullableInfo {
    inner: TypeKey,
    project: fn(&dyn Any) -> Option<Option<&dyn Any>>,
    wrap: fn(Option<Box<dyn Any>>) -> Option<Box<dyn Any>>,
}

fn project_option<T: Describe>(value: &dyn Any) -> Option<Option<&dyn Any>> {
    let value = value.downcast_ref::<Option<T>>()?;
    Some(value.as_ref().map(|inner| inner as &dyn Any))
}

fn wrap_option<T: Describe>(inner: Option<Box<dyn Any>>) -> Option<Box<dyn Any>> {
    let value: Option<T> = match inner {
        Some(inner) => Some(*inner.downcast::<T>().ok()?),
        None => None,
    };
    Some(Box::new(value))
}

impl NullableInfo {
    pub fn of<T: Describe>() -> Self {
        Self {
            inner: TypeKey::of::<T>(),
            project: project_option::<T>,
            wrap: wrap_option::<T>,
        }
    }

    #[inline]
    pub fn inner(&self) -> TypeKey {
        self.inner
    }

    /// The inner value, `None` when absent.
    pub fn project<'a>(&self, value: &'a dyn Any) -> Result<Option<&'a dyn Any>> {
        (self.project)(value).ok_or_else(|| Error::mismatch(self.inner.path(), "optional value"))
    }

    /// Wraps a deserialized inner value, `None` meaning absent.
    pub fn wrap(&self, inner: Option<Box<dyn Any>>) -> Result<Box<dyn Any>> {
        (self.wrap)(inner).ok_or_else(|| Error::mismatch(self.inner.path(), "optional value"))
    }
}

// -----------------------------------------------------------------------------
// HandleInfo

/// Access to the shared object behind a handle type.
#[derive(Clone, Copy)]
pub struct HandleInfo {
    target: TypeKey,
    project: fn(&dyn Any) -> Option<&Obj>,
    wrap: fn(Obj) -> Box<dyn Any>,
}

fn project_handle<H: ObjectHandle>(value: &dyn Any) -> Option<&Obj> {
    value.downcast_ref::<H>().map(H::as_obj)
}

fn wrap_handle<H: ObjectHandle>(obj: Obj) -> Box<dyn Any> {
    Box::new(H::from_obj(obj))
}

impl HandleInfo {
    pub fn of<H: ObjectHandle>() -> Self {
        Self {
            target: TypeKey::of::<H::Target>(),
            project: project_handle::<H>,
            wrap: wrap_handle::<H>,
        }
    }

    /// Declared type of the object behind the handle.
    #[inline]
    pub fn target(&self) -> TypeKey {
        self.target
    }

    pub fn project<'a>(&self, value: &'a dyn Any) -> Result<&'a Obj> {
        (self.project)(value).ok_or_else(|| Error::mismatch(self.target.path(), "object handle"))
    }

    /// The caller has checked that `obj` is assignable to [`target`](Self::target).
    #[inline]
    pub fn wrap(&self, obj: Obj) -> Box<dyn Any> {
        (self.wrap)(obj)
    }
}
