use core::any::{Any, type_name};

use crate::info::{Describe, HandleInfo, NullableInfo, TypeDescriptor, TypeKind};
use crate::object::{Obj, Ref};

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(type_name::<Self>(), TypeKind::Nullable(NullableInfo::of::<T>()))
    }
}

impl Describe for Obj {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new::<Self>("Obj", TypeKind::Handle(HandleInfo::of::<Self>()))
    }
}

impl<T: ?Sized + Describe> Describe for Ref<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(type_name::<Self>(), TypeKind::Handle(HandleInfo::of::<Self>()))
    }
}

impl Describe for dyn Any {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::abstract_type::<Self>("object")
    }
}
