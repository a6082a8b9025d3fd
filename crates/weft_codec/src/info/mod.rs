//! Static descriptions of serializable types.
//!
//! A [`TypeDescriptor`] is built once per type from its [`Describe`]
//! implementation and cached by the [`TypeRegistry`](crate::registry::TypeRegistry).
//! It names the type, classifies it with a [`TypeKind`], and for aggregates
//! lists its [`MemberDescriptor`]s in serialization order.

// -----------------------------------------------------------------------------
// Modules

mod descriptor;
mod hooks;
mod key;
mod kinds;
mod member;

// -----------------------------------------------------------------------------
// Exports

pub use descriptor::{TypeDescriptor, TypeKind};
pub use hooks::Hooks;
pub use key::{Describe, TypeKey};
pub use kinds::{
    ArrayInfo, ArrayLike, ClassInfo, HandleInfo, ListOps, NullableInfo, StructInfo, ValueInfo,
};
pub use member::{MemberAccess, MemberDescriptor};
