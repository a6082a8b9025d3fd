/// Implements [`Describe`](crate::info::Describe) for a trait object.
///
/// The trait object becomes an abstract declared type. Classes opt into it
/// with `#[describe(base = dyn Trait)]`, after which a `Ref<dyn Trait>` may
/// hold any of them. The external name defaults to the Rust type path.
///
/// # Examples
///
/// ```
/// use weft_codec::describe_abstract;
/// use weft_codec::info::{Describe, TypeKind};
///
/// trait Shape {}
/// describe_abstract!(dyn Shape => "Shape");
///
/// let desc = <dyn Shape as Describe>::describe();
/// assert_eq!(desc.name(), "Shape");
/// assert!(matches!(desc.kind(), TypeKind::Abstract));
/// ```
#[macro_export]
macro_rules! describe_abstract {
    ($ty:ty => $name:expr) => {
        impl $crate::info::Describe for $ty {
            fn describe() -> $crate::info::TypeDescriptor {
                $crate::info::TypeDescriptor::abstract_type::<Self>($name)
            }
        }
    };
    ($ty:ty) => {
        $crate::describe_abstract!($ty => ::core::any::type_name::<$ty>());
    };
}
