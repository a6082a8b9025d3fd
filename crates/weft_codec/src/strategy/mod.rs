//! Per-kind serialization strategies.
//!
//! A [`Strategy`] knows how to write and read every type it claims. The
//! [`StrategyProvider`] picks one per type: the type's own marker strategy
//! first, then custom strategies in registration order, then the built-ins
//! [`ValueStrategy`], [`ArrayStrategy`], [`StructStrategy`] and
//! [`ClassStrategy`].
//!
//! A [`MemberStrategy`] is lighter: it only replaces the member traversal of
//! one struct or class, while headers, identity and polymorphism stay with
//! the built-in strategy.

use alloc::boxed::Box;
use core::any::Any;

use crate::info::TypeDescriptor;
use crate::{DeserializationContext, Result, SerializationContext};

// -----------------------------------------------------------------------------
// Modules

mod array;
mod class;
mod provider;
mod structure;
mod value;

// -----------------------------------------------------------------------------
// Exports

pub use array::ArrayStrategy;
pub use class::ClassStrategy;
pub use provider::StrategyProvider;
pub use structure::StructStrategy;
pub use value::ValueStrategy;

// -----------------------------------------------------------------------------
// Strategy

/// Writes and reads all values of the types it claims.
///
/// `declared` is the statically expected type of the node. For class objects
/// the runtime type may differ, see [`ClassStrategy`].
pub trait Strategy: Send + Sync + 'static {
    /// Unique among the strategies of a provider.
    fn name(&self) -> &str;

    fn can_handle(&self, ty: &TypeDescriptor) -> bool;

    /// Writes one node. `value` is `None` for a null.
    fn serialize(
        &self,
        ctx: &mut SerializationContext<'_>,
        name: &str,
        declared: &TypeDescriptor,
        value: Option<&dyn Any>,
    ) -> Result<()>;

    /// Reads one node, `None` for a null.
    fn deserialize(
        &self,
        ctx: &mut DeserializationContext<'_>,
        name: &str,
        declared: &TypeDescriptor,
    ) -> Result<Option<Box<dyn Any>>>;
}

// -----------------------------------------------------------------------------
// MemberStrategy

/// Replaces the member traversal of a single struct or class type.
///
/// The defaults run the standard traversal, so an override can wrap it: write
/// an extra node before the members, or skip one when reading.
///
/// # Examples
///
/// ```
/// use core::any::Any;
/// use weft_codec::info::TypeDescriptor;
/// use weft_codec::strategy::MemberStrategy;
/// use weft_codec::{DeserializationContext, Result, SerializationContext};
///
/// struct Stamped;
///
/// impl MemberStrategy for Stamped {
///     fn serialize_members(
///         &self,
///         ctx: &mut SerializationContext<'_>,
///         ty: &TypeDescriptor,
///         value: &dyn Any,
///     ) -> Result<()> {
///         ctx.write("stamp", &1_u32)?;
///         ctx.serialize_members(ty, value)
///     }
///
///     fn deserialize_members(
///         &self,
///         ctx: &mut DeserializationContext<'_>,
///         ty: &TypeDescriptor,
///         target: &mut dyn Any,
///     ) -> Result<()> {
///         ctx.reader().skip("stamp")?;
///         ctx.deserialize_members(ty, target)
///     }
/// }
/// ```
pub trait MemberStrategy: Send + Sync + 'static {
    fn serialize_members(
        &self,
        ctx: &mut SerializationContext<'_>,
        ty: &TypeDescriptor,
        value: &dyn Any,
    ) -> Result<()> {
        ctx.serialize_members(ty, value)
    }

    fn deserialize_members(
        &self,
        ctx: &mut DeserializationContext<'_>,
        ty: &TypeDescriptor,
        target: &mut dyn Any,
    ) -> Result<()> {
        ctx.deserialize_members(ty, target)
    }
}
