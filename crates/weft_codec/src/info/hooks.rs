use alloc::sync::Arc;
use core::any::{Any, type_name};
use core::fmt;

use crate::{DeserializationContext, Error, Result, SerializationContext};

// -----------------------------------------------------------------------------
// Erased hooks

trait SerializeHook: Send + Sync {
    fn call(&self, value: &dyn Any, ctx: &mut SerializationContext<'_>) -> Result<()>;
}

trait DeserializeHook: Send + Sync {
    fn call(&self, target: &mut dyn Any, ctx: &mut DeserializationContext<'_>) -> Result<()>;
}

struct SerializeWith<S>(fn(&S, &mut SerializationContext<'_>) -> Result<()>);

struct DeserializeWith<S>(fn(&mut S, &mut DeserializationContext<'_>) -> Result<()>);

impl<S: Any> SerializeHook for SerializeWith<S> {
    fn call(&self, value: &dyn Any, ctx: &mut SerializationContext<'_>) -> Result<()> {
        let value = value
            .downcast_ref::<S>()
            .ok_or_else(|| Error::mismatch(type_name::<S>(), "hook receiver"))?;
        (self.0)(value, ctx)
    }
}

impl<S: Any> DeserializeHook for DeserializeWith<S> {
    fn call(&self, target: &mut dyn Any, ctx: &mut DeserializationContext<'_>) -> Result<()> {
        let target = target
            .downcast_mut::<S>()
            .ok_or_else(|| Error::mismatch(type_name::<S>(), "hook receiver"))?;
        (self.0)(target, ctx)
    }
}

// -----------------------------------------------------------------------------
// Hooks

/// Optional whole-object serialize and deserialize functions of a type.
///
/// A hook replaces the member-by-member traversal of a struct or class.
/// Identity tracking and polymorphism still apply around it.
#[derive(Default, Clone)]
pub struct Hooks {
    serialize: Option<Arc<dyn SerializeHook>>,
    deserialize: Option<Arc<dyn DeserializeHook>>,
}

impl Hooks {
    pub(crate) fn set_serialize<S: Any>(
        &mut self,
        hook: fn(&S, &mut SerializationContext<'_>) -> Result<()>,
    ) {
        self.serialize = Some(Arc::new(SerializeWith(hook)));
    }

    pub(crate) fn set_deserialize<S: Any>(
        &mut self,
        hook: fn(&mut S, &mut DeserializationContext<'_>) -> Result<()>,
    ) {
        self.deserialize = Some(Arc::new(DeserializeWith(hook)));
    }

    #[inline]
    pub fn has_serialize(&self) -> bool {
        self.serialize.is_some()
    }

    #[inline]
    pub fn has_deserialize(&self) -> bool {
        self.deserialize.is_some()
    }

    /// Runs the serialize hook, `None` if there is none.
    pub fn serialize(
        &self,
        value: &dyn Any,
        ctx: &mut SerializationContext<'_>,
    ) -> Option<Result<()>> {
        self.serialize.as_ref().map(|hook| hook.call(value, ctx))
    }

    /// Runs the deserialize hook, `None` if there is none.
    pub fn deserialize(
        &self,
        target: &mut dyn Any,
        ctx: &mut DeserializationContext<'_>,
    ) -> Option<Result<()>> {
        self.deserialize.as_ref().map(|hook| hook.call(target, ctx))
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("serialize", &self.has_serialize())
            .field("deserialize", &self.has_deserialize())
            .finish()
    }
}
