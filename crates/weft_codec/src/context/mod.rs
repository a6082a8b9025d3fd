//! Per-operation state of a serialize or deserialize call.
//!
//! A context owns the object register of one stream and the recursion depth
//! counter, borrows the backend and the shared tables, and dispatches every
//! node to its strategy. Strategies, hooks and member overrides receive the
//! context and call back into it for nested values.

use crate::registry::{TypeNameResolver, TypeRegistry, ValueConverters};
use crate::strategy::StrategyProvider;

// -----------------------------------------------------------------------------
// Modules

mod deserialize;
mod register;
mod serialize;

// -----------------------------------------------------------------------------
// Exports

pub use deserialize::DeserializationContext;
pub use serialize::SerializationContext;

pub(crate) use register::{ReadRegister, WriteRegister};

/// The shared tables a context reads from.
#[derive(Clone, Copy)]
pub(crate) struct Tables<'a> {
    pub registry: &'a TypeRegistry,
    pub provider: &'a StrategyProvider,
    pub converters: &'a ValueConverters,
    pub names: &'a dyn TypeNameResolver,
}
