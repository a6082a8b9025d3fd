//! Type descriptors, external names and value converters.
//!
//! The [`TypeRegistry`] is the central store: it caches one
//! [`TypeDescriptor`](crate::info::TypeDescriptor) per type and maps external
//! type names back to types when reading polymorphic objects. Both tables can
//! be replaced at the seams through [`TypeNameResolver`] and
//! [`ValueConverter`].

// -----------------------------------------------------------------------------
// Modules

mod converter;
mod names;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

pub use converter::{TextConverter, ValueConverter, ValueConverters};
pub use names::{TypeNameResolver, TypePathResolver};
pub use type_registry::TypeRegistry;
