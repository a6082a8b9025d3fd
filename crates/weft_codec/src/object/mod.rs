//! Shared objects and the containers the codec understands natively.
//!
//! Class values always live behind an [`Obj`]: a reference-counted,
//! interior-mutable cell tagged with its runtime [`TypeKey`](crate::info::TypeKey).
//! Two handles to the same object serialize as one object plus a reference,
//! which is what lets shared subgraphs and cycles round-trip.
//!
//! [`Ref<T>`] is the typed view over an [`Obj`], [`NdArray<T>`] a
//! rectangular array of any rank.

// -----------------------------------------------------------------------------
// Modules

mod handle;
mod nd_array;
mod obj;

// -----------------------------------------------------------------------------
// Exports

pub use handle::Ref;
pub use nd_array::NdArray;
pub use obj::{Obj, ObjectHandle};
