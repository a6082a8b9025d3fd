//! [`Describe`](crate::info::Describe) implementations for foreign types.
//!
//! ## Implemented Menu
//!
//! - values: `bool`, `char`, `i8`-`i64`, `isize`, `u8`-`u64`, `usize`, `f32`, `f64`, `String`
//! - nullable: `Option<T>`
//! - arrays: `Vec<T>`, `[T; N]`, [`NdArray<T>`](crate::object::NdArray)
//! - handles: [`Obj`](crate::object::Obj), [`Ref<T>`](crate::object::Ref)
//! - abstract: `dyn Any`, plus trait objects through [`describe_abstract!`](crate::describe_abstract)
//!
//! Integers wider than their wire form (`isize`, `usize`) are written as
//! 64-bit values.

// -----------------------------------------------------------------------------
// Modules

mod abstracts;
mod arrays;
mod handles;
mod primitives;
