#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Extern Self

// Generated code names this crate `::weft_codec`, including inside its own tests.
extern crate self as weft_codec;

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;
extern crate std;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod serializer;

pub mod context;
pub mod format;
pub mod impls;
pub mod index;
pub mod info;
pub mod object;
pub mod registry;
pub mod strategy;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use context::{DeserializationContext, SerializationContext};
pub use error::{Error, Result};
pub use info::Describe;
pub use serializer::{Serializer, SerializerConfig};

#[cfg(feature = "derive")]
pub use weft_codec_derive as derive;
