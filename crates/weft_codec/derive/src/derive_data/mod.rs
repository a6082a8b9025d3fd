//! Provide some tools for parsing token stream.

// -----------------------------------------------------------------------------
// Modules

mod describe_meta;
mod field_attributes;
mod type_attributes;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use describe_meta::{DescribeData, DescribeMeta, EnumVariant, StructField};
pub(crate) use field_attributes::FieldAttributes;
pub(crate) use type_attributes::TypeAttributes;
