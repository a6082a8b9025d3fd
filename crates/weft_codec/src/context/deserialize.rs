use alloc::boxed::Box;
use alloc::format;
use core::any::{Any, type_name};

use crate::context::{ReadRegister, Tables};
use crate::format::FormatReader;
use crate::info::{Describe, TypeDescriptor, TypeKey, TypeKind};
use crate::object::Obj;
use crate::registry::{TypeNameResolver, TypeRegistry, ValueConverters};
use crate::strategy::{ClassStrategy, Strategy, StrategyProvider};
use crate::{Error, Result};

// -----------------------------------------------------------------------------
// DeserializationContext

/// State of one deserialize call, mirroring
/// [`SerializationContext`](crate::SerializationContext).
///
/// Values come back boxed as their declared type.
pub struct DeserializationContext<'a> {
    reader: &'a mut dyn FormatReader,
    tables: Tables<'a>,
    register: ReadRegister,
    data_version: i32,
    depth: usize,
    max_depth: usize,
}

impl<'a> DeserializationContext<'a> {
    pub(crate) fn new(reader: &'a mut dyn FormatReader, tables: Tables<'a>, max_depth: usize) -> Self {
        let data_version = reader.version();
        Self {
            reader,
            tables,
            register: ReadRegister::default(),
            data_version,
            depth: 0,
            max_depth,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors

    #[inline]
    pub fn reader(&mut self) -> &mut dyn FormatReader {
        &mut *self.reader
    }

    #[inline]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.tables.registry
    }

    #[inline]
    pub fn provider(&self) -> &'a StrategyProvider {
        self.tables.provider
    }

    #[inline]
    pub fn converters(&self) -> &'a ValueConverters {
        self.tables.converters
    }

    #[inline]
    pub fn names(&self) -> &'a dyn TypeNameResolver {
        self.tables.names
    }

    /// The data version found at the start of the stream.
    #[inline]
    pub fn data_version(&self) -> i32 {
        self.data_version
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    // -------------------------------------------------------------------------
    // Object register

    /// Records `obj` as object `id`. Ids must arrive in sequence.
    #[inline]
    pub fn register_object(&mut self, id: u32, obj: Obj) -> Result<()> {
        self.register.insert(id, obj)
    }

    /// A new handle to object `id`, read earlier in this stream.
    #[inline]
    pub fn object(&self, id: u32) -> Result<Obj> {
        self.register.get(id).cloned()
    }

    #[inline]
    pub fn object_count(&self) -> usize {
        self.register.len()
    }

    // -------------------------------------------------------------------------
    // Dispatch

    /// Reads node `name` as a `T`.
    pub fn read<T: Describe>(&mut self, name: &str) -> Result<T> {
        let value = self.deserialize_value(name, TypeKey::of::<T>())?;
        value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| Error::mismatch(type_name::<T>(), "deserialized value"))
    }

    /// Reads node `name` with declared type `declared`. A null is an error.
    pub fn deserialize_value(&mut self, name: &str, declared: TypeKey) -> Result<Box<dyn Any>> {
        self.deserialize_optional(name, declared)?
            .ok_or_else(|| Error::malformed(format!("unexpected null for `{name}`")))
    }

    /// Reads node `name` with declared type `declared`, `None` for a null.
    pub fn deserialize_optional(
        &mut self,
        name: &str,
        declared: TypeKey,
    ) -> Result<Option<Box<dyn Any>>> {
        let desc = self.registry().describe(declared)?;
        match desc.kind() {
            TypeKind::Nullable(info) => {
                let inner = self.deserialize_optional(name, info.inner())?;
                info.wrap(inner).map(Some)
            }
            TypeKind::Handle(info) => {
                let target = self.registry().describe(info.target())?;
                let value = if target.is_list() {
                    self.node(name, &target, &ClassStrategy)?
                } else {
                    self.deserialize_optional(name, info.target())?
                };
                let Some(value) = value else {
                    return Ok(None);
                };
                let obj = value
                    .downcast::<Obj>()
                    .map_err(|_| Error::mismatch("object handle", desc.type_path()))?;
                Ok(Some(info.wrap(*obj)))
            }
            _ => {
                let strategy = self.provider().resolve(&desc)?;
                self.node(name, &desc, &*strategy)
            }
        }
    }

    fn node(
        &mut self,
        name: &str,
        desc: &TypeDescriptor,
        strategy: &dyn Strategy,
    ) -> Result<Option<Box<dyn Any>>> {
        if self.depth >= self.max_depth {
            return Err(Error::DepthLimitExceeded { limit: self.max_depth });
        }
        self.depth += 1;
        let result = strategy.deserialize(self, name, desc);
        self.depth -= 1;
        result
    }

    // -------------------------------------------------------------------------
    // Members

    /// Populates the body of a struct or class, choosing as
    /// [`SerializationContext::serialize_body`](crate::SerializationContext::serialize_body)
    /// does.
    pub fn deserialize_body(&mut self, ty: &TypeDescriptor, target: &mut dyn Any) -> Result<()> {
        if let Some(result) = ty.hooks().deserialize(target, self) {
            return result;
        }
        if let Some(member) = ty.member_strategy() {
            return member.deserialize_members(self, ty, target);
        }
        if let Some(member) = self.provider().member_override(ty.id()) {
            return member.deserialize_members(self, ty, target);
        }
        self.deserialize_members(ty, target)
    }

    /// The default traversal: every serializable member in order.
    pub fn deserialize_members(&mut self, ty: &TypeDescriptor, target: &mut dyn Any) -> Result<()> {
        for member in ty.members().iter().filter(|member| member.is_serializable()) {
            let Some(declared) = member.ty() else {
                continue;
            };
            let value = self.deserialize_value(member.name(), declared)?;
            member.set(target, value)?;
        }
        Ok(())
    }
}
