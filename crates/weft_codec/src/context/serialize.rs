use alloc::format;
use core::any::Any;

use crate::context::{Tables, WriteRegister};
use crate::format::FormatWriter;
use crate::info::{Describe, TypeDescriptor, TypeKey, TypeKind};
use crate::object::Obj;
use crate::registry::{TypeNameResolver, TypeRegistry, ValueConverters};
use crate::strategy::{ClassStrategy, Strategy, StrategyProvider};
use crate::{Error, Result};

// -----------------------------------------------------------------------------
// SerializationContext

/// State of one serialize call.
///
/// Every value is written against a declared [`TypeKey`]: wrappers
/// (`Option<T>`, object handles) are unwrapped here, then the strategy of the
/// remaining type writes the node.
pub struct SerializationContext<'a> {
    writer: &'a mut dyn FormatWriter,
    tables: Tables<'a>,
    register: WriteRegister,
    data_version: i32,
    depth: usize,
    max_depth: usize,
}

impl<'a> SerializationContext<'a> {
    pub(crate) fn new(
        writer: &'a mut dyn FormatWriter,
        tables: Tables<'a>,
        data_version: i32,
        max_depth: usize,
    ) -> Self {
        Self {
            writer,
            tables,
            register: WriteRegister::default(),
            data_version,
            depth: 0,
            max_depth,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors

    #[inline]
    pub fn writer(&mut self) -> &mut dyn FormatWriter {
        &mut *self.writer
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

    /// The data version written at the start of the stream.
    #[inline]
    pub fn data_version(&self) -> i32 {
        self.data_version
    }

    /// Current nesting depth, 0 outside any node.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    // -------------------------------------------------------------------------
    // Object register

    /// The id `obj` was written under, if it was written already.
    #[inline]
    pub fn object_id(&self, obj: &Obj) -> Option<u32> {
        self.register.lookup(obj)
    }

    /// Gives `obj` the next object id.
    pub fn register_object(&mut self, obj: &Obj) -> Result<u32> {
        match self.register.lookup(obj) {
            Some(id) => Err(Error::DuplicateRegistration(format!("object {id}"))),
            None => self.register.insert(obj),
        }
    }

    /// Number of distinct objects written so far.
    #[inline]
    pub fn object_count(&self) -> usize {
        self.register.len()
    }

    // -------------------------------------------------------------------------
    // Dispatch

    /// Writes `value` as node `name` with declared type `T`.
    pub fn write<T: Describe>(&mut self, name: &str, value: &T) -> Result<&mut Self> {
        self.serialize_value(name, TypeKey::of::<T>(), value)?;
        Ok(self)
    }

    /// Writes `value` as node `name` with declared type `declared`.
    #[inline]
    pub fn serialize_value(&mut self, name: &str, declared: TypeKey, value: &dyn Any) -> Result<()> {
        self.serialize_optional(name, declared, Some(value))
    }

    /// As [`serialize_value`](Self::serialize_value), `None` writing a null.
    pub fn serialize_optional(
        &mut self,
        name: &str,
        declared: TypeKey,
        value: Option<&dyn Any>,
    ) -> Result<()> {
        let desc = self.registry().describe(declared)?;
        match desc.kind() {
            TypeKind::Nullable(info) => {
                let inner = match value {
                    Some(value) => info.project(value)?,
                    None => None,
                };
                self.serialize_optional(name, info.inner(), inner)
            }
            TypeKind::Handle(info) => {
                let obj = value.map(|value| info.project(value)).transpose()?;
                let obj = obj.map(|obj| obj as &dyn Any);
                let target = self.registry().describe(info.target())?;
                if target.is_list() {
                    // A list behind a handle is a shared object.
                    return self.node(name, &target, obj, &ClassStrategy);
                }
                self.serialize_optional(name, info.target(), obj)
            }
            _ => {
                let strategy = self.provider().resolve(&desc)?;
                self.node(name, &desc, value, &*strategy)
            }
        }
    }

    // Wrappers do not count, only nodes handed to a strategy.
    fn node(
        &mut self,
        name: &str,
        desc: &TypeDescriptor,
        value: Option<&dyn Any>,
        strategy: &dyn Strategy,
    ) -> Result<()> {
        if self.depth >= self.max_depth {
            return Err(Error::DepthLimitExceeded { limit: self.max_depth });
        }
        self.depth += 1;
        let result = strategy.serialize(self, name, desc, value);
        self.depth -= 1;
        result
    }

    // -------------------------------------------------------------------------
    // Members

    /// Writes the body of a struct or class. The first of its hook, its own
    /// member strategy and the provider's override for it runs, otherwise the
    /// default member traversal.
    pub fn serialize_body(&mut self, ty: &TypeDescriptor, value: &dyn Any) -> Result<()> {
        if let Some(result) = ty.hooks().serialize(value, self) {
            return result;
        }
        if let Some(member) = ty.member_strategy() {
            return member.serialize_members(self, ty, value);
        }
        if let Some(member) = self.provider().member_override(ty.id()) {
            return member.serialize_members(self, ty, value);
        }
        self.serialize_members(ty, value)
    }

    /// The default traversal: every serializable member in order.
    pub fn serialize_members(&mut self, ty: &TypeDescriptor, value: &dyn Any) -> Result<()> {
        for member in ty.members().iter().filter(|member| member.is_serializable()) {
            let (Some(declared), Some(field)) = (member.ty(), member.get(value)) else {
                return Err(Error::mismatch(ty.type_path(), "member owner"));
            };
            self.serialize_value(member.name(), declared, field)?;
        }
        Ok(())
    }
}
