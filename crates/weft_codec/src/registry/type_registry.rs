use alloc::collections::VecDeque;
use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;
use std::sync::{PoisonError, RwLock};

use log::trace;
use weft_utils::TypeIdMap;
use weft_utils::hash::{FixedHashState, HashMap, HashSet};

use crate::info::{Describe, TypeDescriptor, TypeKey};
use crate::{Error, Result};

// -----------------------------------------------------------------------------
// TypeRegistry

/// The store of type descriptors and external type names.
///
/// Descriptors are built lazily on first use and cached behind a lock, so a
/// registry shared between threads through an `Arc` can describe new types
/// concurrently. A descriptor that fails validation is never cached.
///
/// Registration is only needed for types that are read back by name, that is
/// the runtime types of class objects. Registering a type also registers the
/// types it refers to.
///
/// # Example
///
/// ```
/// use weft_codec::info::TypeKey;
/// use weft_codec::registry::TypeRegistry;
///
/// let mut registry = TypeRegistry::new();
/// assert_eq!(registry.get_with_name("int32"), Some(TypeKey::of::<i32>()));
///
/// registry.register::<Vec<Option<String>>>().unwrap();
/// assert!(registry.contains_type::<Option<String>>());
///
/// registry.register_alias::<Vec<Option<String>>>("names").unwrap();
/// assert!(registry.register_alias::<Vec<u8>>("names").is_err());
/// ```
pub struct TypeRegistry {
    cache: RwLock<TypeIdMap<Arc<TypeDescriptor>>>,
    registered: TypeIdMap<TypeKey>,
    name_to_type: HashMap<&'static str, TypeKey>,
    type_to_name: TypeIdMap<&'static str>,
    path_to_type: HashMap<&'static str, TypeKey>,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates a registry without any registered type.
    pub const fn empty() -> Self {
        Self {
            cache: RwLock::new(TypeIdMap::new()),
            registered: TypeIdMap::new(),
            name_to_type: HashMap::with_hasher(FixedHashState),
            type_to_name: TypeIdMap::new(),
            path_to_type: HashMap::with_hasher(FixedHashState),
        }
    }

    /// Creates a registry with the primitives registered under their stable names.
    ///
    /// - `boolean` `char` `string`
    /// - `sbyte` `int16` `int32` `int64` `isize`
    /// - `byte` `uint16` `uint32` `uint64` `usize`
    /// - `single` `double`
    pub fn new() -> Self {
        let mut registry = Self::empty();
        let primitives = [
            TypeKey::of::<bool>(),
            TypeKey::of::<char>(),
            TypeKey::of::<alloc::string::String>(),
            TypeKey::of::<i8>(),
            TypeKey::of::<i16>(),
            TypeKey::of::<i32>(),
            TypeKey::of::<i64>(),
            TypeKey::of::<isize>(),
            TypeKey::of::<u8>(),
            TypeKey::of::<u16>(),
            TypeKey::of::<u32>(),
            TypeKey::of::<u64>(),
            TypeKey::of::<usize>(),
            TypeKey::of::<f32>(),
            TypeKey::of::<f64>(),
        ];
        for key in primitives {
            // Distinct names, nothing to check.
            let name = key.describe().name();
            registry.index(key, name);
            registry.name_to_type.insert(name, key);
        }
        registry
    }

    // -------------------------------------------------------------------------
    // Descriptors

    /// The cached descriptor of `key`, built on first use.
    pub fn describe(&self, key: TypeKey) -> Result<Arc<TypeDescriptor>> {
        let cached = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key.id())
            .cloned();
        if let Some(desc) = cached {
            return Ok(desc);
        }

        let desc = key.describe();
        desc.validate(key)?;
        trace!("described `{}` as {:?} `{}`", key.path(), desc.kind(), desc.name());

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.get_or_insert(key.id(), || Arc::new(desc)).clone())
    }

    #[inline]
    pub fn describe_type<T: ?Sized + Describe>(&self) -> Result<Arc<TypeDescriptor>> {
        self.describe(TypeKey::of::<T>())
    }

    // -------------------------------------------------------------------------
    // Registration

    fn index(&mut self, key: TypeKey, name: &'static str) {
        self.registered.insert(key.id(), key);
        self.path_to_type.insert(key.path(), key);
        self.type_to_name.try_insert(key.id(), || name);
    }

    fn check_name(&self, name: &'static str, key: TypeKey) -> Result<()> {
        match self.name_to_type.get(name) {
            Some(bound) if *bound != key => Err(Error::DuplicateRegistration(name.to_string())),
            _ => Ok(()),
        }
    }

    /// Registers `T` and every type it refers to.
    ///
    /// Registering a type again is a no-op. Fails if a type's external name
    /// is already bound to another type, in which case nothing is registered.
    #[inline]
    pub fn register<T: ?Sized + Describe>(&mut self) -> Result<()> {
        self.register_key(TypeKey::of::<T>())
    }

    /// See [`register`](Self::register).
    pub fn register_key(&mut self, key: TypeKey) -> Result<()> {
        // Names are checked for the whole dependency closure before any of it
        // is indexed.
        let mut staged: Vec<(TypeKey, &'static str)> = Vec::new();
        let mut staged_ids: HashSet<TypeId> = HashSet::default();
        let mut staged_names: HashMap<&'static str, TypeKey> = HashMap::default();
        let mut pending = vec![key];
        while let Some(key) = pending.pop() {
            if self.registered.contains(&key.id()) || !staged_ids.insert(key.id()) {
                continue;
            }
            let desc = self.describe(key)?;
            let name = desc.name();
            self.check_name(name, key)?;
            if staged_names.insert(name, key).is_some() {
                return Err(Error::DuplicateRegistration(name.to_string()));
            }
            staged.push((key, name));

            pending.extend(
                desc.dependencies()
                    .into_iter()
                    .filter(|dep| !self.registered.contains(&dep.id())),
            );
        }

        for (key, name) in staged {
            self.name_to_type.entry(name).or_insert(key);
            self.index(key, name);
            trace!("registered `{}` as `{name}`", key.path());
        }
        Ok(())
    }

    /// Registers `T` and makes `alias` the name written for it.
    ///
    /// The type's own name still resolves. An alias already bound to another
    /// type is rejected.
    pub fn register_alias<T: ?Sized + Describe>(&mut self, alias: &'static str) -> Result<()> {
        let key = TypeKey::of::<T>();
        self.check_name(alias, key)?;
        self.register_key(key)?;
        self.name_to_type.insert(alias, key);
        self.type_to_name.insert(key.id(), alias);
        trace!("aliased `{}` as `{alias}`", key.path());
        Ok(())
    }

    /// Registers every type marked `#[describe(auto_register)]`.
    ///
    /// Returns how many of them were new. Always `Ok(0)` without the
    /// `auto_register` feature.
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> Result<usize> {
        #[cfg(feature = "auto_register")]
        let count = self.register_collected()?;
        #[cfg(not(feature = "auto_register"))]
        let count = 0;
        Ok(count)
    }

    #[cfg(feature = "auto_register")]
    fn register_collected(&mut self) -> Result<usize> {
        use crate::__macro_exports::auto_register::{AutoRegistration, inventory};

        let mut count = 0;
        for entry in inventory::iter::<AutoRegistration> {
            let key = entry.key();
            if !self.registered.contains(&key.id()) {
                self.register_key(key)?;
                count += 1;
            }
        }
        trace!("auto registered {count} types");
        Ok(count)
    }

    // -------------------------------------------------------------------------
    // Lookups

    /// The type bound to an external name or alias.
    #[inline]
    pub fn get_with_name(&self, name: &str) -> Option<TypeKey> {
        self.name_to_type.get(name).copied()
    }

    /// The registered type with the given Rust type path.
    #[inline]
    pub fn get_with_type_path(&self, path: &str) -> Option<TypeKey> {
        self.path_to_type.get(path).copied()
    }

    /// The name written for a registered type, its alias if it has one.
    #[inline]
    pub fn name_of(&self, type_id: TypeId) -> Option<&'static str> {
        self.type_to_name.get(&type_id).copied()
    }

    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.registered.contains(&type_id)
    }

    #[inline]
    pub fn contains_type<T: ?Sized + 'static>(&self) -> bool {
        self.registered.contains_type::<T>()
    }

    /// Number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.registered.values().copied()
    }

    // -------------------------------------------------------------------------
    // Assignability

    /// Whether a value of type `runtime` may stand where `declared` is expected.
    ///
    /// True for the same type, for a declared `dyn Any`, and for any type
    /// reachable from `runtime` through class base lists.
    pub fn is_assignable(&self, runtime: TypeKey, declared: TypeKey) -> Result<bool> {
        if runtime == declared || declared.is::<dyn Any>() {
            return Ok(true);
        }
        let mut seen: HashSet<TypeId> = HashSet::default();
        let mut queue = VecDeque::from([runtime]);
        while let Some(key) = queue.pop_front() {
            for base in self.describe(key)?.bases() {
                if *base == declared {
                    return Ok(true);
                }
                if seen.insert(base.id()) {
                    queue.push_back(*base);
                }
            }
        }
        Ok(false)
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("registered", &self.registered.len())
            .field("names", &self.name_to_type.len())
            .finish()
    }
}
