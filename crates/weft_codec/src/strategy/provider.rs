use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;
use std::sync::{PoisonError, RwLock};

use log::trace;
use weft_utils::TypeIdMap;

use crate::info::{Describe, TypeDescriptor, TypeKind};
use crate::strategy::{
    ArrayStrategy, ClassStrategy, MemberStrategy, Strategy, StructStrategy, ValueStrategy,
};
use crate::{Error, Result};

// Index of `ClassStrategy` in `StrategyProvider::builtin`, always last.
const CLASS: usize = 3;

// -----------------------------------------------------------------------------
// StrategyProvider

/// Picks the strategy for each type and holds per-type member overrides.
///
/// Resolution order is the type's marker strategy, then custom strategies in
/// registration order, then value, array, struct and class. Class and
/// abstract types always resolve to the class strategy, so an object is
/// written the same way whichever type it is declared as. Hits are memoized
/// per type. A miss is never cached and fails with
/// [`Error::UnsupportedType`].
pub struct StrategyProvider {
    custom: Vec<Arc<dyn Strategy>>,
    builtin: [Arc<dyn Strategy>; 4],
    overrides: TypeIdMap<Arc<dyn MemberStrategy>>,
    memo: RwLock<TypeIdMap<Arc<dyn Strategy>>>,
}

impl Default for StrategyProvider {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyProvider {
    pub fn new() -> Self {
        Self {
            custom: Vec::new(),
            builtin: [
                Arc::new(ValueStrategy),
                Arc::new(ArrayStrategy),
                Arc::new(StructStrategy),
                Arc::new(ClassStrategy),
            ],
            overrides: TypeIdMap::new(),
            memo: RwLock::new(TypeIdMap::new()),
        }
    }

    /// Adds a strategy ahead of the built-ins.
    ///
    /// Fails if a strategy with the same name is already present.
    pub fn add_strategy(&mut self, strategy: impl Strategy) -> Result<&mut Self> {
        if self.strategies().any(|known| known.name() == strategy.name()) {
            return Err(Error::DuplicateRegistration(strategy.name().to_string()));
        }
        trace!("added strategy `{}`", strategy.name());
        self.custom.push(Arc::new(strategy));
        self.memo.get_mut().unwrap_or_else(PoisonError::into_inner).clear();
        Ok(self)
    }

    /// Replaces the member traversal of `T`. One override per type.
    pub fn add_override<T: Describe>(&mut self, member: impl MemberStrategy) -> Result<&mut Self> {
        let member: Arc<dyn MemberStrategy> = Arc::new(member);
        if !self.overrides.try_insert(TypeId::of::<T>(), || member) {
            return Err(Error::DuplicateRegistration(
                core::any::type_name::<T>().to_string(),
            ));
        }
        Ok(self)
    }

    #[inline]
    pub fn member_override(&self, type_id: TypeId) -> Option<&dyn MemberStrategy> {
        self.overrides.get(&type_id).map(|member| &**member)
    }

    /// Custom strategies in registration order, then the built-ins.
    pub fn strategies(&self) -> impl Iterator<Item = &dyn Strategy> {
        self.custom
            .iter()
            .chain(self.builtin.iter())
            .map(|strategy| &**strategy)
    }

    /// The strategy for `ty`.
    pub fn resolve(&self, ty: &TypeDescriptor) -> Result<Arc<dyn Strategy>> {
        let memoized = self
            .memo
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&ty.id())
            .cloned();
        if let Some(strategy) = memoized {
            return Ok(strategy);
        }

        let strategy = match ty.strategy_marker() {
            _ if matches!(ty.kind(), TypeKind::Class(_) | TypeKind::Abstract) => {
                self.builtin[CLASS].clone()
            }
            Some(make) => make(),
            None => self
                .custom
                .iter()
                .chain(self.builtin.iter())
                .find(|strategy| strategy.can_handle(ty))
                .cloned()
                .ok_or(Error::UnsupportedType { type_path: ty.type_path() })?,
        };
        trace!("resolved `{}` to strategy `{}`", ty.type_path(), strategy.name());

        let mut memo = self.memo.write().unwrap_or_else(PoisonError::into_inner);
        Ok(memo.get_or_insert(ty.id(), || strategy).clone())
    }
}

impl fmt::Debug for StrategyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyProvider")
            .field("strategies", &self.strategies().map(|s| s.name()).collect::<Vec<_>>())
            .field("overrides", &self.overrides.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::vec::Vec;
    use core::any::Any;

    use weft_codec_derive::Describe;

    use super::StrategyProvider;
    use crate::info::{Describe, TypeDescriptor};
    use crate::strategy::{ArrayStrategy, MemberStrategy, Strategy, ValueStrategy};
    use crate::{DeserializationContext, Error, Result, SerializationContext};

    struct Unclaimed;

    impl Describe for Unclaimed {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::opaque::<Self>("unclaimed").with_strategy::<ArrayStrategy>()
        }
    }

    #[derive(Describe, Default)]
    #[describe(class)]
    struct Shared {
        value: u8,
    }

    struct Nothing;

    impl MemberStrategy for Nothing {}

    /// Claims every type.
    struct Greedy;

    impl Strategy for Greedy {
        fn name(&self) -> &str {
            "greedy"
        }

        fn can_handle(&self, _: &TypeDescriptor) -> bool {
            true
        }

        fn serialize(
            &self,
            _: &mut SerializationContext<'_>,
            _: &str,
            _: &TypeDescriptor,
            _: Option<&dyn Any>,
        ) -> Result<()> {
            Ok(())
        }

        fn deserialize(
            &self,
            _: &mut DeserializationContext<'_>,
            _: &str,
            _: &TypeDescriptor,
        ) -> Result<Option<Box<dyn Any>>> {
            Ok(None)
        }
    }

    #[test]
    fn builtins_in_order() {
        let provider = StrategyProvider::new();
        let names: Vec<&str> = provider.strategies().map(|s| s.name()).collect();
        assert_eq!(names, ["value", "array", "struct", "class"]);

        let desc = <Vec<u8>>::describe();
        assert_eq!(provider.resolve(&desc).unwrap().name(), "array");
    }

    #[test]
    fn marker_wins() {
        let provider = StrategyProvider::new();
        let desc = Unclaimed::describe();
        assert_eq!(provider.resolve(&desc).unwrap().name(), "array");
    }

    #[test]
    fn object_types_stay_with_the_class_strategy() {
        let mut provider = StrategyProvider::new();
        provider.add_strategy(Greedy).unwrap();
        assert_eq!(provider.resolve(&u8::describe()).unwrap().name(), "greedy");
        assert_eq!(provider.resolve(&Shared::describe()).unwrap().name(), "class");
        assert_eq!(provider.resolve(&<dyn Any>::describe()).unwrap().name(), "class");
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut provider = StrategyProvider::new();
        let err = provider.add_strategy(ValueStrategy).unwrap_err();
        assert_eq!(err, Error::DuplicateRegistration("value".into()));

        provider.add_override::<u8>(Nothing).unwrap();
        assert!(provider.add_override::<u8>(Nothing).is_err());
        assert!(provider.member_override(core::any::TypeId::of::<u8>()).is_some());
    }
}
