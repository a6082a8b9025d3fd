//! `FixedHasher` wraps `foldhash` with a constant seed.
//!
//! `NoOpHasher` passes an already well distributed `u64` through unchanged.

use core::hash::{BuildHasher, Hasher};

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHasher

const FIXED_SEED: FixedState = FixedState::with_seed(0x3C6E_F372_FE94_F82B);

/// Hasher produced by [`FixedHashState`].
pub type FixedHasher = FoldHasher<'static>;

/// A [`BuildHasher`] whose output only depends on the hashed input.
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use weft_utils::hash::FixedHashState;
///
/// assert_eq!(FixedHashState.hash_one("weft"), FixedHashState.hash_one("weft"));
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_SEED.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// NoOpHasher

/// Hasher produced by [`NoOpHashState`].
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHasher {
    hash: u64,
}

impl Hasher for NoOpHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        // `TypeId` hashes through `write_u64`, this path only serves odd keys.
        for byte in bytes {
            self.hash = self.hash.rotate_left(8) ^ u64::from(*byte);
        }
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }
}

/// A [`BuildHasher`] for keys that are already hashes, such as `TypeId`.
///
/// # Examples
///
/// ```
/// use core::hash::{BuildHasher, Hasher};
/// use weft_utils::hash::NoOpHashState;
///
/// let mut hasher = NoOpHashState.build_hasher();
/// hasher.write_u64(42);
/// assert_eq!(hasher.finish(), 42);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHashState;

impl BuildHasher for NoOpHashState {
    type Hasher = NoOpHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        NoOpHasher { hash: 0 }
    }
}
