use alloc::format;
use alloc::vec::Vec;

use crate::index::{MultiIndex, flat_offset};
use crate::{Error, Result};

// -----------------------------------------------------------------------------
// NdArray

/// A rectangular array of any rank, stored in row-major order.
///
/// # Examples
///
/// ```
/// use weft_codec::object::NdArray;
///
/// let grid = NdArray::from_fn(vec![2, 3], |c| c[0] * 10 + c[1]);
/// assert_eq!(grid.rank(), 2);
/// assert_eq!(grid.get(&[1, 2]), Some(&12));
/// assert_eq!(grid.as_slice(), &[0, 1, 2, 10, 11, 12]);
///
/// assert!(NdArray::from_vec(vec![2, 2], vec![1, 2, 3]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NdArray<T> {
    bounds: Vec<usize>,
    data: Vec<T>,
}

fn element_count(bounds: &[usize]) -> Option<usize> {
    bounds.iter().try_fold(1usize, |acc, &bound| acc.checked_mul(bound))
}

impl<T> NdArray<T> {
    /// Fails unless `data` holds exactly one element per coordinate.
    pub fn from_vec(bounds: Vec<usize>, data: Vec<T>) -> Result<Self> {
        match element_count(&bounds) {
            Some(count) if count == data.len() => Ok(Self { bounds, data }),
            _ => Err(Error::malformed(format!(
                "{} elements do not fill bounds {bounds:?}",
                data.len()
            ))),
        }
    }

    /// Fills the array by calling `f` once per coordinate, in row-major order.
    pub fn from_fn(bounds: Vec<usize>, mut f: impl FnMut(&[usize]) -> T) -> Self {
        let data = MultiIndex::new(&bounds).map(|coord| f(&coord)).collect();
        Self { bounds, data }
    }

    #[inline]
    pub fn bounds(&self) -> &[usize] {
        &self.bounds
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.bounds.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, coord: &[usize]) -> Option<&T> {
        self.data.get(flat_offset(&self.bounds, coord)?)
    }

    pub fn get_mut(&mut self, coord: &[usize]) -> Option<&mut T> {
        let offset = flat_offset(&self.bounds, coord)?;
        self.data.get_mut(offset)
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::NdArray;
    use alloc::vec;

    #[test]
    fn zero_bounds_hold_nothing() {
        let empty = NdArray::<u8>::from_vec(vec![3, 0], vec![]).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.get(&[0, 0]), None);
        assert_eq!(empty.bounds(), &[3, 0]);
    }

    #[test]
    fn get_mut_writes_in_place() {
        let mut cube = NdArray::from_fn(vec![2, 2, 2], |_| 0u8);
        *cube.get_mut(&[1, 0, 1]).unwrap() = 9;
        assert_eq!(cube.as_slice()[5], 9);
    }
}
