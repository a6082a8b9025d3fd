//! Row-major enumeration of array coordinates.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

// -----------------------------------------------------------------------------
// MultiIndex

/// Iterates every coordinate of an array with the given per-dimension bounds.
///
/// Order is row-major: the rightmost index varies fastest and carries into
/// the index on its left when it overflows. A zero bound in any dimension
/// yields nothing, rank zero yields one empty coordinate.
///
/// # Examples
///
/// ```
/// use weft_codec::index::MultiIndex;
///
/// let coords: Vec<Vec<usize>> = MultiIndex::new(&[2, 2]).collect();
/// assert_eq!(coords, [[0, 0], [0, 1], [1, 0], [1, 1]]);
///
/// assert_eq!(MultiIndex::new(&[3, 0]).count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MultiIndex {
    bounds: Vec<usize>,
    current: Vec<usize>,
    exhausted: bool,
}

impl MultiIndex {
    pub fn new(bounds: &[usize]) -> Self {
        Self {
            bounds: bounds.to_vec(),
            current: vec![0; bounds.len()],
            exhausted: bounds.contains(&0),
        }
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.bounds.len()
    }

    #[inline]
    pub fn bounds(&self) -> &[usize] {
        &self.bounds
    }

    /// Total number of coordinates, the product of the bounds.
    ///
    /// Saturates at `usize::MAX`.
    #[inline]
    pub fn len(&self) -> usize {
        self.bounds.iter().fold(1usize, |acc, &bound| acc.saturating_mul(bound))
    }

    // Returns `false` once every index has wrapped.
    fn advance(&mut self) -> bool {
        for dim in (0..self.current.len()).rev() {
            self.current[dim] += 1;
            if self.current[dim] < self.bounds[dim] {
                return true;
            }
            self.current[dim] = 0;
        }
        false
    }
}

impl Iterator for MultiIndex {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let coord = self.current.clone();
        self.exhausted = !self.advance();
        Some(coord)
    }
}

/// Row-major offset of `coord` inside `bounds`, `None` when out of range.
pub fn flat_offset(bounds: &[usize], coord: &[usize]) -> Option<usize> {
    if bounds.len() != coord.len() {
        return None;
    }
    let mut offset = 0usize;
    for (&index, &bound) in coord.iter().zip(bounds) {
        if index >= bound {
            return None;
        }
        offset = offset * bound + index;
    }
    Some(offset)
}

// -----------------------------------------------------------------------------
// IndexLabel

/// Renders a coordinate as `i,j,k`.
///
/// ```
/// use weft_codec::index::IndexLabel;
///
/// assert_eq!(format!("items[{}]", IndexLabel(&[1, 0, 2])), "items[1,0,2]");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct IndexLabel<'a>(pub &'a [usize]);

impl fmt::Display for IndexLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MultiIndex, flat_offset};
    use alloc::vec::Vec;

    #[test]
    fn rightmost_varies_fastest() {
        let coords: Vec<Vec<usize>> = MultiIndex::new(&[2, 1, 3]).collect();
        assert_eq!(
            coords,
            [
                [0, 0, 0],
                [0, 0, 1],
                [0, 0, 2],
                [1, 0, 0],
                [1, 0, 1],
                [1, 0, 2],
            ]
        );
    }

    #[test]
    fn offsets_follow_iteration_order() {
        let bounds = [3, 2, 4];
        for (expected, coord) in MultiIndex::new(&bounds).enumerate() {
            assert_eq!(flat_offset(&bounds, &coord), Some(expected));
        }
        assert_eq!(flat_offset(&bounds, &[3, 0, 0]), None);
        assert_eq!(flat_offset(&bounds, &[0, 0]), None);
    }

    #[test]
    fn degenerate_shapes() {
        assert_eq!(MultiIndex::new(&[0]).count(), 0);
        assert_eq!(MultiIndex::new(&[4, 0, 2]).count(), 0);
        assert_eq!(MultiIndex::new(&[4, 0, 2]).len(), 0);

        let scalar: Vec<Vec<usize>> = MultiIndex::new(&[]).collect();
        assert_eq!(scalar.len(), 1);
        assert!(scalar[0].is_empty());
    }
}
