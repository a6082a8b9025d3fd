use alloc::format;
use alloc::vec;
use alloc::vec::Vec;
use core::any::type_name;

use crate::info::{ArrayInfo, ArrayLike, Describe, TypeDescriptor, TypeKind};
use crate::object::NdArray;
use crate::{Error, Result};

fn bounds_mismatch(expected: &[usize], found: &[usize]) -> Error {
    Error::malformed(format!("array bounds {found:?} do not match {expected:?}"))
}

// -----------------------------------------------------------------------------
// Vec<T>

impl<T: Describe> ArrayLike for Vec<T> {
    type Element = T;

    #[inline]
    fn bounds(&self) -> Vec<usize> {
        vec![self.len()]
    }

    fn element(&self, coord: &[usize]) -> Option<&T> {
        match coord {
            [index] => self.get(*index),
            _ => None,
        }
    }

    fn build(bounds: &[usize], elements: Vec<T>) -> Result<Self> {
        match bounds {
            [len] if *len == elements.len() => Ok(elements),
            _ => Err(bounds_mismatch(&[elements.len()], bounds)),
        }
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(type_name::<Self>(), TypeKind::Array(ArrayInfo::list::<T>()))
    }
}

// -----------------------------------------------------------------------------
// [T; N]

impl<T: Describe, const N: usize> ArrayLike for [T; N] {
    type Element = T;

    #[inline]
    fn bounds(&self) -> Vec<usize> {
        vec![N]
    }

    fn element(&self, coord: &[usize]) -> Option<&T> {
        match coord {
            [index] => self.get(*index),
            _ => None,
        }
    }

    fn build(bounds: &[usize], elements: Vec<T>) -> Result<Self> {
        if bounds != [N] {
            return Err(bounds_mismatch(&[N], bounds));
        }
        let len = elements.len();
        elements
            .try_into()
            .map_err(|_| bounds_mismatch(&[N], &[len]))
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(type_name::<Self>(), TypeKind::Array(ArrayInfo::of::<Self>()))
    }
}

// -----------------------------------------------------------------------------
// NdArray<T>

impl<T: Describe> ArrayLike for NdArray<T> {
    type Element = T;

    #[inline]
    fn bounds(&self) -> Vec<usize> {
        NdArray::bounds(self).to_vec()
    }

    #[inline]
    fn element(&self, coord: &[usize]) -> Option<&T> {
        self.get(coord)
    }

    #[inline]
    fn build(bounds: &[usize], elements: Vec<T>) -> Result<Self> {
        NdArray::from_vec(bounds.to_vec(), elements)
    }
}

impl<T: Describe> Describe for NdArray<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(type_name::<Self>(), TypeKind::Array(ArrayInfo::of::<Self>()))
    }
}

#[cfg(test)]
mod tests {
    use crate::info::ArrayLike;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn fixed_arrays_check_their_length() {
        assert_eq!(<[u8; 2]>::build(&[2], vec![1, 2]).unwrap(), [1, 2]);
        assert!(<[u8; 2]>::build(&[3], vec![1, 2, 3]).is_err());
        assert!(<Vec<u8>>::build(&[2, 1], vec![1, 2]).is_err());
        assert_eq!(ArrayLike::bounds(&Vec::<u8>::new()), [0]);
    }
}
