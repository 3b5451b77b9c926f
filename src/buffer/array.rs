//! Owned arrays and arithmetic operands.

use std::ops::{Index, IndexMut};

use crate::util::{Component, Dimensions, Error, Result};

/// An owned buffer copy with its shape.
///
/// Returned by the copy forms of buffer arithmetic and by snapshots; it
/// never aliases the storage of the proxy it was computed from.
#[derive(Clone, Debug, PartialEq)]
pub struct Array<T> {
    data: Vec<T>,
    dims: Dimensions,
}

impl<T: Component> Array<T> {
    /// Wrap flat data holding `items` elements of `length` components.
    pub fn new(data: Vec<T>, items: usize, length: usize) -> Result<Self> {
        if data.len() != items * length {
            return Err(Error::ShapeMismatch(format!(
                "{} components cannot be shaped into {} x {}",
                data.len(),
                items,
                length
            )));
        }
        Ok(Self {
            data,
            dims: Dimensions::for_buffer(items, length),
        })
    }

    /// Shape of the array, `(items,)` or `(items, length)`.
    pub fn dims(&self) -> &Dimensions {
        &self.dims
    }

    /// Number of elements.
    pub fn items(&self) -> usize {
        self.dims.size(0).unwrap_or(0)
    }

    /// Number of components per element.
    pub fn length(&self) -> usize {
        self.dims.size(1).unwrap_or(1)
    }

    pub fn len(&self) -> usize {
        self.items()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat components in element order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Components of one element.
    pub fn row(&self, index: usize) -> Option<&[T]> {
        let length = self.length();
        self.data.get(index * length..(index + 1) * length)
    }

    /// Iterate over elements.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, T> {
        self.data.chunks_exact(self.length())
    }
}

impl<T: Component> Index<usize> for Array<T> {
    type Output = [T];

    fn index(&self, index: usize) -> &[T] {
        let length = self.length();
        &self.data[index * length..(index + 1) * length]
    }
}

impl<T: Component> IndexMut<usize> for Array<T> {
    fn index_mut(&mut self, index: usize) -> &mut [T] {
        let length = self.length();
        &mut self.data[index * length..(index + 1) * length]
    }
}

impl<T: Component> Index<(usize, usize)> for Array<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[row * self.length() + col]
    }
}

// ============================================================================
// Operands
// ============================================================================

/// Right-hand side of buffer arithmetic.
///
/// A scalar applies to every component. A slice either matches the whole
/// buffer (elementwise), or holds one element's components (broadcast
/// to every element), or holds a single value.
#[derive(Clone, Copy, Debug)]
pub enum Operand<'a, T> {
    Scalar(T),
    Values(&'a [T]),
}

/// Resolved broadcast of an operand against a buffer.
#[derive(Clone, Copy)]
pub(crate) enum Broadcast<'a, T> {
    Scalar(T),
    Row(&'a [T]),
    Full(&'a [T]),
}

impl<'a, T: Component> Operand<'a, T> {
    pub(crate) fn broadcast(self, items: usize, length: usize) -> Result<Broadcast<'a, T>> {
        match self {
            Self::Scalar(v) => Ok(Broadcast::Scalar(v)),
            Self::Values(v) if v.len() == items * length => Ok(Broadcast::Full(v)),
            Self::Values(v) if v.len() == length => Ok(Broadcast::Row(v)),
            Self::Values(v) if v.len() == 1 => Ok(Broadcast::Scalar(v[0])),
            Self::Values(v) => Err(Error::ShapeMismatch(format!(
                "operand of {} components cannot be broadcast to {} x {}",
                v.len(),
                items,
                length
            ))),
        }
    }
}

impl<T: Copy> Broadcast<'_, T> {
    /// Combine `data` (items x length) with this operand in place.
    pub(crate) fn apply(self, data: &mut [T], length: usize, f: impl Fn(T, T) -> T) {
        match self {
            Self::Scalar(s) => data.iter_mut().for_each(|d| *d = f(*d, s)),
            Self::Full(v) => data.iter_mut().zip(v).for_each(|(d, &s)| *d = f(*d, s)),
            Self::Row(row) => {
                for chunk in data.chunks_exact_mut(length) {
                    chunk.iter_mut().zip(row).for_each(|(d, &s)| *d = f(*d, s));
                }
            }
        }
    }
}

impl<'a> From<f32> for Operand<'a, f32> {
    fn from(v: f32) -> Self {
        Self::Scalar(v)
    }
}

impl<'a> From<i32> for Operand<'a, i32> {
    fn from(v: i32) -> Self {
        Self::Scalar(v)
    }
}

impl<'a> From<&'a [f32]> for Operand<'a, f32> {
    fn from(v: &'a [f32]) -> Self {
        Self::Values(v)
    }
}

impl<'a> From<&'a [i32]> for Operand<'a, i32> {
    fn from(v: &'a [i32]) -> Self {
        Self::Values(v)
    }
}

impl<'a, const N: usize> From<&'a [f32; N]> for Operand<'a, f32> {
    fn from(v: &'a [f32; N]) -> Self {
        Self::Values(v)
    }
}

impl<'a, const N: usize> From<&'a [i32; N]> for Operand<'a, i32> {
    fn from(v: &'a [i32; N]) -> Self {
        Self::Values(v)
    }
}

impl<'a, T: Component> From<&'a Array<T>> for Operand<'a, T> {
    fn from(v: &'a Array<T>) -> Self {
        Self::Values(v.as_slice())
    }
}
