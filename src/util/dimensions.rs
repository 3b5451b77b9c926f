//! Buffer shape support.
//!
//! Dimensions describe the shape of a proxy buffer: `(items,)` for
//! scalar fields, `(items, length)` for vector fields.

use smallvec::SmallVec;

/// Dimensions of a buffer.
///
/// A buffer of single-component elements is never given a trailing
/// dimension of size 1.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dimensions {
    dims: SmallVec<[usize; 2]>,
}

impl Dimensions {
    /// Shape of a buffer holding `items` elements of `length` components.
    pub fn for_buffer(items: usize, length: usize) -> Self {
        let dims = if length > 1 {
            smallvec::smallvec![items, length]
        } else {
            smallvec::smallvec![items]
        };
        Self { dims }
    }

    /// Size of a dimension, None if out of range.
    pub fn size(&self, dim: usize) -> Option<usize> {
        self.dims.get(dim).copied()
    }

    /// All dimension sizes.
    pub fn sizes(&self) -> &[usize] {
        &self.dims
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, s) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", s)?;
        }
        if self.dims.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}
