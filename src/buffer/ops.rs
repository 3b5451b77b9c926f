//! Vector and elementwise arithmetic on buffer proxies.
//!
//! Every operation comes in two forms: the copy form computes into a new
//! [`Array`] and leaves the buffer untouched, the `_assign` form writes
//! into the buffer's existing storage and returns the proxy.

use super::{Array, BufferProxy, Operand};
use crate::core::PropertyHost;
use crate::util::{Component, Error, Matrix, Result};

/// Component types that support `+`, `-` and `*`.
pub trait Numeric: Component {
    fn add(self, rhs: Self) -> Self;
    fn sub(self, rhs: Self) -> Self;
    fn mul(self, rhs: Self) -> Self;
}

impl Numeric for f32 {
    #[inline]
    fn add(self, rhs: Self) -> Self {
        self + rhs
    }
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self - rhs
    }
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self * rhs
    }
}

// integer buffers wrap on overflow
impl Numeric for i32 {
    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.wrapping_sub(rhs)
    }
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.wrapping_mul(rhs)
    }
}

impl<'h, H: PropertyHost + ?Sized> BufferProxy<'h, H> {
    fn check_matrix(&self, matrix: &Matrix) -> Result<()> {
        if matrix.dim() != self.length {
            return Err(Error::ShapeMismatch(format!(
                "cannot multiply {}-component vectors by a {}x{} matrix",
                self.length,
                matrix.dim(),
                matrix.dim()
            )));
        }
        Ok(())
    }

    /// Multiply every element, as a row vector, by `matrix` (`v * matrix`)
    /// and return the result. See [`Matrix`] for glam transforms.
    pub fn matmul(&self, matrix: impl Into<Matrix>) -> Result<Array<f32>> {
        let matrix = matrix.into();
        let data = self.as_slice::<f32>()?;
        self.check_matrix(&matrix)?;

        let mut out = vec![0.0f32; data.len()];
        for (src, dst) in data
            .chunks_exact(self.length)
            .zip(out.chunks_exact_mut(self.length))
        {
            matrix.transform(src, dst);
        }
        Array::new(out, self.items, self.length)
    }

    /// Transform every element by `matrix` in place.
    pub fn matmul_assign(&mut self, matrix: impl Into<Matrix>) -> Result<&mut Self> {
        let matrix = matrix.into();
        self.as_slice::<f32>()?;
        self.check_matrix(&matrix)?;

        let length = self.length;
        for v in self.as_slice_mut::<f32>()?.chunks_exact_mut(length) {
            matrix.transform_in_place(v);
        }
        Ok(self)
    }

    fn binary<'a, T: Numeric>(
        &self,
        rhs: Operand<'a, T>,
        f: impl Fn(T, T) -> T,
    ) -> Result<Array<T>> {
        let mut out = self.as_slice::<T>()?.to_vec();
        rhs.broadcast(self.items, self.length)?
            .apply(&mut out, self.length, f);
        Array::new(out, self.items, self.length)
    }

    fn binary_assign<'a, T: Numeric>(
        &mut self,
        rhs: Operand<'a, T>,
        f: impl Fn(T, T) -> T,
    ) -> Result<&mut Self> {
        let broadcast = rhs.broadcast(self.items, self.length)?;
        let length = self.length;
        broadcast.apply(self.as_slice_mut::<T>()?, length, f);
        Ok(self)
    }

    pub fn add<'a, T: Numeric>(&self, rhs: impl Into<Operand<'a, T>>) -> Result<Array<T>> {
        self.binary(rhs.into(), T::add)
    }

    pub fn add_assign<'a, T: Numeric>(&mut self, rhs: impl Into<Operand<'a, T>>) -> Result<&mut Self> {
        self.binary_assign(rhs.into(), T::add)
    }

    pub fn sub<'a, T: Numeric>(&self, rhs: impl Into<Operand<'a, T>>) -> Result<Array<T>> {
        self.binary(rhs.into(), T::sub)
    }

    pub fn sub_assign<'a, T: Numeric>(&mut self, rhs: impl Into<Operand<'a, T>>) -> Result<&mut Self> {
        self.binary_assign(rhs.into(), T::sub)
    }

    pub fn mul<'a, T: Numeric>(&self, rhs: impl Into<Operand<'a, T>>) -> Result<Array<T>> {
        self.binary(rhs.into(), T::mul)
    }

    pub fn mul_assign<'a, T: Numeric>(&mut self, rhs: impl Into<Operand<'a, T>>) -> Result<&mut Self> {
        self.binary_assign(rhs.into(), T::mul)
    }

    /// True division. Only float buffers can be divided.
    pub fn div<'a>(&self, rhs: impl Into<Operand<'a, f32>>) -> Result<Array<f32>> {
        self.binary(rhs.into(), |a, b| a / b)
    }

    /// True division in place. Only float buffers can be divided.
    pub fn div_assign<'a>(&mut self, rhs: impl Into<Operand<'a, f32>>) -> Result<&mut Self> {
        self.binary_assign(rhs.into(), |a, b| a / b)
    }
}
