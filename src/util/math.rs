//! Math type re-exports and the square matrices buffers can be multiplied by.

pub use glam::{Mat2, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

use std::fmt;

/// A square transform applied to every element of a vector buffer.
///
/// Each element is treated as a row vector and replaced by
/// `element * matrix`, so a buffer of `n` rows times the matrix is an
/// `n` row result. glam matrices act on column vectors: pass the
/// transpose of a glam transform (`Mat4::from_translation(t).transpose()`)
/// to get the same effect on rows.
#[derive(Clone, Copy, PartialEq)]
pub enum Matrix {
    Mat2(Mat2),
    Mat3(Mat3),
    Mat4(Mat4),
}

impl Matrix {
    /// Number of rows (and columns).
    #[inline]
    pub const fn dim(&self) -> usize {
        match self {
            Self::Mat2(_) => 2,
            Self::Mat3(_) => 3,
            Self::Mat4(_) => 4,
        }
    }

    /// Transform one row. Both slices must have `dim()` components.
    #[inline]
    pub fn transform(&self, v: &[f32], out: &mut [f32]) {
        match self {
            Self::Mat2(m) => (m.transpose() * Vec2::from_slice(v)).write_to_slice(out),
            Self::Mat3(m) => (m.transpose() * Vec3::from_slice(v)).write_to_slice(out),
            Self::Mat4(m) => (m.transpose() * Vec4::from_slice(v)).write_to_slice(out),
        }
    }

    /// Transform one row in place.
    #[inline]
    pub fn transform_in_place(&self, v: &mut [f32]) {
        match self {
            Self::Mat2(m) => (m.transpose() * Vec2::from_slice(v)).write_to_slice(v),
            Self::Mat3(m) => (m.transpose() * Vec3::from_slice(v)).write_to_slice(v),
            Self::Mat4(m) => (m.transpose() * Vec4::from_slice(v)).write_to_slice(v),
        }
    }
}

impl From<Mat2> for Matrix {
    fn from(m: Mat2) -> Self {
        Self::Mat2(m)
    }
}

impl From<Mat3> for Matrix {
    fn from(m: Mat3) -> Self {
        Self::Mat3(m)
    }
}

impl From<Mat4> for Matrix {
    fn from(m: Mat4) -> Self {
        Self::Mat4(m)
    }
}

impl From<Quat> for Matrix {
    fn from(q: Quat) -> Self {
        Self::Mat3(Mat3::from_quat(q))
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mat2(m) => write!(f, "Matrix({:?})", m),
            Self::Mat3(m) => write!(f, "Matrix({:?})", m),
            Self::Mat4(m) => write!(f, "Matrix({:?})", m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_matrix_dims() {
        assert_eq!(Matrix::from(Mat2::IDENTITY).dim(), 2);
        assert_eq!(Matrix::from(Mat3::IDENTITY).dim(), 3);
        assert_eq!(Matrix::from(Mat4::IDENTITY).dim(), 4);
    }

    #[test]
    fn test_translation_of_points() {
        let m = Matrix::from(Mat4::from_translation(Vec3::new(0.0, 0.0, 1.0)).transpose());
        let mut out = [0.0; 4];
        m.transform(&[1.0, 2.0, 3.0, 1.0], &mut out);
        assert_eq!(out, [1.0, 2.0, 4.0, 1.0]);

        // directions (w = 0) ignore translation
        let mut dir = [1.0, 2.0, 3.0, 0.0];
        m.transform_in_place(&mut dir);
        assert_eq!(dir, [1.0, 2.0, 3.0, 0.0]);
    }

    #[test]
    fn test_rows_times_matrix() {
        // [1, 0, 5] picks the first row of the matrix
        let m = Matrix::from(Mat3::from_cols_array_2d(&[
            [1.0, 4.0, 7.0],
            [2.0, 5.0, 8.0],
            [3.0, 6.0, 9.0],
        ]));
        let mut out = [0.0; 3];
        m.transform(&[1.0, 0.0, 0.0], &mut out);
        assert_eq!(out, [1.0, 2.0, 3.0]);
        m.transform(&[0.0, 1.0, 0.0], &mut out);
        assert_eq!(out, [4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_rotation_of_rows() {
        // a row times a z rotation turns the opposite way to glam's M * v
        let m = Matrix::from(Mat3::from_rotation_z(FRAC_PI_2));
        let mut v = [1.0, 0.0, 5.0];
        m.transform_in_place(&mut v);
        assert!(v[0].abs() < 1e-6);
        assert!((v[1] + 1.0).abs() < 1e-6);
        assert_eq!(v[2], 5.0);

        let mut w = [1.0, 2.0];
        Matrix::from(Mat2::IDENTITY).transform_in_place(&mut w);
        assert_eq!(w, [1.0, 2.0]);
    }
}
