use nalgebra as na;
use std::ops::{Add, Mul, Sub};

use crate::math::Vector3;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A 3x3 matrix of double precision floats, stored row-major
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Matrix3 {
    pub data: [[f64; 3]; 3],
}

impl Matrix3 {
    /// Creates a new matrix from row-major data
    #[inline]
    pub fn new(data: [[f64; 3]; 3]) -> Self {
        Self { data }
    }

    /// Creates an identity matrix
    pub fn identity() -> Self {
        Self {
            data: [
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a zero matrix
    pub fn zero() -> Self {
        Self { data: [[0.0; 3]; 3] }
    }

    /// Creates a matrix from three column vectors
    pub fn from_cols(c0: Vector3, c1: Vector3, c2: Vector3) -> Self {
        Self {
            data: [
                [c0.x, c1.x, c2.x],
                [c0.y, c1.y, c2.y],
                [c0.z, c1.z, c2.z],
            ],
        }
    }

    /// Returns the j-th column as a vector
    #[inline]
    pub fn col(&self, j: usize) -> Vector3 {
        Vector3::new(self.data[0][j], self.data[1][j], self.data[2][j])
    }

    /// Returns the trace of the matrix
    #[inline]
    pub fn trace(&self) -> f64 {
        self.data[0][0] + self.data[1][1] + self.data[2][2]
    }

    /// Returns the determinant of the matrix
    pub fn determinant(&self) -> f64 {
        let m = &self.data;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Returns the inverse of the matrix, or None if it is not invertible
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det == 0.0 {
            return None;
        }

        let m = &self.data;
        let inv_det = 1.0 / det;
        Some(Self {
            data: [
                [
                    (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv_det,
                    (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det,
                    (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det,
                ],
                [
                    (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det,
                    (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det,
                    (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det,
                ],
                [
                    (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv_det,
                    (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det,
                    (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det,
                ],
            ],
        })
    }

    /// Returns the transpose of the matrix
    pub fn transpose(&self) -> Self {
        let m = &self.data;
        Self {
            data: [
                [m[0][0], m[1][0], m[2][0]],
                [m[0][1], m[1][1], m[2][1]],
                [m[0][2], m[1][2], m[2][2]],
            ],
        }
    }

    /// Multiplies the matrix by a vector
    pub fn multiply_vector(&self, v: Vector3) -> Vector3 {
        let m = &self.data;
        Vector3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    /// Multiplies the matrix by another matrix
    pub fn multiply_matrix(&self, other: &Self) -> Self {
        let mut result = [[0.0; 3]; 3];
        for (i, row) in result.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                for k in 0..3 {
                    *value += self.data[i][k] * other.data[k][j];
                }
            }
        }
        Self { data: result }
    }

    /// Returns the squared Frobenius norm (sum of squared entries)
    pub fn frobenius_norm_squared(&self) -> f64 {
        self.data
            .iter()
            .flat_map(|row| row.iter())
            .map(|v| v * v)
            .sum()
    }

    /// Computes the singular value decomposition via nalgebra
    ///
    /// Returns (U, singular values, V^T). Used for the polar decomposition
    /// of the deformation gradient in the corotational material model.
    pub fn svd(&self) -> (Self, Vector3, Self) {
        let svd = self.to_nalgebra().svd(true, true);
        let u = svd.u.unwrap_or_else(na::Matrix3::identity);
        let v_t = svd.v_t.unwrap_or_else(na::Matrix3::identity);
        (
            Self::from_nalgebra(&u),
            Vector3::from_nalgebra(&svd.singular_values),
            Self::from_nalgebra(&v_t),
        )
    }

    /// Convert to nalgebra Matrix3
    pub fn to_nalgebra(&self) -> na::Matrix3<f64> {
        na::Matrix3::new(
            self.data[0][0], self.data[0][1], self.data[0][2],
            self.data[1][0], self.data[1][1], self.data[1][2],
            self.data[2][0], self.data[2][1], self.data[2][2],
        )
    }

    /// Convert from nalgebra Matrix3
    pub fn from_nalgebra(m: &na::Matrix3<f64>) -> Self {
        Self {
            data: [
                [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
                [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
                [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
            ],
        }
    }
}

impl Add for Matrix3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        let mut data = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                data[i][j] = self.data[i][j] + other.data[i][j];
            }
        }
        Self { data }
    }
}

impl Sub for Matrix3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        let mut data = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                data[i][j] = self.data[i][j] - other.data[i][j];
            }
        }
        Self { data }
    }
}

impl Mul<f64> for Matrix3 {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        let mut data = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                data[i][j] = self.data[i][j] * scalar;
            }
        }
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn determinant_and_inverse() {
        let m = Matrix3::from_cols(
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::new(0.0, 3.0, 0.0),
            Vector3::new(0.0, 0.0, 4.0),
        );
        assert_relative_eq!(m.determinant(), 24.0);

        let inv = m.inverse().unwrap();
        let product = m.multiply_matrix(&inv);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(product.data[i][j], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let m = Matrix3::from_cols(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(2.0, 4.0, 6.0),
            Vector3::new(0.0, 1.0, 0.0),
        );
        assert!(m.inverse().is_none());
    }

    #[test]
    fn svd_of_identity() {
        let (u, sigma, v_t) = Matrix3::identity().svd();
        let r = u.multiply_matrix(&v_t);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(r.data[i][j], expected, epsilon = 1e-12);
            }
        }
        assert_relative_eq!(sigma.x, 1.0);
        assert_relative_eq!(sigma.y, 1.0);
        assert_relative_eq!(sigma.z, 1.0);
    }
}
