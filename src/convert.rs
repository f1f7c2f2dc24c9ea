//! Conversions to and from `nalgebra` statically sized types.

use nalgebra::{SMatrix, SVector};

use crate::traits::Scalar;
use crate::{Matrix, Vector};

impl<T, const R: usize, const C: usize> From<Matrix<T, R, C>> for SMatrix<T, R, C>
where
    T: Scalar + nalgebra::Scalar,
{
    fn from(matrix: Matrix<T, R, C>) -> Self {
        SMatrix::from_fn(|row, col| matrix[(row, col)])
    }
}

impl<T, const R: usize, const C: usize> From<SMatrix<T, R, C>> for Matrix<T, R, C>
where
    T: Scalar + nalgebra::Scalar,
{
    fn from(matrix: SMatrix<T, R, C>) -> Self {
        Matrix::from_fn(|row, col| matrix[(row, col)])
    }
}

impl<T, const N: usize> From<Vector<T, N>> for SVector<T, N>
where
    T: Scalar + nalgebra::Scalar,
{
    fn from(vector: Vector<T, N>) -> Self {
        SVector::from_fn(|row, _| vector[row])
    }
}

impl<T, const N: usize> From<SVector<T, N>> for Vector<T, N>
where
    T: Scalar + nalgebra::Scalar,
{
    fn from(vector: SVector<T, N>) -> Self {
        Vector::from_fn(|row| vector[row])
    }
}
