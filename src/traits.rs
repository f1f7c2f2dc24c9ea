use core::fmt::Debug;

use num_traits::{Num, NumAssign};

use crate::{Matrix, Vector};

/// Element type of every container in the crate.
///
/// Floats are what the filters run on, but integers satisfy the bound as well,
/// which keeps the container arithmetic exact in tests.
pub trait Scalar: Copy + PartialEq + Debug + Num + NumAssign {}

impl<T> Scalar for T where T: Copy + PartialEq + Debug + Num + NumAssign {}

/// Read access to an `R`x`C` block of elements, owned or borrowed.
pub trait MatrixRef<T, const R: usize, const C: usize> {
    /// Reference to the element at `(row, col)`. Panics when out of range.
    fn entry(&self, row: usize, col: usize) -> &T;

    fn get(&self, row: usize, col: usize) -> T
    where
        T: Copy,
    {
        *self.entry(row, col)
    }

    /// Copies the elements into a new owning matrix.
    fn to_matrix(&self) -> Matrix<T, R, C>
    where
        T: Scalar,
    {
        Matrix::from_fn(|row, col| self.get(row, col))
    }

    fn transpose(&self) -> Matrix<T, C, R>
    where
        T: Scalar,
    {
        Matrix::from_fn(|row, col| self.get(col, row))
    }

    /// Writes the transpose into a caller-supplied `C`x`R` output.
    fn transpose_into<O>(&self, out: &mut O)
    where
        T: Copy,
        O: MatrixMut<T, C, R> + ?Sized,
    {
        for row in 0..R {
            for col in 0..C {
                *out.entry_mut(col, row) = self.get(row, col);
            }
        }
    }
}

/// Write access on top of [`MatrixRef`].
pub trait MatrixMut<T, const R: usize, const C: usize>: MatrixRef<T, R, C> {
    fn entry_mut(&mut self, row: usize, col: usize) -> &mut T;

    fn copy_from<S>(&mut self, source: &S)
    where
        T: Copy,
        S: MatrixRef<T, R, C> + ?Sized,
    {
        for row in 0..R {
            for col in 0..C {
                *self.entry_mut(row, col) = source.get(row, col);
            }
        }
    }

    fn fill(&mut self, value: T)
    where
        T: Copy,
    {
        for row in 0..R {
            for col in 0..C {
                *self.entry_mut(row, col) = value;
            }
        }
    }
}

/// Read access to `N` contiguous elements.
pub trait VectorRef<T, const N: usize> {
    fn as_slice(&self) -> &[T];

    fn to_vector(&self) -> Vector<T, N>
    where
        T: Scalar,
    {
        Vector::from_slice(self.as_slice())
    }
}

pub trait VectorMut<T, const N: usize>: VectorRef<T, N> {
    fn as_mut_slice(&mut self) -> &mut [T];

    fn copy_from<S>(&mut self, source: &S)
    where
        T: Copy,
        S: VectorRef<T, N> + ?Sized,
    {
        self.as_mut_slice().copy_from_slice(source.as_slice());
    }

    fn fill(&mut self, value: T)
    where
        T: Copy,
    {
        self.as_mut_slice().fill(value);
    }
}

impl<T, M, const R: usize, const C: usize> MatrixRef<T, R, C> for &M
where
    M: MatrixRef<T, R, C> + ?Sized,
{
    fn entry(&self, row: usize, col: usize) -> &T {
        (**self).entry(row, col)
    }
}

impl<T, V, const N: usize> VectorRef<T, N> for &V
where
    V: VectorRef<T, N> + ?Sized,
{
    fn as_slice(&self) -> &[T] {
        (**self).as_slice()
    }
}

/// Nonlinear state transition `x' = f(x, dt)` together with its Jacobian.
pub trait ProcessModel<T, const N: usize> {
    fn predict(&self, state: &Vector<T, N>, dt: T) -> Vector<T, N>;

    /// Writes `∂f/∂x` evaluated at `state` into `jacobian`.
    ///
    /// `jacobian` arrives zeroed.
    fn jacobian(&self, state: &Vector<T, N>, dt: T, jacobian: &mut Matrix<T, N, N>);
}

/// Nonlinear observation `z = h(x, dt)` together with its Jacobian.
pub trait MeasurementModel<T, const N: usize, const M: usize> {
    fn measure(&self, state: &Vector<T, N>, dt: T) -> Vector<T, M>;

    /// Writes `∂h/∂x` evaluated at `state` into `jacobian`.
    ///
    /// `jacobian` arrives zeroed.
    fn jacobian(&self, state: &Vector<T, N>, dt: T, jacobian: &mut Matrix<T, M, N>);
}
