use core::ops::{Add, AddAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::traits::{MatrixMut, MatrixRef, Scalar, VectorRef};
use crate::vector::Vector;
use crate::view::{Blocks, MatrixView, MatrixViewMut, VectorView};

/// Owning, stack-allocated `R`x`C` matrix stored row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Matrix<T, const R: usize, const C: usize> {
    data: [[T; C]; R],
}

impl<T, const R: usize, const C: usize> Matrix<T, R, C> {
    /// Builds a matrix from its rows.
    pub const fn new(rows: [[T; C]; R]) -> Self {
        Self { data: rows }
    }

    pub fn from_fn(mut f: impl FnMut(usize, usize) -> T) -> Self {
        Self {
            data: core::array::from_fn(|row| core::array::from_fn(|col| f(row, col))),
        }
    }

    pub fn into_rows(self) -> [[T; C]; R] {
        self.data
    }

    /// Row-major view of all elements.
    pub fn as_slice(&self) -> &[T] {
        self.data.as_flattened()
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.data.as_flattened_mut()
    }

    /// Borrows the `SR`x`SC` block whose top-left corner is `(row, col)`.
    pub fn submat<const SR: usize, const SC: usize>(
        &self,
        row: usize,
        col: usize,
    ) -> MatrixView<'_, T, SR, SC> {
        assert!(
            row + SR <= R && col + SC <= C,
            "{SR}x{SC} block at ({row}, {col}) exceeds {R}x{C} matrix"
        );
        MatrixView::new(&self.as_slice()[row * C + col..], C)
    }

    pub fn submat_mut<const SR: usize, const SC: usize>(
        &mut self,
        row: usize,
        col: usize,
    ) -> MatrixViewMut<'_, T, SR, SC> {
        assert!(
            row + SR <= R && col + SC <= C,
            "{SR}x{SC} block at ({row}, {col}) exceeds {R}x{C} matrix"
        );
        let mut rest: &mut [[T; C]] = &mut self.data[row..row + SR];
        MatrixViewMut::new(core::array::from_fn(|_| {
            let (head, tail) = core::mem::take(&mut rest).split_at_mut(1);
            rest = tail;
            &mut head[0][col..col + SC]
        }))
    }

    /// Tiles the matrix into a `GR`x`GC` grid of `BR`x`BC` views.
    pub fn partition<const BR: usize, const BC: usize, const GR: usize, const GC: usize>(
        &self,
    ) -> Blocks<MatrixView<'_, T, BR, BC>, GR, GC> {
        const { assert!(BR * GR == R && BC * GC == C, "partition blocks must tile the matrix") };
        Blocks::new(core::array::from_fn(|grid_row| {
            core::array::from_fn(|grid_col| self.submat::<BR, BC>(grid_row * BR, grid_col * BC))
        }))
    }

    /// Mutable counterpart of [`Matrix::partition`]; the blocks are disjoint.
    pub fn partition_mut<const BR: usize, const BC: usize, const GR: usize, const GC: usize>(
        &mut self,
    ) -> Blocks<MatrixViewMut<'_, T, BR, BC>, GR, GC> {
        const { assert!(BR * GR == R && BC * GC == C, "partition blocks must tile the matrix") };
        let mut grid: [[[&mut [T]; BR]; GC]; GR] = core::array::from_fn(|_| {
            core::array::from_fn(|_| core::array::from_fn(|_| <&mut [T]>::default()))
        });
        for (row, values) in self.data.iter_mut().enumerate() {
            for (grid_col, chunk) in values.chunks_exact_mut(BC).enumerate() {
                grid[row / BR][grid_col][row % BR] = chunk;
            }
        }
        Blocks::new(grid.map(|blocks| blocks.map(MatrixViewMut::<T, BR, BC>::new)))
    }
}

impl<T: Scalar, const R: usize, const C: usize> Matrix<T, R, C> {
    pub fn zeros() -> Self {
        Self {
            data: [[T::zero(); C]; R],
        }
    }

    pub fn from_element(value: T) -> Self {
        Self {
            data: [[value; C]; R],
        }
    }

    /// Copies `values` laid out row by row. Panics unless `values.len() == R * C`.
    pub fn from_row_slice(values: &[T]) -> Self {
        assert_eq!(
            values.len(),
            R * C,
            "expected {} elements, got {}",
            R * C,
            values.len()
        );
        let mut matrix = Self::zeros();
        matrix.as_mut_slice().copy_from_slice(values);
        matrix
    }

    pub fn scale(mut self, factor: T) -> Self {
        for value in self.as_mut_slice() {
            *value *= factor;
        }
        self
    }
}

impl<T: Scalar, const N: usize> Matrix<T, N, N> {
    pub fn eye() -> Self {
        Self::from_fn(|row, col| if row == col { T::one() } else { T::zero() })
    }

    pub fn from_diagonal<V: VectorRef<T, N> + ?Sized>(diagonal: &V) -> Self {
        let diagonal = diagonal.as_slice();
        Self::from_fn(|row, col| if row == col { diagonal[row] } else { T::zero() })
    }

    pub fn diagonal(&self) -> Vector<T, N> {
        Vector::from_fn(|i| self.data[i][i])
    }

    pub fn trace(&self) -> T {
        (0..N).fold(T::zero(), |acc, i| acc + self.data[i][i])
    }

    /// Doolittle decomposition into unit lower-triangular `L` and
    /// upper-triangular `U` with `L * U == self`.
    ///
    /// No pivoting is done. The input must be non-singular with non-zero
    /// leading minors; a zero on the diagonal of `U` stops the decomposition
    /// and leaves the factors meaningless.
    pub fn lu(&self) -> (Self, Self) {
        let mut lower = Self::zeros();
        let mut upper = Self::zeros();
        self.lu_into(&mut lower, &mut upper);
        (lower, upper)
    }

    pub fn lu_into<L, U>(&self, lower: &mut L, upper: &mut U)
    where
        L: MatrixMut<T, N, N> + ?Sized,
        U: MatrixMut<T, N, N> + ?Sized,
    {
        self.decompose(lower, upper);
    }

    /// Returns `false` at the first zero pivot.
    fn decompose<L, U>(&self, lower: &mut L, upper: &mut U) -> bool
    where
        L: MatrixMut<T, N, N> + ?Sized,
        U: MatrixMut<T, N, N> + ?Sized,
    {
        lower.fill(T::zero());
        upper.fill(T::zero());
        for i in 0..N {
            *lower.entry_mut(i, i) = T::one();
        }

        for j in 0..N {
            for i in 0..=j {
                let mut sum = self.data[i][j];
                for k in 0..i {
                    sum -= lower.get(i, k) * upper.get(k, j);
                }
                *upper.entry_mut(i, j) = sum;
            }

            let pivot = upper.get(j, j);
            if pivot.is_zero() {
                return false;
            }
            for i in j + 1..N {
                let mut sum = self.data[i][j];
                for k in 0..j {
                    sum -= lower.get(i, k) * upper.get(k, j);
                }
                *lower.entry_mut(i, j) = sum / pivot;
            }
        }
        true
    }

    /// Inverse through [`Matrix::lu`]. Same precondition: non-singular input.
    pub fn inverse(&self) -> Self {
        let (lower, upper) = self.lu();
        Self::inverse_from_lu(&lower, &upper)
    }

    pub fn inverse_into<O: MatrixMut<T, N, N> + ?Sized>(&self, out: &mut O) {
        out.copy_from(&self.inverse());
    }

    /// Like [`Matrix::inverse`], but `None` when the decomposition hits a
    /// zero pivot.
    pub fn try_inverse(&self) -> Option<Self> {
        let mut lower = Self::zeros();
        let mut upper = Self::zeros();
        if !self.decompose(&mut lower, &mut upper) {
            return None;
        }
        Some(Self::inverse_from_lu(&lower, &upper))
    }

    /// Solves `self * x = rhs` for `x`.
    pub fn solve<V: VectorRef<T, N> + ?Sized>(&self, rhs: &V) -> Vector<T, N> {
        let (lower, upper) = self.lu();
        let mut x = rhs.to_vector();
        substitute(&lower, &upper, &mut x);
        x
    }

    fn inverse_from_lu(lower: &Self, upper: &Self) -> Self {
        let mut inverse = Self::zeros();
        for col in 0..N {
            let mut x = Vector::from_fn(|row| if row == col { T::one() } else { T::zero() });
            substitute(lower, upper, &mut x);
            for row in 0..N {
                inverse.data[row][col] = x[row];
            }
        }
        inverse
    }
}

/// Forward substitution through unit-diagonal `lower`, then back substitution
/// through `upper`, in place.
fn substitute<T: Scalar, const N: usize>(
    lower: &Matrix<T, N, N>,
    upper: &Matrix<T, N, N>,
    x: &mut Vector<T, N>,
) {
    for i in 0..N {
        for k in 0..i {
            let update = lower.data[i][k] * x[k];
            x[i] -= update;
        }
    }
    for i in (0..N).rev() {
        for k in i + 1..N {
            let update = upper.data[i][k] * x[k];
            x[i] -= update;
        }
        x[i] /= upper.data[i][i];
    }
}

impl<T: Scalar, const R: usize, const C: usize> Default for Matrix<T, R, C> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<T, const R: usize, const C: usize> From<[[T; C]; R]> for Matrix<T, R, C> {
    fn from(rows: [[T; C]; R]) -> Self {
        Self::new(rows)
    }
}

impl<T: Scalar, const R: usize, const C: usize> From<MatrixView<'_, T, R, C>> for Matrix<T, R, C> {
    fn from(view: MatrixView<'_, T, R, C>) -> Self {
        view.to_matrix()
    }
}

impl<T, const R: usize, const C: usize> MatrixRef<T, R, C> for Matrix<T, R, C> {
    fn entry(&self, row: usize, col: usize) -> &T {
        &self.data[row][col]
    }
}

impl<T, const R: usize, const C: usize> MatrixMut<T, R, C> for Matrix<T, R, C> {
    fn entry_mut(&mut self, row: usize, col: usize) -> &mut T {
        &mut self.data[row][col]
    }
}

impl<T, const R: usize, const C: usize> Index<(usize, usize)> for Matrix<T, R, C> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[row][col]
    }
}

impl<T, const R: usize, const C: usize> IndexMut<(usize, usize)> for Matrix<T, R, C> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.data[row][col]
    }
}

impl<T: Scalar, S: MatrixRef<T, R, C>, const R: usize, const C: usize> AddAssign<S>
    for Matrix<T, R, C>
{
    fn add_assign(&mut self, rhs: S) {
        for row in 0..R {
            for col in 0..C {
                self.data[row][col] += rhs.get(row, col);
            }
        }
    }
}

impl<T: Scalar, S: MatrixRef<T, R, C>, const R: usize, const C: usize> SubAssign<S>
    for Matrix<T, R, C>
{
    fn sub_assign(&mut self, rhs: S) {
        for row in 0..R {
            for col in 0..C {
                self.data[row][col] -= rhs.get(row, col);
            }
        }
    }
}

impl<T: Scalar, S: MatrixRef<T, R, C>, const R: usize, const C: usize> Add<S> for Matrix<T, R, C> {
    type Output = Self;

    fn add(mut self, rhs: S) -> Self {
        self += rhs;
        self
    }
}

impl<T: Scalar, S: MatrixRef<T, R, C>, const R: usize, const C: usize> Sub<S> for Matrix<T, R, C> {
    type Output = Self;

    fn sub(mut self, rhs: S) -> Self {
        self -= rhs;
        self
    }
}

impl<T: Scalar + Neg<Output = T>, const R: usize, const C: usize> Neg for Matrix<T, R, C> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(self.data.map(|row| row.map(|value| -value)))
    }
}

/// `lhs * rhs` for any pair of owning or borrowed operands.
pub(crate) fn product<T, L, S, const R: usize, const C: usize, const K: usize>(
    lhs: &L,
    rhs: &S,
) -> Matrix<T, R, K>
where
    T: Scalar,
    L: MatrixRef<T, R, C> + ?Sized,
    S: MatrixRef<T, C, K> + ?Sized,
{
    Matrix::from_fn(|row, col| {
        (0..C).fold(T::zero(), |acc, i| acc + lhs.get(row, i) * rhs.get(i, col))
    })
}

pub(crate) fn apply<T, L, V, const R: usize, const C: usize>(lhs: &L, rhs: &V) -> Vector<T, R>
where
    T: Scalar,
    L: MatrixRef<T, R, C> + ?Sized,
    V: VectorRef<T, C> + ?Sized,
{
    let rhs = rhs.as_slice();
    Vector::from_fn(|row| (0..C).fold(T::zero(), |acc, col| acc + lhs.get(row, col) * rhs[col]))
}

impl<T: Scalar, const R: usize, const C: usize, const K: usize> Mul<Matrix<T, C, K>>
    for Matrix<T, R, C>
{
    type Output = Matrix<T, R, K>;

    fn mul(self, rhs: Matrix<T, C, K>) -> Matrix<T, R, K> {
        product(&self, &rhs)
    }
}

impl<T: Scalar, const R: usize, const C: usize, const K: usize> Mul<MatrixView<'_, T, C, K>>
    for Matrix<T, R, C>
{
    type Output = Matrix<T, R, K>;

    fn mul(self, rhs: MatrixView<'_, T, C, K>) -> Matrix<T, R, K> {
        product(&self, &rhs)
    }
}

impl<T: Scalar, const R: usize, const C: usize> Mul<Vector<T, C>> for Matrix<T, R, C> {
    type Output = Vector<T, R>;

    fn mul(self, rhs: Vector<T, C>) -> Vector<T, R> {
        apply(&self, &rhs)
    }
}

impl<T: Scalar, const R: usize, const C: usize> Mul<VectorView<'_, T, C>> for Matrix<T, R, C> {
    type Output = Vector<T, R>;

    fn mul(self, rhs: VectorView<'_, T, C>) -> Vector<T, R> {
        apply(&self, &rhs)
    }
}

macro_rules! impl_scalar_mul {
    ($($t:ty),*) => {$(
        impl<const R: usize, const C: usize> Mul<$t> for Matrix<$t, R, C> {
            type Output = Self;

            fn mul(self, factor: $t) -> Self {
                self.scale(factor)
            }
        }

        impl<const R: usize, const C: usize> MulAssign<$t> for Matrix<$t, R, C> {
            fn mul_assign(&mut self, factor: $t) {
                *self = self.scale(factor);
            }
        }

        impl<const R: usize, const C: usize> Mul<Matrix<$t, R, C>> for $t {
            type Output = Matrix<$t, R, C>;

            fn mul(self, matrix: Matrix<$t, R, C>) -> Matrix<$t, R, C> {
                matrix.scale(self)
            }
        }
    )*};
}

impl_scalar_mul!(f32, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lu_factors_are_triangular() {
        let a = Matrix::new([
            [4.0f32, 3.0, 2.0, 1.0],
            [2.0, 5.0, 1.0, 3.0],
            [1.0, 2.0, 6.0, 2.0],
            [3.0, 1.0, 2.0, 7.0],
        ]);
        let (lower, upper) = a.lu();

        for row in 0..4 {
            assert_eq!(lower[(row, row)], 1.0);
            for col in row + 1..4 {
                assert_eq!(lower[(row, col)], 0.0);
                assert_eq!(upper[(col, row)], 0.0);
            }
        }
    }

    #[test]
    fn test_lu_into_overwrites_outputs() {
        let a = Matrix::new([[5.0f32, 21.0], [8.0, 40.0]]);
        let mut lower = Matrix::from_element(7.0f32);
        let mut upper = Matrix::from_element(7.0f32);
        a.lu_into(&mut lower, &mut upper);

        assert_eq!(lower, Matrix::new([[1.0, 0.0], [1.6, 1.0]]));
        assert_eq!(upper[(1, 0)], 0.0);
    }

    #[test]
    fn test_solve() {
        let a = Matrix::new([[2.0f64, 1.0, -1.0], [-3.0, -1.0, 2.0], [-2.0, 1.0, 2.0]]);
        let x = a.solve(&Vector::new([8.0, -11.0, -3.0]));

        assert_relative_eq!(x[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(x[1], 3.0, epsilon = 1e-9);
        assert_relative_eq!(x[2], -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_try_inverse_rejects_zero_pivot() {
        let singular = Matrix::new([[1.0f32, 2.0], [2.0, 4.0]]);
        assert!(singular.try_inverse().is_none());

        // Non-singular, but Doolittle without pivoting still needs a(0, 0) != 0.
        let swapped = Matrix::new([[0.0f32, 1.0], [1.0, 0.0]]);
        assert!(swapped.try_inverse().is_none());
    }

    #[test]
    fn test_inverse_into_writes_through_view() {
        let a = Matrix::new([[4.0f64, 7.0], [2.0, 6.0]]);
        let mut out = Matrix::<f64, 3, 3>::zeros();
        a.inverse_into(&mut out.submat_mut::<2, 2>(1, 1));

        assert_relative_eq!(out[(1, 1)], 0.6, epsilon = 1e-12);
        assert_relative_eq!(out[(1, 2)], -0.7, epsilon = 1e-12);
        assert_relative_eq!(out[(2, 1)], -0.2, epsilon = 1e-12);
        assert_relative_eq!(out[(2, 2)], 0.4, epsilon = 1e-12);
        assert_eq!(out[(0, 0)], 0.0);
    }

    #[test]
    fn test_diagonal_and_trace() {
        let d = Matrix::from_diagonal(&Vector::new([1, 2, 3]));
        assert_eq!(d.diagonal(), Vector::new([1, 2, 3]));
        assert_eq!(d.trace(), 6);
        assert_eq!(d[(0, 1)], 0);
    }
}
