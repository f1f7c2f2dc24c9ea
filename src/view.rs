use core::fmt;
use core::ops::{Add, AddAssign, Index, IndexMut, Mul, Sub, SubAssign};

use crate::matrix::{apply, product};
use crate::traits::{MatrixMut, MatrixRef, Scalar, VectorMut, VectorRef};
use crate::{Matrix, Vector};

/// Borrowed run of `N` elements inside a larger vector.
#[derive(Debug, Clone, Copy)]
pub struct VectorView<'a, T, const N: usize> {
    data: &'a [T],
}

impl<'a, T, const N: usize> VectorView<'a, T, N> {
    pub(crate) fn new(data: &'a [T]) -> Self {
        debug_assert_eq!(data.len(), N);
        Self { data }
    }
}

impl<T, const N: usize> VectorRef<T, N> for VectorView<'_, T, N> {
    fn as_slice(&self) -> &[T] {
        self.data
    }
}

impl<T, const N: usize> Index<usize> for VectorView<'_, T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T: Scalar, const N: usize> VectorView<'_, T, N> {
    pub fn scale(&self, factor: T) -> Vector<T, N> {
        Vector::from_fn(|i| self.data[i] * factor)
    }
}

impl<T: Scalar, const N: usize> From<VectorView<'_, T, N>> for Vector<T, N> {
    fn from(view: VectorView<'_, T, N>) -> Self {
        view.to_vector()
    }
}

impl<T: Scalar, V: VectorRef<T, N>, const N: usize> Add<V> for VectorView<'_, T, N> {
    type Output = Vector<T, N>;

    fn add(self, rhs: V) -> Vector<T, N> {
        self.to_vector() + rhs
    }
}

impl<T: Scalar, V: VectorRef<T, N>, const N: usize> Sub<V> for VectorView<'_, T, N> {
    type Output = Vector<T, N>;

    fn sub(self, rhs: V) -> Vector<T, N> {
        self.to_vector() - rhs
    }
}

/// Mutable run of `N` elements; writes land in the parent vector.
#[derive(Debug)]
pub struct VectorViewMut<'a, T, const N: usize> {
    data: &'a mut [T],
}

impl<'a, T, const N: usize> VectorViewMut<'a, T, N> {
    pub(crate) fn new(data: &'a mut [T]) -> Self {
        debug_assert_eq!(data.len(), N);
        Self { data }
    }
}

impl<T, const N: usize> VectorRef<T, N> for VectorViewMut<'_, T, N> {
    fn as_slice(&self) -> &[T] {
        self.data
    }
}

impl<T, const N: usize> VectorMut<T, N> for VectorViewMut<'_, T, N> {
    fn as_mut_slice(&mut self) -> &mut [T] {
        self.data
    }
}

impl<T, const N: usize> Index<usize> for VectorViewMut<'_, T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T, const N: usize> IndexMut<usize> for VectorViewMut<'_, T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }
}

impl<T: Scalar, V: VectorRef<T, N>, const N: usize> AddAssign<V> for VectorViewMut<'_, T, N> {
    fn add_assign(&mut self, rhs: V) {
        for (lhs, &rhs) in self.data.iter_mut().zip(rhs.as_slice()) {
            *lhs += rhs;
        }
    }
}

impl<T: Scalar, V: VectorRef<T, N>, const N: usize> SubAssign<V> for VectorViewMut<'_, T, N> {
    fn sub_assign(&mut self, rhs: V) {
        for (lhs, &rhs) in self.data.iter_mut().zip(rhs.as_slice()) {
            *lhs -= rhs;
        }
    }
}

/// Read-only `R`x`C` window into a row-major parent.
///
/// Element `(row, col)` lives at `data[row * stride + col]`, where `stride` is
/// the column count of the outermost owning matrix.
#[derive(Clone, Copy)]
pub struct MatrixView<'a, T, const R: usize, const C: usize> {
    data: &'a [T],
    stride: usize,
}

impl<'a, T, const R: usize, const C: usize> MatrixView<'a, T, R, C> {
    pub(crate) fn new(data: &'a [T], stride: usize) -> Self {
        debug_assert!(C <= stride);
        debug_assert!(R == 0 || data.len() >= (R - 1) * stride + C);
        Self { data, stride }
    }

    fn row(&self, row: usize) -> &'a [T] {
        let start = row * self.stride;
        &self.data[start..start + C]
    }

    /// Narrows the window further; the result still borrows the parent.
    pub fn submat<const SR: usize, const SC: usize>(
        &self,
        row: usize,
        col: usize,
    ) -> MatrixView<'a, T, SR, SC> {
        assert!(
            row + SR <= R && col + SC <= C,
            "{SR}x{SC} block at ({row}, {col}) exceeds {R}x{C} view"
        );
        MatrixView::new(&self.data[row * self.stride + col..], self.stride)
    }
}

impl<T: fmt::Debug, const R: usize, const C: usize> fmt::Debug for MatrixView<'_, T, R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries((0..R).map(|row| self.row(row))).finish()
    }
}

impl<T, const R: usize, const C: usize> MatrixRef<T, R, C> for MatrixView<'_, T, R, C> {
    fn entry(&self, row: usize, col: usize) -> &T {
        assert!(row < R && col < C, "index ({row}, {col}) outside {R}x{C} view");
        &self.data[row * self.stride + col]
    }
}

impl<T, const R: usize, const C: usize> Index<(usize, usize)> for MatrixView<'_, T, R, C> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        self.entry(row, col)
    }
}

impl<T: Scalar, const R: usize, const C: usize> MatrixView<'_, T, R, C> {
    pub fn scale(&self, factor: T) -> Matrix<T, R, C> {
        Matrix::from_fn(|row, col| self.row(row)[col] * factor)
    }
}

impl<T: Scalar, S: MatrixRef<T, R, C>, const R: usize, const C: usize> Add<S>
    for MatrixView<'_, T, R, C>
{
    type Output = Matrix<T, R, C>;

    fn add(self, rhs: S) -> Matrix<T, R, C> {
        self.to_matrix() + rhs
    }
}

impl<T: Scalar, S: MatrixRef<T, R, C>, const R: usize, const C: usize> Sub<S>
    for MatrixView<'_, T, R, C>
{
    type Output = Matrix<T, R, C>;

    fn sub(self, rhs: S) -> Matrix<T, R, C> {
        self.to_matrix() - rhs
    }
}

impl<T: Scalar, const R: usize, const C: usize, const K: usize> Mul<Matrix<T, C, K>>
    for MatrixView<'_, T, R, C>
{
    type Output = Matrix<T, R, K>;

    fn mul(self, rhs: Matrix<T, C, K>) -> Matrix<T, R, K> {
        product(&self, &rhs)
    }
}

impl<T: Scalar, const R: usize, const C: usize, const K: usize> Mul<MatrixView<'_, T, C, K>>
    for MatrixView<'_, T, R, C>
{
    type Output = Matrix<T, R, K>;

    fn mul(self, rhs: MatrixView<'_, T, C, K>) -> Matrix<T, R, K> {
        product(&self, &rhs)
    }
}

impl<T: Scalar, const R: usize, const C: usize> Mul<Vector<T, C>> for MatrixView<'_, T, R, C> {
    type Output = Vector<T, R>;

    fn mul(self, rhs: Vector<T, C>) -> Vector<T, R> {
        apply(&self, &rhs)
    }
}

impl<T: Scalar, const R: usize, const C: usize> Mul<VectorView<'_, T, C>>
    for MatrixView<'_, T, R, C>
{
    type Output = Vector<T, R>;

    fn mul(self, rhs: VectorView<'_, T, C>) -> Vector<T, R> {
        apply(&self, &rhs)
    }
}

/// Mutable `R`x`C` window; one row slice per view row.
pub struct MatrixViewMut<'a, T, const R: usize, const C: usize> {
    rows: [&'a mut [T]; R],
}

impl<'a, T, const R: usize, const C: usize> MatrixViewMut<'a, T, R, C> {
    pub(crate) fn new(rows: [&'a mut [T]; R]) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == C));
        Self { rows }
    }

    pub fn submat_mut<const SR: usize, const SC: usize>(
        &mut self,
        row: usize,
        col: usize,
    ) -> MatrixViewMut<'_, T, SR, SC> {
        assert!(
            row + SR <= R && col + SC <= C,
            "{SR}x{SC} block at ({row}, {col}) exceeds {R}x{C} view"
        );
        let mut rest: &mut [&'a mut [T]] = &mut self.rows[row..row + SR];
        MatrixViewMut::new(core::array::from_fn(|_| {
            let (head, tail) = core::mem::take(&mut rest).split_at_mut(1);
            rest = tail;
            &mut head[0][col..col + SC]
        }))
    }
}

impl<T: fmt::Debug, const R: usize, const C: usize> fmt::Debug for MatrixViewMut<'_, T, R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rows.iter()).finish()
    }
}

impl<T, const R: usize, const C: usize> MatrixRef<T, R, C> for MatrixViewMut<'_, T, R, C> {
    fn entry(&self, row: usize, col: usize) -> &T {
        assert!(col < C, "index ({row}, {col}) outside {R}x{C} view");
        &self.rows[row][col]
    }
}

impl<T, const R: usize, const C: usize> MatrixMut<T, R, C> for MatrixViewMut<'_, T, R, C> {
    fn entry_mut(&mut self, row: usize, col: usize) -> &mut T {
        assert!(col < C, "index ({row}, {col}) outside {R}x{C} view");
        &mut self.rows[row][col]
    }
}

impl<T, const R: usize, const C: usize> Index<(usize, usize)> for MatrixViewMut<'_, T, R, C> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        self.entry(row, col)
    }
}

impl<T, const R: usize, const C: usize> IndexMut<(usize, usize)> for MatrixViewMut<'_, T, R, C> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        self.entry_mut(row, col)
    }
}

impl<T: Scalar, S: MatrixRef<T, R, C>, const R: usize, const C: usize> AddAssign<S>
    for MatrixViewMut<'_, T, R, C>
{
    fn add_assign(&mut self, rhs: S) {
        for (row, values) in self.rows.iter_mut().enumerate() {
            for (col, value) in values.iter_mut().enumerate() {
                *value += rhs.get(row, col);
            }
        }
    }
}

impl<T: Scalar, S: MatrixRef<T, R, C>, const R: usize, const C: usize> SubAssign<S>
    for MatrixViewMut<'_, T, R, C>
{
    fn sub_assign(&mut self, rhs: S) {
        for (row, values) in self.rows.iter_mut().enumerate() {
            for (col, value) in values.iter_mut().enumerate() {
                *value -= rhs.get(row, col);
            }
        }
    }
}

impl<T: Scalar, const R: usize, const C: usize> From<MatrixViewMut<'_, T, R, C>>
    for Matrix<T, R, C>
{
    fn from(view: MatrixViewMut<'_, T, R, C>) -> Self {
        view.to_matrix()
    }
}

/// `GR`x`GC` grid of views produced by `Matrix::partition{,_mut}`, in
/// row-major block order.
#[derive(Debug, Clone, Copy)]
pub struct Blocks<V, const GR: usize, const GC: usize> {
    grid: [[V; GC]; GR],
}

impl<V, const GR: usize, const GC: usize> Blocks<V, GR, GC> {
    pub(crate) fn new(grid: [[V; GC]; GR]) -> Self {
        Self { grid }
    }

    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.grid.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.grid.iter_mut().flatten()
    }

    /// Hands out the grid so the blocks can be destructured by position.
    pub fn into_inner(self) -> [[V; GC]; GR] {
        self.grid
    }
}

impl<V, const GR: usize, const GC: usize> Index<(usize, usize)> for Blocks<V, GR, GC> {
    type Output = V;

    fn index(&self, (row, col): (usize, usize)) -> &V {
        &self.grid[row][col]
    }
}

impl<V, const GR: usize, const GC: usize> IndexMut<(usize, usize)> for Blocks<V, GR, GC> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut V {
        &mut self.grid[row][col]
    }
}
