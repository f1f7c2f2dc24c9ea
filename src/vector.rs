use core::ops::{Add, AddAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::traits::{Scalar, VectorMut, VectorRef};
use crate::view::{VectorView, VectorViewMut};

/// Owning, stack-allocated vector of `N` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vector<T, const N: usize> {
    data: [T; N],
}

impl<T, const N: usize> Vector<T, N> {
    pub const fn new(data: [T; N]) -> Self {
        Self { data }
    }

    pub fn from_fn(f: impl FnMut(usize) -> T) -> Self {
        Self {
            data: core::array::from_fn(f),
        }
    }

    pub fn into_array(self) -> [T; N] {
        self.data
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    /// Borrows `S` elements starting at `from`.
    pub fn subvec<const S: usize>(&self, from: usize) -> VectorView<'_, T, S> {
        assert!(from + S <= N, "{S}-element block at {from} exceeds {N}-element vector");
        VectorView::new(&self.data[from..from + S])
    }

    pub fn subvec_mut<const S: usize>(&mut self, from: usize) -> VectorViewMut<'_, T, S> {
        assert!(from + S <= N, "{S}-element block at {from} exceeds {N}-element vector");
        VectorViewMut::new(&mut self.data[from..from + S])
    }

    /// Splits the vector into `G` consecutive views of `S` elements each.
    pub fn partition<const S: usize, const G: usize>(&self) -> [VectorView<'_, T, S>; G] {
        const { assert!(S * G == N, "partition blocks must tile the vector") };
        core::array::from_fn(|block| VectorView::new(&self.data[block * S..(block + 1) * S]))
    }

    pub fn partition_mut<const S: usize, const G: usize>(&mut self) -> [VectorViewMut<'_, T, S>; G] {
        const { assert!(S * G == N, "partition blocks must tile the vector") };
        let mut rest: &mut [T] = &mut self.data;
        core::array::from_fn(|_| {
            let (head, tail) = core::mem::take(&mut rest).split_at_mut(S);
            rest = tail;
            VectorViewMut::new(head)
        })
    }
}

impl<T: Scalar, const N: usize> Vector<T, N> {
    pub fn zeros() -> Self {
        Self {
            data: [T::zero(); N],
        }
    }

    pub fn from_element(value: T) -> Self {
        Self { data: [value; N] }
    }

    /// Copies `values` in order. Panics unless `values.len() == N`.
    pub fn from_slice(values: &[T]) -> Self {
        assert_eq!(
            values.len(),
            N,
            "expected {} elements, got {}",
            N,
            values.len()
        );
        let mut vector = Self::zeros();
        vector.data.copy_from_slice(values);
        vector
    }

    pub fn scale(mut self, factor: T) -> Self {
        for value in &mut self.data {
            *value *= factor;
        }
        self
    }

    pub fn dot<V: VectorRef<T, N> + ?Sized>(&self, other: &V) -> T {
        self.data
            .iter()
            .zip(other.as_slice())
            .fold(T::zero(), |acc, (&a, &b)| acc + a * b)
    }
}

impl<T: Scalar> Vector<T, 3> {
    pub fn cross<V: VectorRef<T, 3> + ?Sized>(&self, rhs: &V) -> Self {
        let [ax, ay, az] = self.data;
        let b = rhs.as_slice();
        Self::new([
            ay * b[2] - az * b[1],
            az * b[0] - ax * b[2],
            ax * b[1] - ay * b[0],
        ])
    }
}

impl<T: Scalar, const N: usize> Default for Vector<T, N> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<T, const N: usize> From<[T; N]> for Vector<T, N> {
    fn from(data: [T; N]) -> Self {
        Self::new(data)
    }
}

impl<T, const N: usize> VectorRef<T, N> for Vector<T, N> {
    fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T, const N: usize> VectorMut<T, N> for Vector<T, N> {
    fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T, const N: usize> Index<usize> for Vector<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T, const N: usize> IndexMut<usize> for Vector<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a Vector<T, N> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<T: Scalar, V: VectorRef<T, N>, const N: usize> AddAssign<V> for Vector<T, N> {
    fn add_assign(&mut self, rhs: V) {
        for (lhs, &rhs) in self.data.iter_mut().zip(rhs.as_slice()) {
            *lhs += rhs;
        }
    }
}

impl<T: Scalar, V: VectorRef<T, N>, const N: usize> SubAssign<V> for Vector<T, N> {
    fn sub_assign(&mut self, rhs: V) {
        for (lhs, &rhs) in self.data.iter_mut().zip(rhs.as_slice()) {
            *lhs -= rhs;
        }
    }
}

impl<T: Scalar, V: VectorRef<T, N>, const N: usize> Add<V> for Vector<T, N> {
    type Output = Self;

    fn add(mut self, rhs: V) -> Self {
        self += rhs;
        self
    }
}

impl<T: Scalar, V: VectorRef<T, N>, const N: usize> Sub<V> for Vector<T, N> {
    type Output = Self;

    fn sub(mut self, rhs: V) -> Self {
        self -= rhs;
        self
    }
}

impl<T: Scalar + Neg<Output = T>, const N: usize> Neg for Vector<T, N> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(self.data.map(|value| -value))
    }
}

macro_rules! impl_scalar_mul {
    ($($t:ty),*) => {$(
        impl<const N: usize> Mul<$t> for Vector<$t, N> {
            type Output = Self;

            fn mul(self, factor: $t) -> Self {
                self.scale(factor)
            }
        }

        impl<const N: usize> MulAssign<$t> for Vector<$t, N> {
            fn mul_assign(&mut self, factor: $t) {
                *self = self.scale(factor);
            }
        }

        impl<const N: usize> Mul<Vector<$t, N>> for $t {
            type Output = Vector<$t, N>;

            fn mul(self, vector: Vector<$t, N>) -> Vector<$t, N> {
                vector.scale(self)
            }
        }
    )*};
}

impl_scalar_mul!(f32, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
