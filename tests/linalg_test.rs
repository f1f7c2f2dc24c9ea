#![cfg(test)]
extern crate std;

use approx::assert_relative_eq;
use nalgebra::SMatrix;
use rstest::{fixture, rstest};
use uf_ekf::{Matrix, MatrixMut, MatrixRef, Vector, VectorMut, VectorRef};

const EPS: f32 = 1e-5;

#[fixture]
fn x() -> Matrix<i32, 2, 2> {
    Matrix::new([[5, 21], [8, 40]])
}

#[fixture]
fn y() -> Matrix<i32, 2, 2> {
    Matrix::new([[10, 1], [7, 6]])
}

#[fixture]
fn square() -> Matrix<f32, 3, 3> {
    Matrix::new([[3.0, 7.0, 5.0], [-4.0, 8.0, 1.0], [10.0, 0.0, 14.0]])
}

#[fixture]
fn grid() -> Matrix<i32, 4, 4> {
    Matrix::new([[3, 7, 5, 2], [-4, 8, 1, 0], [10, 0, 14, 4], [1, 3, 5, 7]])
}

#[test]
fn test_default_is_zero() {
    assert_eq!(Matrix::<i32, 2, 2>::default(), Matrix::new([[0, 0], [0, 0]]));
    assert_eq!(Vector::<i32, 3>::default(), Vector::new([0, 0, 0]));
}

#[rstest]
fn test_from_row_slice(x: Matrix<i32, 2, 2>) {
    assert_eq!(Matrix::from_row_slice(&[5, 21, 8, 40]), x);
    assert_eq!(x.as_slice(), &[5, 21, 8, 40]);
    assert_eq!(Vector::<i32, 2>::from_slice(&[5, 21]), Vector::new([5, 21]));
}

#[rstest]
fn test_into_arrays(x: Matrix<i32, 2, 2>) {
    assert_eq!(x.into_rows(), [[5, 21], [8, 40]]);
    assert_eq!(Matrix::new(x.into_rows()), x);
    assert_eq!(Vector::new([5, 21]).into_array(), [5, 21]);
}

#[test]
fn test_vector_add() {
    let mut a = Vector::new([5, 21]);
    let b = Vector::new([10, 1]);

    assert_eq!(a + b, Vector::new([15, 22]));
    a += b;
    assert_eq!(a, Vector::new([15, 22]));
    a -= b;
    assert_eq!(a, Vector::new([5, 21]));
}

#[test]
fn test_vector_products() {
    let a = Vector::new([1, 2, 3]);
    let b = Vector::new([4, 5, 6]);

    assert_eq!(a.dot(&b), 32);
    assert_eq!(a.cross(&b), Vector::new([-3, 6, -3]));
    assert_eq!(2 * a, a * 2);
    assert_eq!(-a, Vector::new([-1, -2, -3]));
}

#[rstest]
fn test_add(x: Matrix<i32, 2, 2>, y: Matrix<i32, 2, 2>) {
    let z = x + y;

    assert_eq!(z, Matrix::new([[15, 22], [15, 46]]));
    assert_eq!(z, y + x);
    for row in 0..2 {
        for col in 0..2 {
            assert_eq!(z[(row, col)], x[(row, col)] + y[(row, col)]);
        }
    }

    let mut w = x;
    w += y;
    assert_eq!(w, z);
    w -= y;
    assert_eq!(w, x);
    assert_eq!(z - y, x);
}

#[rstest]
fn test_multiply(x: Matrix<i32, 2, 2>, y: Matrix<i32, 2, 2>) {
    assert_eq!(x * Vector::new([3, 4]), Vector::new([99, 184]));
    assert_eq!(x * y, Matrix::new([[197, 131], [360, 248]]));
}

#[rstest]
fn test_scalar_multiply(x: Matrix<i32, 2, 2>) {
    let doubled = Matrix::new([[10, 42], [16, 80]]);

    assert_eq!(x * 2, doubled);
    assert_eq!(2 * x, doubled);

    let mut w = x;
    w *= 2;
    assert_eq!(w, doubled);
}

#[rstest]
fn test_transpose(x: Matrix<i32, 2, 2>) {
    assert_eq!(x.transpose(), Matrix::new([[5, 8], [21, 40]]));
    assert_eq!(x.transpose().transpose(), x);

    let mut out = Matrix::<i32, 2, 2>::from_element(-1);
    x.transpose_into(&mut out);
    assert_eq!(out, x.transpose());

    let wide = Matrix::new([[1, 2, 3], [4, 5, 6]]);
    assert_eq!(wide.transpose(), Matrix::new([[1, 4], [2, 5], [3, 6]]));
    assert_eq!(wide.transpose().transpose(), wide);
}

#[rstest]
fn test_eye_is_neutral(x: Matrix<i32, 2, 2>, grid: Matrix<i32, 4, 4>) {
    assert_eq!(x * Matrix::<i32, 2, 2>::eye(), x);
    assert_eq!(Matrix::<i32, 2, 2>::eye() * x, x);
    assert_eq!(grid * Matrix::<i32, 4, 4>::eye(), grid);
    assert_eq!(Matrix::<i32, 4, 4>::eye() * grid, grid);

    let wide = Matrix::new([[1, 2, 3], [4, 5, 6]]);
    assert_eq!(wide * Matrix::<i32, 3, 3>::eye(), wide);
    assert_eq!(Matrix::<i32, 2, 2>::eye() * wide, wide);
}

#[test]
fn test_lu_decomposition_2x2() {
    let a = Matrix::new([[5.0f32, 21.0], [8.0, 40.0]]);
    let (lower, upper) = a.lu();

    assert_relative_eq!(lower[(0, 0)], 1.0);
    assert_relative_eq!(lower[(0, 1)], 0.0);
    assert_relative_eq!(lower[(1, 0)], 1.6);
    assert_relative_eq!(lower[(1, 1)], 1.0);

    assert_relative_eq!(upper[(0, 0)], 5.0);
    assert_relative_eq!(upper[(0, 1)], 21.0);
    assert_relative_eq!(upper[(1, 0)], 0.0);
    assert_relative_eq!(upper[(1, 1)], 40.0 - 1.6 * 21.0, epsilon = EPS);
}

#[rstest]
fn test_lu_decomposition_3x3(square: Matrix<f32, 3, 3>) {
    let (lower, upper) = square.lu();

    let expected_lower = [
        [1.0, 0.0, 0.0],
        [-4.0 / 3.0, 1.0, 0.0],
        [10.0 / 3.0, -35.0 / 26.0, 1.0],
    ];
    let expected_upper = [
        [3.0, 7.0, 5.0],
        [0.0, 52.0 / 3.0, 23.0 / 3.0],
        [0.0, 0.0, 7.653_846],
    ];
    for row in 0..3 {
        for col in 0..3 {
            assert_relative_eq!(lower[(row, col)], expected_lower[row][col], epsilon = EPS);
            assert_relative_eq!(upper[(row, col)], expected_upper[row][col], epsilon = EPS);
        }
    }
}

#[rstest]
#[case::lu_example(Matrix::new([[3.0, 7.0, 5.0], [-4.0, 8.0, 1.0], [10.0, 0.0, 14.0]]))]
#[case::diagonally_dominant(Matrix::new([[4.0, 1.0, 0.5], [1.0, 5.0, 2.0], [0.5, 2.0, 6.0]]))]
#[case::negative_entries(Matrix::new([[-2.0, 1.0, 3.0], [4.0, -1.0, 0.5], [1.0, 2.0, -3.0]]))]
fn test_lu_round_trip(#[case] a: Matrix<f32, 3, 3>) {
    let (lower, upper) = a.lu();
    let product: SMatrix<f32, 3, 3> = (lower * upper).into();
    let expected: SMatrix<f32, 3, 3> = a.into();

    assert_relative_eq!(product, expected, epsilon = EPS);
}

#[rstest]
fn test_inverse(square: Matrix<f32, 3, 3>) {
    let inverse = square.inverse();
    let identity: SMatrix<f32, 3, 3> = (square * inverse).into();
    assert_relative_eq!(identity, SMatrix::identity(), epsilon = EPS);

    let reference = SMatrix::<f32, 3, 3>::from(square).try_inverse();
    let Some(reference) = reference else {
        panic!("nalgebra failed to invert a regular matrix");
    };
    assert_relative_eq!(SMatrix::<f32, 3, 3>::from(inverse), reference, epsilon = EPS);
    assert_eq!(square.try_inverse(), Some(inverse));
}

#[test]
fn test_try_inverse_singular() {
    let singular = Matrix::new([[1.0f32, 2.0, 3.0], [2.0, 4.0, 6.0], [1.0, 0.0, 1.0]]);
    assert_eq!(singular.try_inverse(), None);
}

#[rstest]
fn test_submat(square: Matrix<f32, 3, 3>) {
    let block = square.submat::<2, 2>(1, 1);

    assert_eq!(block[(0, 0)], 8.0);
    assert_eq!(block[(0, 1)], 1.0);
    assert_eq!(block[(1, 0)], 0.0);
    assert_eq!(block[(1, 1)], 14.0);
    assert_eq!(Matrix::from(block), Matrix::new([[8.0, 1.0], [0.0, 14.0]]));
}

#[rstest]
fn test_partition(grid: Matrix<i32, 4, 4>) {
    let blocks = grid.partition::<2, 2, 2, 2>();

    assert_eq!(blocks[(0, 0)].to_matrix(), Matrix::new([[3, 7], [-4, 8]]));
    assert_eq!(blocks[(0, 1)].to_matrix(), Matrix::new([[5, 2], [1, 0]]));
    assert_eq!(blocks[(1, 0)].to_matrix(), Matrix::new([[10, 0], [1, 3]]));
    assert_eq!(blocks[(1, 1)].to_matrix(), Matrix::new([[14, 4], [5, 7]]));

    let traces: i32 = blocks.iter().map(|block| block.to_matrix().trace()).sum();
    assert_eq!(traces, 11 + 5 + 13 + 21);
}

#[rstest]
fn test_write_through_submat(grid: Matrix<i32, 4, 4>) {
    let mut m = grid;
    m.submat_mut::<2, 2>(1, 2).fill(99);

    for row in 0..4 {
        for col in 0..4 {
            let inside = (1..3).contains(&row) && (2..4).contains(&col);
            let expected = if inside { 99 } else { grid[(row, col)] };
            assert_eq!(m[(row, col)], expected, "at ({row}, {col})");
        }
    }
}

#[rstest]
fn test_write_through_partition(grid: Matrix<i32, 4, 4>) {
    let mut m = grid;
    {
        let [[mut a, _], [_, mut d]] = m.partition_mut::<2, 2, 2, 2>().into_inner();
        a.copy_from(&Matrix::<i32, 2, 2>::eye());
        d += Matrix::<i32, 2, 2>::from_element(1);
    }

    assert_eq!(
        m,
        Matrix::new([[1, 0, 5, 2], [0, 1, 1, 0], [10, 0, 15, 5], [1, 3, 6, 8]])
    );
}

#[test]
fn test_vector_views() {
    let mut v = Vector::new([1, 2, 3, 4, 5, 6]);

    assert_eq!(v.subvec::<2>(3).to_vector(), Vector::new([4, 5]));
    let [a, b, c] = v.partition::<2, 3>();
    assert_eq!((a[1], b[0], c[1]), (2, 3, 6));

    v.subvec_mut::<3>(1).fill(0);
    assert_eq!(v, Vector::new([1, 0, 0, 0, 5, 6]));

    let [_, mut tail] = v.partition_mut::<3, 2>();
    tail.copy_from(&Vector::new([7, 8, 9]));
    assert_eq!(v, Vector::new([1, 0, 0, 7, 8, 9]));
}

#[rstest]
fn test_view_products(x: Matrix<i32, 2, 2>, grid: Matrix<i32, 4, 4>) {
    let block = grid.submat::<2, 3>(1, 1);

    assert_eq!(block * Vector::new([1, 2, 3]), Vector::new([10, 40]));
    assert_eq!(
        block * Matrix::new([[1, 0], [0, 1], [1, 1]]),
        Matrix::new([[8, 1], [4, 18]])
    );

    let v = Vector::new([1, 2, 3, 4, 5, 6]);
    let [_, tail] = v.partition::<3, 2>();
    assert_eq!(block * tail, Vector::new([37, 94]));
    assert_eq!(Matrix::new([[1, 0, 0], [0, 0, 1]]) * tail, Vector::new([4, 6]));

    let corner = grid.submat::<2, 2>(0, 0);
    assert_eq!(x * corner, Matrix::new([[-69, 203], [-136, 376]]));
    assert_eq!(x * corner, x * corner.to_matrix());
    assert_eq!(
        corner * grid.submat::<2, 2>(2, 2),
        Matrix::new([[77, 61], [-16, 40]])
    );

    assert_eq!(block + block, block.scale(2));
    assert_eq!(block - block.to_matrix(), Matrix::zeros());
    assert_eq!(tail + tail, tail.scale(2));
    assert_eq!(tail - Vector::new([1, 1, 1]), Vector::new([3, 4, 5]));
}

#[test]
fn test_nalgebra_conversions() {
    let m = Matrix::new([[1.0f64, 2.0], [3.0, 4.0]]);
    let n: SMatrix<f64, 2, 2> = m.into();

    assert_eq!(n[(1, 0)], 3.0);
    assert_eq!(Matrix::from(n), m);

    let v = Vector::new([1.0f64, 2.0, 3.0]);
    let w: nalgebra::Vector3<f64> = v.into();
    assert_eq!(w.y, 2.0);
    assert_eq!(Vector::from(w), v);
}

#[test]
#[should_panic]
fn test_from_row_slice_wrong_length() {
    let _ = Matrix::<i32, 2, 2>::from_row_slice(&[1, 2, 3]);
}

#[rstest]
#[should_panic]
fn test_submat_out_of_range(x: Matrix<i32, 2, 2>) {
    let _ = x.submat::<2, 2>(1, 0);
}

#[rstest]
#[should_panic]
fn test_index_out_of_range(x: Matrix<i32, 2, 2>) {
    let _ = x[(2, 0)];
}

#[test]
#[should_panic(expected = "2-element block at 5 exceeds 6-element vector")]
fn test_subvec_out_of_range() {
    let v = Vector::new([1, 2, 3, 4, 5, 6]);
    let _ = v.subvec::<2>(5);
}

#[test]
#[should_panic(expected = "4-element block at 3 exceeds 6-element vector")]
fn test_subvec_mut_out_of_range() {
    let mut v = Vector::new([1, 2, 3, 4, 5, 6]);
    let _ = v.subvec_mut::<4>(3);
}
