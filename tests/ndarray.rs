use apytypes::array::{self, ConvolveMode, Indexed, Key, MeshIndexing, NdArray};

fn zero() -> i64 {
    0
}
fn mul(a: &i64, b: &i64) -> i64 {
    a * b
}
fn add(a: &i64, b: &i64) -> i64 {
    a + b
}

/// Array matmul: `[[1,2],[3,4]] x [[5,6],[7,8]] = [[19,22],[43,50]]`.
#[test]
fn matmul_2x2_matches_expected_product() {
    let a = NdArray::new(vec![2, 2], vec![1, 2, 3, 4]).unwrap();
    let b = NdArray::new(vec![2, 2], vec![5, 6, 7, 8]).unwrap();
    let product = a.matmul(&b, zero, mul, add).unwrap();
    assert_eq!(product.as_slice(), &[19, 22, 43, 50]);
}

/// Array convolve-full: `[1,2,3] * [4,5] = [4,13,22,15]`.
#[test]
fn convolve_full_matches_expected_sequence() {
    let a = NdArray::new(vec![3], vec![1, 2, 3]).unwrap();
    let b = NdArray::new(vec![2], vec![4, 5]).unwrap();
    let out = a.convolve1d(&b, ConvolveMode::Full, zero, mul, add).unwrap();
    assert_eq!(out.as_slice(), &[4, 13, 22, 15]);
}

#[test]
fn broadcast_add_replicates_row_vector_across_matrix() {
    let matrix = NdArray::new(vec![2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
    let row = NdArray::new(vec![3], vec![10, 20, 30]).unwrap();
    let target = array::broadcast_shapes(matrix.shape(), row.shape()).unwrap();
    let row_b = row.broadcast_to(&target).unwrap();
    let matrix_b = matrix.broadcast_to(&target).unwrap();
    let sum: Vec<i64> = matrix_b
        .as_slice()
        .iter()
        .zip(row_b.as_slice())
        .map(|(a, b)| a + b)
        .collect();
    assert_eq!(sum, vec![11, 22, 33, 14, 25, 36]);
}

#[test]
fn reshape_then_transpose_round_trips() {
    let a = NdArray::new(vec![2, 3], (0..6).collect()).unwrap();
    let reshaped = a.reshape(&[3, 2]).unwrap();
    let transposed = reshaped.transpose(None).unwrap();
    assert_eq!(transposed.shape(), &[2, 3]);
}

#[test]
fn tuple_indexing_with_ellipsis_selects_inner_slice() {
    let a = NdArray::new(vec![2, 3, 4], (0..24).collect()).unwrap();
    match a.index_tuple(&[Key::Int(0), Key::Ellipsis, Key::Int(1)]).unwrap() {
        Indexed::Array(sub) => assert_eq!(sub.shape(), &[4]),
        Indexed::Scalar(_) => panic!("expected array"),
    }
}

#[test]
fn cumsum_matches_running_total_per_row() {
    let a = NdArray::new(vec![2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
    let cum = a.scan_last_axis(0i64, |acc, &x| acc + x).unwrap();
    assert_eq!(cum.as_slice(), &[1, 3, 6, 4, 9, 15]);
}

#[test]
fn factories_build_expected_shapes_and_values() {
    let zeros = array::zeros(vec![2, 2], 0i64);
    assert_eq!(zeros.as_slice(), &[0, 0, 0, 0]);

    let identity = array::identity(3, 0i64, 1i64);
    assert_eq!(identity.as_slice(), &[1, 0, 0, 0, 1, 0, 0, 0, 1]);

    let range = array::arange(0i64, 4, |x| x + 3);
    assert_eq!(range.as_slice(), &[0, 3, 6, 9]);
}

#[test]
fn meshgrid_xy_matches_numpy_style_axis_swap() {
    let x = NdArray::new(vec![2], vec![1i64, 2]).unwrap();
    let y = NdArray::new(vec![2], vec![10i64, 20]).unwrap();
    let grids = array::meshgrid(&[x, y], MeshIndexing::Xy).unwrap();
    assert_eq!(grids[0].shape(), &[2, 2]);
    assert_eq!(grids[0].as_slice(), &[1, 2, 1, 2]);
    assert_eq!(grids[1].as_slice(), &[10, 10, 20, 20]);
}

#[test]
fn squeeze_rejects_non_unit_named_axis() {
    let a = NdArray::new(vec![1, 3], (0..3).collect()).unwrap();
    assert!(a.squeeze(Some(&[1])).is_err());
}
