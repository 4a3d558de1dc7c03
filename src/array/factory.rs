//! Array factories: `zeros`/`ones`/`full`/`eye`/`identity`/`arange`/
//! `meshgrid`.
//!
//! Parameterized by explicit zero/one/successor closures rather than a
//! numeric trait bound, for the same reason [`super::reduce`] and
//! [`super::linalg`] are: fixed-point and floating-point "one" and
//! "successor" depend on a runtime-chosen spec, not just the Rust type.

use crate::error::{AtError, AtResult};

use super::NdArray;

/// Axis ordering for [`meshgrid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshIndexing {
    /// First two output dimensions are swapped relative to the input
    /// order (numpy/matplotlib's default for 2-D plotting).
    Xy,
    /// Output dimensions follow input order directly.
    Ij,
}

pub fn zeros<T: Clone>(shape: Vec<usize>, zero: T) -> NdArray<T> {
    let len: usize = shape.iter().product();
    NdArray::new(shape, vec![zero; len]).expect("shape/data length match by construction")
}

pub fn full<T: Clone>(shape: Vec<usize>, value: T) -> NdArray<T> {
    let len: usize = shape.iter().product();
    NdArray::new(shape, vec![value; len]).expect("shape/data length match by construction")
}

/// Alias for [`full`] under the name numpy-style code expects: `ones`.
pub fn ones<T: Clone>(shape: Vec<usize>, one: T) -> NdArray<T> {
    full(shape, one)
}

/// `n x m` matrix with `one` on the main diagonal (positions `(i, i)` for
/// `i < min(n, m)`), `zero` elsewhere. Square when `n == m`.
pub fn eye<T: Clone>(n: usize, m: usize, zero: T, one: T) -> NdArray<T> {
    let mut data = vec![zero; n * m];
    for (i, slot) in data.iter_mut().enumerate().step_by(m + 1).take(n.min(m)) {
        *slot = one.clone();
    }
    NdArray::new(vec![n, m], data).expect("shape/data length match by construction")
}

/// Square specialization of [`eye`] under the name numpy-style code
/// expects: `identity`.
pub fn identity<T: Clone>(n: usize, zero: T, one: T) -> NdArray<T> {
    eye(n, n, zero, one)
}

/// `count` values starting at `start`, each produced from the previous via
/// `succ`.
pub fn arange<T: Clone>(start: T, count: usize, mut succ: impl FnMut(&T) -> T) -> NdArray<T> {
    let mut data = Vec::with_capacity(count);
    let mut cur = start;
    for i in 0..count {
        if i > 0 {
            cur = succ(&cur);
        }
        data.push(cur.clone());
    }
    NdArray::new(vec![count], data).expect("shape/data length match by construction")
}

/// Cartesian-product coordinate grids from 1-D input vectors: `n` inputs
/// of lengths `(l0, .., l_{n-1})` produce `n` output
/// arrays all of shape `(l0, .., l_{n-1})` (or with the first two axes
/// swapped under [`MeshIndexing::Xy`]), each broadcasting one input vector
/// across every other axis.
pub fn meshgrid<T: Clone>(inputs: &[NdArray<T>], indexing: MeshIndexing) -> AtResult<Vec<NdArray<T>>> {
    for (i, arr) in inputs.iter().enumerate() {
        if arr.ndim() != 1 {
            return Err(AtError::shape_mismatch(format!(
                "meshgrid input {i} must be 1-D, got ndim {}",
                arr.ndim()
            )));
        }
    }
    let lens: Vec<usize> = inputs.iter().map(|a| a.len()).collect();
    let mut shape = lens.clone();
    if indexing == MeshIndexing::Xy && shape.len() >= 2 {
        shape.swap(0, 1);
    }
    let total: usize = shape.iter().product();

    let mut outputs = Vec::with_capacity(inputs.len());
    for (axis, input) in inputs.iter().enumerate() {
        let out_axis = if indexing == MeshIndexing::Xy && axis < 2 && shape.len() >= 2 {
            1 - axis
        } else {
            axis
        };
        let mut data = Vec::with_capacity(total);
        let mut coords = vec![0usize; shape.len()];
        for _ in 0..total {
            data.push(input.as_slice()[coords[out_axis]].clone());
            super::increment_coords(&mut coords, &shape);
        }
        outputs.push(NdArray::new(shape.clone(), data).expect("shape/data length match by construction"));
    }
    Ok(outputs)
}
