//! N-dimensional arrays over any scalar type.
//!
//! This is a single generic container parameterized over the element type
//! rather than a CRTP mixin shared across four concrete array classes:
//! `NdArray<T>` works
//! identically whether `T` is [`crate::fixed::FixedPoint`],
//! [`crate::float::FloatPoint`], one of the complex scalars, or a plain
//! `f64` (used internally by tests and by `to_numpy`-style conversions).
//! Anywhere a CRTP mixin would call into a virtual `create_scalar`/
//! `create_array` method, this crate instead takes the zero value,
//! combine closure, etc. as an explicit argument — see [`reduce`],
//! [`linalg`], [`factory`].

mod broadcast;
mod factory;
mod index;
mod linalg;
mod reduce;

pub use broadcast::broadcast_shapes;
pub use factory::{arange, eye, full, identity, meshgrid, ones, zeros, MeshIndexing};
pub use index::{Indexed, Key};
pub use linalg::ConvolveMode;

use crate::error::{AtError, AtResult};

/// Row-major (C-contiguous) dense array of `T`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NdArray<T> {
    shape: Vec<usize>,
    data: Vec<T>,
}

impl<T: Clone> NdArray<T> {
    pub fn new(shape: Vec<usize>, data: Vec<T>) -> AtResult<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(AtError::value_invalid(format!(
                "shape {shape:?} implies {expected} elements, got {}",
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    pub fn scalar(value: T) -> Self {
        Self {
            shape: vec![],
            data: vec![value],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// `itemsize · suffix_product(shape)`, i.e. the row-major strides in
    /// units of elements.
    pub fn strides(&self) -> Vec<usize> {
        suffix_product(&self.shape)
    }

    pub fn get(&self, coords: &[usize]) -> AtResult<&T> {
        Ok(&self.data[self.flat_index(coords)?])
    }

    fn flat_index(&self, coords: &[usize]) -> AtResult<usize> {
        if coords.len() != self.shape.len() {
            return Err(AtError::index_out_of_range(format!(
                "expected {} coordinates, got {}",
                self.shape.len(),
                coords.len()
            )));
        }
        let strides = self.strides();
        let mut flat = 0usize;
        for (axis, (&c, (&dim, &stride))) in coords
            .iter()
            .zip(self.shape.iter().zip(strides.iter()))
            .enumerate()
        {
            if c >= dim {
                return Err(AtError::index_out_of_range(format!(
                    "index {c} out of range for axis {axis} of size {dim}"
                )));
            }
            flat += c * stride;
        }
        Ok(flat)
    }

    /// Validate the product of `new_shape` (with at most one `-1` resolved
    /// against the element count) matches `self.len()`, then copy the data
    /// unchanged — C-order guarantees the flattened sequence is invariant.
    pub fn reshape(&self, new_shape: &[i64]) -> AtResult<Self> {
        let mut resolved = new_shape.to_vec();
        let neg_count = resolved.iter().filter(|&&d| d == -1).count();
        if neg_count > 1 {
            return Err(AtError::value_invalid(
                "reshape accepts at most one -1 placeholder",
            ));
        }
        if resolved.iter().any(|&d| d < -1) {
            return Err(AtError::value_invalid("reshape dimensions must be >= -1"));
        }
        if neg_count == 1 {
            let known: i64 = resolved.iter().filter(|&&d| d != -1).product();
            if known == 0 || self.len() % known as usize != 0 {
                return Err(AtError::value_invalid(
                    "reshape: -1 placeholder is not evenly determined",
                ));
            }
            let inferred = self.len() as i64 / known;
            for d in resolved.iter_mut() {
                if *d == -1 {
                    *d = inferred;
                }
            }
        }
        let shape: Vec<usize> = resolved.iter().map(|&d| d as usize).collect();
        let expected: usize = shape.iter().product();
        if expected != self.len() {
            return Err(AtError::value_invalid(format!(
                "cannot reshape array of {} elements into shape {:?}",
                self.len(),
                shape
            )));
        }
        Ok(Self {
            shape,
            data: self.data.clone(),
        })
    }

    /// `ndim <= 1`: copy unchanged. `ndim == 2`: direct transposed copy.
    /// Otherwise apply `perm` (default: axis reversal).
    pub fn transpose(&self, perm: Option<&[usize]>) -> AtResult<Self> {
        if self.ndim() <= 1 {
            return Ok(self.clone());
        }
        let perm: Vec<usize> = match perm {
            Some(p) => p.to_vec(),
            None => (0..self.ndim()).rev().collect(),
        };
        if perm.len() != self.ndim() {
            return Err(AtError::value_invalid(format!(
                "permutation length {} does not match ndim {}",
                perm.len(),
                self.ndim()
            )));
        }
        let new_shape: Vec<usize> = perm.iter().map(|&axis| self.shape[axis]).collect();
        let src_strides = self.strides();
        let dst_count: usize = new_shape.iter().product();
        let mut data: Vec<T> = Vec::with_capacity(dst_count);
        let mut dst_coords = vec![0usize; self.ndim()];
        for _ in 0..dst_count {
            let mut src_flat = 0usize;
            for (dst_axis, &src_axis) in perm.iter().enumerate() {
                src_flat += dst_coords[dst_axis] * src_strides[src_axis];
            }
            data.push(self.data[src_flat].clone());
            increment_coords(&mut dst_coords, &new_shape);
        }
        Ok(Self {
            shape: new_shape,
            data,
        })
    }

    /// Drop size-1 axes. `axes = None` drops every one; `Some(axes)` drops
    /// only those, erroring if any named axis has size != 1.
    pub fn squeeze(&self, axes: Option<&[usize]>) -> AtResult<Self> {
        let to_drop: Vec<bool> = match axes {
            None => self.shape.iter().map(|&d| d == 1).collect(),
            Some(axes) => {
                let mut mask = vec![false; self.ndim()];
                for &axis in axes {
                    if axis >= self.ndim() {
                        return Err(AtError::index_out_of_range(format!(
                            "squeeze axis {axis} out of range for ndim {}",
                            self.ndim()
                        )));
                    }
                    if self.shape[axis] != 1 {
                        return Err(AtError::value_invalid(format!(
                            "cannot squeeze axis {axis} of size {}",
                            self.shape[axis]
                        )));
                    }
                    mask[axis] = true;
                }
                mask
            }
        };
        let new_shape: Vec<usize> = self
            .shape
            .iter()
            .zip(to_drop.iter())
            .filter(|(_, &drop)| !drop)
            .map(|(&d, _)| d)
            .collect();
        Ok(Self {
            shape: new_shape,
            data: self.data.clone(),
        })
    }
}

/// `itemsize · suffix_product(shape)`: `strides[i] = product(shape[i+1..])`.
fn suffix_product(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Increment a C-order coordinate vector in place (odometer increment),
/// wrapping each axis against `shape`.
fn increment_coords(coords: &mut [usize], shape: &[usize]) {
    for axis in (0..shape.len()).rev() {
        coords[axis] += 1;
        if coords[axis] < shape[axis] {
            return;
        }
        coords[axis] = 0;
    }
}
