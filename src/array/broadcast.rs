//! Broadcasting: trailing-dimension-aligned shape compatibility.

use crate::error::{AtError, AtResult};

use super::NdArray;

/// Right-align `a` and `b`, then take the elementwise max of each aligned
/// pair; a size-1 axis stretches to match its partner. Two axes that are
/// neither equal nor size-1 are incompatible.
pub fn broadcast_shapes(a: &[usize], b: &[usize]) -> AtResult<Vec<usize>> {
    let ndim = a.len().max(b.len());
    let mut out = vec![0usize; ndim];
    for i in 0..ndim {
        let da = *a.iter().rev().nth(i).unwrap_or(&1);
        let db = *b.iter().rev().nth(i).unwrap_or(&1);
        let d = if da == db {
            da
        } else if da == 1 {
            db
        } else if db == 1 {
            da
        } else {
            return Err(AtError::shape_mismatch(format!(
                "shapes {a:?} and {b:?} are not broadcastable"
            )));
        };
        out[ndim - 1 - i] = d;
    }
    Ok(out)
}

impl<T: Clone> NdArray<T> {
    /// Materialize a broadcast copy of `self` against `target_shape`.
    /// `target_shape` must already be a valid broadcast
    /// result that includes `self.shape()`.
    pub fn broadcast_to(&self, target_shape: &[usize]) -> AtResult<Self> {
        let ndim = target_shape.len();
        if ndim < self.ndim() {
            return Err(AtError::shape_mismatch(format!(
                "cannot broadcast shape {:?} to {:?}",
                self.shape(),
                target_shape
            )));
        }
        let mut padded = vec![1usize; ndim - self.ndim()];
        padded.extend_from_slice(self.shape());
        for (axis, (&src, &dst)) in padded.iter().zip(target_shape.iter()).enumerate() {
            if src != dst && src != 1 {
                return Err(AtError::shape_mismatch(format!(
                    "axis {axis}: size {src} cannot broadcast to {dst}"
                )));
            }
        }

        let src_strides = {
            let mut s = suffix_strides(&padded);
            for (axis, &dim) in padded.iter().enumerate() {
                if dim == 1 {
                    s[axis] = 0;
                }
            }
            s
        };

        let count: usize = if ndim == 0 { 1 } else { target_shape.iter().product() };
        let mut data = Vec::with_capacity(count);
        let mut coords = vec![0usize; ndim];
        for _ in 0..count {
            let mut flat = 0usize;
            for axis in 0..ndim {
                flat += coords[axis] * src_strides[axis];
            }
            data.push(self.as_slice()[flat].clone());
            super::increment_coords(&mut coords, target_shape);
        }
        Ok(Self::new(target_shape.to_vec(), data).expect("shape/data length match by construction"))
    }
}

fn suffix_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}
