//! Reductions over the trailing axis: `sum`/`prod`/`cumsum`/`cumprod` and
//! their `nan*`-skipping variants.
//!
//! Exact word-length-widening and accumulator-option semantics are specific
//! to each scalar type ([`crate::fixed::FixedPoint`] widens its spec per
//! add/mul, [`crate::float::FloatPoint`] optionally promotes to a wider
//! accumulator via [`crate::context`]), so these functions take the
//! identity element and combining closure explicitly rather than requiring
//! a shared numeric trait — the same reasoning that makes
//! [`super::NdArray`] generic-over-element applies here too.
//!
//! Accumulation always proceeds in C (row-major) order so results are
//! reproducible independent of how many worker threads a caller's
//! `sched` pool happens to use.

use crate::error::{AtError, AtResult};
use crate::sched::pool_for;

use super::NdArray;

impl<T: Clone> NdArray<T> {
    /// Reduce the entire array to one value via `combine`, starting from
    /// `identity`, in C order.
    pub fn fold_all<A>(&self, identity: A, mut combine: impl FnMut(A, &T) -> A) -> A {
        self.as_slice().iter().fold(identity, |acc, x| combine(acc, x))
    }

    /// Reduce only over the last axis, producing an array with that axis
    /// dropped (or a scalar 0-d array if `ndim <= 1`).
    ///
    /// Each outer group's fold is independent of every other, so a bounded
    /// worker pool partitions the outer groups into contiguous ranges for
    /// arrays large enough that partitioning pays for itself; the
    /// per-range results are concatenated back in C order, so the output
    /// is bit-identical regardless of how many workers ran.
    pub fn fold_last_axis<A: Clone + Send + Sync>(
        &self,
        identity: A,
        combine: impl Fn(A, &T) -> A + Sync,
    ) -> AtResult<NdArray<A>>
    where
        T: Sync,
    {
        if self.ndim() == 0 {
            return Err(AtError::shape_mismatch("cannot reduce a 0-d array"));
        }
        let axis_len = *self.shape().last().unwrap();
        let outer_shape = &self.shape()[..self.ndim() - 1];
        let outer: usize = outer_shape.iter().product::<usize>().max(1);
        let axis_len = axis_len.max(1);
        let slice = self.as_slice();
        let pool = pool_for(self.len());
        let data = pool.map_ranges(outer, |start, end| {
            slice[start * axis_len..end * axis_len]
                .chunks(axis_len)
                .map(|chunk| chunk.iter().fold(identity.clone(), |acc, x| combine(acc, x)))
                .collect()
        });
        NdArray::new(outer_shape.to_vec(), data)
    }

    /// Running combine over the last axis; output shape matches input
    /// shape.
    pub fn scan_last_axis(&self, identity: T, mut combine: impl FnMut(&T, &T) -> T) -> AtResult<Self> {
        if self.ndim() == 0 {
            return Err(AtError::shape_mismatch("cannot scan a 0-d array"));
        }
        let axis_len = *self.shape().last().unwrap();
        let mut data = Vec::with_capacity(self.len());
        for chunk in self.as_slice().chunks(axis_len.max(1)) {
            let mut acc = identity.clone();
            for x in chunk {
                acc = combine(&acc, x);
                data.push(acc.clone());
            }
        }
        Ok(Self::new(self.shape().to_vec(), data).expect("same shape as input"))
    }

    /// Like [`Self::fold_last_axis`] but `skip` marks an element to be
    /// excluded from the fold entirely — the `nansum`/`nanprod` family,
    /// generalized past floating-point NaN to any caller-defined skip
    /// predicate.
    pub fn fold_last_axis_skipping<A: Clone>(
        &self,
        identity: A,
        mut skip: impl FnMut(&T) -> bool,
        mut combine: impl FnMut(A, &T) -> A,
    ) -> AtResult<NdArray<A>> {
        if self.ndim() == 0 {
            return Err(AtError::shape_mismatch("cannot reduce a 0-d array"));
        }
        let axis_len = *self.shape().last().unwrap();
        let outer_shape = &self.shape()[..self.ndim() - 1];
        let mut data = Vec::new();
        for chunk in self.as_slice().chunks(axis_len.max(1)) {
            let acc = chunk.iter().filter(|x| !skip(x)).fold(identity.clone(), |acc, x| combine(acc, x));
            data.push(acc);
        }
        NdArray::new(outer_shape.to_vec(), data)
    }

    /// Like [`Self::scan_last_axis`] but elements matching `skip` pass the
    /// running accumulator through unchanged instead of combining.
    pub fn scan_last_axis_skipping(
        &self,
        identity: T,
        mut skip: impl FnMut(&T) -> bool,
        mut combine: impl FnMut(&T, &T) -> T,
    ) -> AtResult<Self> {
        if self.ndim() == 0 {
            return Err(AtError::shape_mismatch("cannot scan a 0-d array"));
        }
        let axis_len = *self.shape().last().unwrap();
        let mut data = Vec::with_capacity(self.len());
        for chunk in self.as_slice().chunks(axis_len.max(1)) {
            let mut acc = identity.clone();
            for x in chunk {
                if !skip(x) {
                    acc = combine(&acc, x);
                }
                data.push(acc.clone());
            }
        }
        Ok(Self::new(self.shape().to_vec(), data).expect("same shape as input"))
    }
}
