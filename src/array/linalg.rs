//! Matrix multiply and 1-D convolution.

use crate::error::{AtError, AtResult};
use crate::sched::pool_for;

use super::NdArray;

/// Output-length convention for [`convolve1d`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConvolveMode {
    /// Length `M + N - 1`: every overlap, including partial ones.
    Full,
    /// Length `max(M, N)`: centered on the longer input.
    Same,
    /// Length `|M - N| + 1`: only full overlaps.
    Valid,
}

impl<T: Clone> NdArray<T> {
    /// `(M,N) x (N,K) -> (M,K)`, or `(N,) x (N,) -> ()` (a 0-d scalar
    /// array) when both operands are 1-D. `zero`/`mul`/`add`
    /// are supplied by the caller since exact accumulation semantics are
    /// scalar-type-specific (fixed-point word growth, float accumulator
    /// widening).
    pub fn matmul(
        &self,
        other: &Self,
        zero: impl Fn() -> T + Sync,
        mul: impl Fn(&T, &T) -> T + Sync,
        add: impl Fn(&T, &T) -> T + Sync,
    ) -> AtResult<Self>
    where
        T: Send + Sync,
    {
        match (self.ndim(), other.ndim()) {
            (1, 1) => {
                let n = self.shape()[0];
                if other.shape()[0] != n {
                    return Err(AtError::shape_mismatch(format!(
                        "matmul: vector lengths {} and {} differ",
                        n,
                        other.shape()[0]
                    )));
                }
                let a = self.as_slice();
                let b = other.as_slice();
                let mut acc = zero();
                for i in 0..n {
                    acc = add(&acc, &mul(&a[i], &b[i]));
                }
                Ok(Self::scalar(acc))
            }
            (2, 2) => {
                let (m, n) = (self.shape()[0], self.shape()[1]);
                let (n2, k) = (other.shape()[0], other.shape()[1]);
                if n != n2 {
                    return Err(AtError::shape_mismatch(format!(
                        "matmul: shapes {:?} and {:?} are not conformable",
                        self.shape(),
                        other.shape()
                    )));
                }
                let a = self.as_slice();
                let b = other.as_slice();
                // Column-major read of `b` would thrash cache; instead
                // accumulate row-by-row, copying each column of `b` out
                // once per output row rather than re-striding into `b` for
                // every (i, j) pair. Rows are independent, so a bounded
                // worker pool partitions them into contiguous row ranges
                // for arrays large enough that partitioning pays for
                // itself; the per-range results are concatenated back in
                // row order, so the output is bit-identical regardless of
                // how many workers ran.
                let pool = pool_for(m * k);
                let data = pool.map_ranges(m, |row_start, row_end| {
                    let mut col = vec![zero(); n];
                    let mut local = Vec::with_capacity((row_end - row_start) * k);
                    for i in row_start..row_end {
                        for j in 0..k {
                            for (t, c) in col.iter_mut().enumerate() {
                                *c = b[t * k + j].clone();
                            }
                            let mut acc = zero();
                            for t in 0..n {
                                acc = add(&acc, &mul(&a[i * n + t], &col[t]));
                            }
                            local.push(acc);
                        }
                    }
                    local
                });
                Ok(Self::new(vec![m, k], data).expect("shape/data length match by construction"))
            }
            _ => Err(AtError::shape_mismatch(
                "matmul requires two 1-D operands or two 2-D operands",
            )),
        }
    }

    /// 1-D convolution of `self` (length `M`) with `kernel` (length `N`),
    /// per `mode`'s output-length convention.
    pub fn convolve1d(
        &self,
        kernel: &Self,
        mode: ConvolveMode,
        zero: impl Fn() -> T,
        mul: impl Fn(&T, &T) -> T,
        add: impl Fn(&T, &T) -> T,
    ) -> AtResult<Self> {
        if self.ndim() != 1 || kernel.ndim() != 1 {
            return Err(AtError::shape_mismatch("convolve1d requires two 1-D operands"));
        }
        let a = self.as_slice();
        let b = kernel.as_slice();
        let (m, n) = (a.len(), b.len());
        if m == 0 || n == 0 {
            return Err(AtError::shape_mismatch("convolve1d operands must be non-empty"));
        }

        let full_len = m + n - 1;
        let mut full = Vec::with_capacity(full_len);
        for out in 0..full_len {
            let mut acc = zero();
            let lo = out.saturating_sub(n - 1);
            let hi = out.min(m - 1);
            let mut i = lo;
            while i <= hi {
                acc = add(&acc, &mul(&a[i], &b[out - i]));
                i += 1;
            }
            full.push(acc);
        }

        let (start, len) = match mode {
            ConvolveMode::Full => (0, full_len),
            ConvolveMode::Same => {
                let len = m.max(n);
                let start = (full_len - len) / 2;
                (start, len)
            }
            ConvolveMode::Valid => {
                let len = m.max(n) - m.min(n) + 1;
                let start = m.min(n) - 1;
                (start, len)
            }
        };
        Ok(Self::new(vec![len], full[start..start + len].to_vec())
            .expect("shape/data length match by construction"))
    }
}
