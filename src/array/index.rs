//! Indexing: integer/slice/ellipsis keys, decomposed left-to-right over a
//! tuple.

use crate::error::{AtError, AtResult};

use super::NdArray;

/// One element of a subscript tuple.
#[derive(Clone, Debug)]
pub enum Key {
    Int(i64),
    Slice {
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    },
    Ellipsis,
}

/// The result of indexing: a bare scalar (integer key exhausted every
/// axis) or a lower-dimensional array view-by-copy.
#[derive(Clone, Debug)]
pub enum Indexed<T> {
    Scalar(T),
    Array(NdArray<T>),
}

impl<T: Clone> NdArray<T> {
    /// Integer key on the leading axis: scalar if `ndim == 1`, else an
    /// `(ndim-1)`-D array view-by-copy.
    pub fn index_int(&self, i: i64) -> AtResult<Indexed<T>> {
        if self.ndim() == 0 {
            return Err(AtError::key_invalid("cannot index a 0-d array"));
        }
        let dim = self.shape[0] as i64;
        let idx = if i < 0 { i + dim } else { i };
        if idx < 0 || idx >= dim {
            return Err(AtError::index_out_of_range(format!(
                "index {i} out of range for axis 0 of size {dim}"
            )));
        }
        let idx = idx as usize;
        let sub_shape = self.shape[1..].to_vec();
        let sub_len: usize = sub_shape.iter().product::<usize>().max(1);
        let start = idx * sub_len;
        let slice = self.data[start..start + sub_len].to_vec();
        if sub_shape.is_empty() {
            Ok(Indexed::Scalar(slice[0].clone()))
        } else {
            Ok(Indexed::Array(NdArray {
                shape: sub_shape,
                data: slice,
            }))
        }
    }

    /// Python-style slice of the leading axis (negative `start`/`stop`,
    /// negative `step` all supported).
    pub fn index_slice(
        &self,
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    ) -> AtResult<Self> {
        if self.ndim() == 0 {
            return Err(AtError::key_invalid("cannot slice a 0-d array"));
        }
        let dim = self.shape[0] as i64;
        let step = step.unwrap_or(1);
        if step == 0 {
            return Err(AtError::key_invalid("slice step cannot be zero"));
        }
        let (default_start, default_stop) = if step > 0 { (0, dim) } else { (dim - 1, -1) };
        let clamp = |v: i64, lo: i64, hi: i64| v.clamp(lo, hi);
        let norm = |v: i64| if v < 0 { v + dim } else { v };

        let start = start.map(norm).unwrap_or(default_start);
        let stop = stop.map(norm).unwrap_or(default_stop);
        let (start, stop) = if step > 0 {
            (clamp(start, 0, dim), clamp(stop, 0, dim))
        } else {
            (clamp(start, -1, dim - 1), clamp(stop, -1, dim - 1))
        };

        let mut indices = Vec::new();
        let mut i = start;
        while (step > 0 && i < stop) || (step < 0 && i > stop) {
            indices.push(i as usize);
            i += step;
        }

        let sub_shape = self.shape[1..].to_vec();
        let sub_len: usize = sub_shape.iter().product::<usize>().max(1);
        let mut data = Vec::with_capacity(indices.len() * sub_len);
        for idx in &indices {
            let base = idx * sub_len;
            data.extend_from_slice(&self.data[base..base + sub_len]);
        }
        let mut new_shape = vec![indices.len()];
        new_shape.extend(sub_shape);
        Ok(Self {
            shape: new_shape,
            data,
        })
    }

    /// Decompose a tuple key left-to-right: integer/slice operations
    /// recurse into lower-dimensional sub-arrays; at most one [`Key::Ellipsis`]
    /// expands to enough full slices to fill the remaining dimensions.
    pub fn index_tuple(&self, keys: &[Key]) -> AtResult<Indexed<T>> {
        let ellipsis_count = keys.iter().filter(|k| matches!(k, Key::Ellipsis)).count();
        if ellipsis_count > 1 {
            return Err(AtError::key_invalid("at most one ellipsis is allowed"));
        }
        let non_ellipsis = keys.len() - ellipsis_count;
        if non_ellipsis > self.ndim() {
            return Err(AtError::key_invalid(format!(
                "key of length {} is longer than ndim {}",
                keys.len(),
                self.ndim()
            )));
        }

        let mut expanded: Vec<Key> = Vec::with_capacity(self.ndim());
        for key in keys {
            match key {
                Key::Ellipsis => {
                    let fill = self.ndim() - non_ellipsis;
                    for _ in 0..fill {
                        expanded.push(Key::Slice {
                            start: None,
                            stop: None,
                            step: None,
                        });
                    }
                }
                other => expanded.push(other.clone()),
            }
        }

        let mut current = Indexed::Array(self.clone());
        for key in expanded {
            let arr = match current {
                Indexed::Array(a) => a,
                Indexed::Scalar(_) => {
                    return Err(AtError::key_invalid("key is longer than ndim"));
                }
            };
            current = match key {
                Key::Int(i) => arr.index_int(i)?,
                Key::Slice { start, stop, step } => Indexed::Array(arr.index_slice(start, stop, step)?),
                Key::Ellipsis => unreachable!("ellipsis already expanded"),
            };
        }
        Ok(current)
    }
}
