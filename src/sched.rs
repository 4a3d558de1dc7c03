//! Bounded worker pool for array elementwise/reduction kernels.
//!
//! A pool sized to hardware parallelism (or a pool of one when threads
//! aren't available), with every dispatch blocking until its partitioned
//! work completes — no suspension points inside one scalar kernel call, no
//! persistent background work. `rayon` provides a pre-sized, work-stealing
//! pool that a `detach_loop`-style call partitions contiguous index ranges
//! across; it is the standard choice for bounded data-parallel fan-out over
//! array elementwise and reduction kernels.
//!
//! Determinism: [`WorkerPool::for_each_range`] only ever partitions *disjoint
//! contiguous* index ranges and never merges partial results itself —
//! callers combine per-range output in range order, so the observed
//! reduction order is the same C-order sequence regardless of how many
//! workers actually ran.

/// A bounded pool of worker threads, or a degenerate single-threaded
/// fallback.
pub struct WorkerPool {
    pool: Option<rayon::ThreadPool>,
}

impl WorkerPool {
    /// A pool sized to the host's available parallelism.
    pub fn new() -> Self {
        Self::with_threads(std::thread::available_parallelism().map_or(1, |n| n.get()))
    }

    /// A pool with exactly `threads` workers. `threads <= 1` selects the
    /// inline (no-thread) fallback, for targets where a thread pool is
    /// unusable and every call must run on the caller's thread.
    pub fn with_threads(threads: usize) -> Self {
        if threads <= 1 {
            return Self { pool: None };
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .expect("failed to build worker pool");
        Self { pool: Some(pool) }
    }

    /// A pool that never spawns threads — every dispatch runs inline on the
    /// caller. Used for small arrays where partitioning overhead would
    /// dominate, and by `WorkerPool::new` itself on targets without thread
    /// support.
    pub fn inline() -> Self {
        Self { pool: None }
    }

    pub fn thread_count(&self) -> usize {
        self.pool.as_ref().map_or(1, |p| p.current_num_threads())
    }

    /// Partition `0..len` into `thread_count()` contiguous ranges (the last
    /// absorbing any remainder) and call `f` once per range, in parallel if
    /// a real pool is present. Blocks until every range's call returns.
    ///
    /// `f` receives the `(start, end)` half-open range it owns; it must
    /// only touch output positions within that range so that concurrent
    /// calls never alias each other's writes.
    pub fn for_each_range<F>(&self, len: usize, f: F)
    where
        F: Fn(usize, usize) + Sync,
    {
        if len == 0 {
            return;
        }
        let threads = self.thread_count().max(1);
        let ranges = partition_ranges(len, threads);
        match &self.pool {
            None => {
                for (start, end) in ranges {
                    f(start, end);
                }
            }
            Some(pool) => pool.install(|| {
                use rayon::prelude::*;
                ranges.par_iter().for_each(|&(start, end)| f(start, end));
            }),
        }
    }

    /// Like [`Self::for_each_range`], but `f` returns the output values for
    /// its range instead of writing them in place; the per-range `Vec<T>`s
    /// are concatenated back together in range order, so the result is
    /// identical to running every range sequentially.
    pub fn map_ranges<T, F>(&self, len: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize, usize) -> Vec<T> + Sync,
    {
        if len == 0 {
            return Vec::new();
        }
        let threads = self.thread_count().max(1);
        let ranges = partition_ranges(len, threads);
        match &self.pool {
            None => ranges.into_iter().flat_map(|(start, end)| f(start, end)).collect(),
            Some(pool) => pool.install(|| {
                use rayon::prelude::*;
                ranges
                    .par_iter()
                    .map(|&(start, end)| f(start, end))
                    .collect::<Vec<_>>()
                    .into_iter()
                    .flatten()
                    .collect()
            }),
        }
    }
}

/// Below this many output elements, partitioning overhead dominates any
/// parallel speedup — run inline instead of spinning up a thread pool.
pub const PARALLEL_THRESHOLD: usize = 4096;

/// A pool sized to hardware parallelism for `len` output elements, or the
/// inline fallback when `len` is too small to be worth partitioning.
pub fn pool_for(len: usize) -> WorkerPool {
    if len >= PARALLEL_THRESHOLD {
        WorkerPool::new()
    } else {
        WorkerPool::inline()
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `0..len` into at most `parts` contiguous, non-empty, disjoint
/// ranges covering the whole span, as evenly as integer division allows.
fn partition_ranges(len: usize, parts: usize) -> Vec<(usize, usize)> {
    let parts = parts.min(len).max(1);
    let base = len / parts;
    let remainder = len % parts;
    let mut ranges = Vec::with_capacity(parts);
    let mut start = 0;
    for i in 0..parts {
        let size = base + if i < remainder { 1 } else { 0 };
        let end = start + size;
        ranges.push((start, end));
        start = end;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn partition_covers_every_index_exactly_once() {
        for len in [0usize, 1, 2, 3, 7, 100] {
            for parts in 1..=8 {
                let ranges = partition_ranges(len, parts);
                let mut covered = vec![false; len];
                for (s, e) in ranges {
                    for i in s..e {
                        assert!(!covered[i], "index {i} covered twice");
                        covered[i] = true;
                    }
                }
                assert!(covered.iter().all(|&c| c), "len={len} parts={parts}");
            }
        }
    }

    #[test]
    fn inline_pool_runs_every_range() {
        let pool = WorkerPool::inline();
        let out = Mutex::new(vec![0u32; 10]);
        pool.for_each_range(10, |start, end| {
            let mut out = out.lock().unwrap();
            for i in start..end {
                out[i] = i as u32;
            }
        });
        assert_eq!(*out.lock().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn threaded_pool_runs_every_range() {
        let pool = WorkerPool::with_threads(4);
        let out = Mutex::new(vec![0u32; 37]);
        pool.for_each_range(37, |start, end| {
            let mut out = out.lock().unwrap();
            for i in start..end {
                out[i] = (i * 2) as u32;
            }
        });
        let out = out.lock().unwrap();
        for (i, &v) in out.iter().enumerate() {
            assert_eq!(v, (i * 2) as u32);
        }
    }

    #[test]
    fn map_ranges_concatenates_in_order() {
        let pool = WorkerPool::with_threads(4);
        let out = pool.map_ranges(37, |start, end| (start..end).map(|i| (i * 2) as u32).collect());
        assert_eq!(out, (0..37).map(|i| (i * 2) as u32).collect::<Vec<_>>());
    }

    #[test]
    fn pool_for_selects_inline_below_threshold() {
        assert_eq!(pool_for(PARALLEL_THRESHOLD - 1).thread_count(), 1);
    }
}
