//! Band-parallel execution with Rayon
//!
//! Output rows are split into disjoint bands; each band only reads the shared
//! input image, so no synchronization is needed inside one image.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use super::{BandKernel, Probe};
use crate::error::{MorphError, Result};
use crate::models::BinaryImage;

/// Where the pixel loop runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Exec {
    /// Caller's thread
    Sequential,
    /// Current Rayon pool
    Parallel,
}

/// Run a kernel over the whole output buffer
pub(crate) fn run<K: BandKernel>(
    kernel: &K,
    src: &BinaryImage,
    probe: Probe,
    out: &mut [u8],
    exec: Exec,
) {
    match exec {
        Exec::Sequential => kernel.fill_band(src, probe, 0, out),
        Exec::Parallel => {
            let rows = kernel.band_rows().max(1);
            out.par_chunks_mut(src.width() * rows)
                .enumerate()
                .for_each(|(band, slice)| kernel.fill_band(src, probe, band * rows, slice));
        }
    }
}

/// Worker pools keyed by thread count, built on first use
pub(crate) struct PoolCache {
    pools: Mutex<HashMap<usize, Arc<ThreadPool>>>,
}

impl PoolCache {
    pub fn new() -> Self {
        Self {
            pools: Mutex::new(HashMap::new()),
        }
    }

    /// Pool with exactly `threads` workers
    pub fn get(&self, threads: usize) -> Result<Arc<ThreadPool>> {
        if threads == 0 {
            return Err(MorphError::InvalidThreadCount);
        }

        let mut pools = self.pools.lock();
        if let Some(pool) = pools.get(&threads) {
            return Ok(Arc::clone(pool));
        }

        debug!("Building worker pool with {} threads", threads);
        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("morph-worker-{}", i))
                .build()?,
        );
        pools.insert(threads, Arc::clone(&pool));
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_cache_reuses_pools() {
        let cache = PoolCache::new();
        let a = cache.get(2).unwrap();
        let b = cache.get(2).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.current_num_threads(), 2);

        let c = cache.get(3).unwrap();
        assert_eq!(c.current_num_threads(), 3);
    }

    #[test]
    fn test_pool_cache_rejects_zero() {
        let cache = PoolCache::new();
        assert!(matches!(cache.get(0), Err(MorphError::InvalidThreadCount)));
    }
}
