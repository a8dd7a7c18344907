//! Concurrency management for corpus runs.
//! Builds the bounded worker pool that extracts features from many files at once.

use anyhow::{Context, Result};
use rayon::ThreadPool;
use tracing::info;

/// Number of workers to use: the requested count, or half the cores (minimum 1).
pub fn worker_count(requested: Option<usize>) -> usize {
    match requested {
        Some(n) => n.max(1),
        None => std::cmp::max(1, num_cpus::get() / 2),
    }
}

/// Build a dedicated rayon pool for one corpus run.
pub fn build_worker_pool(requested: Option<usize>) -> Result<ThreadPool> {
    let workers = worker_count(requested);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("jast-worker-{}", i))
        .build()
        .context("Failed to build worker pool")?;

    info!(
        "Initialized worker pool: {} workers (system has {} cores)",
        workers,
        num_cpus::get()
    );

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_count_defaults_to_half_the_cores() {
        let expected = std::cmp::max(1, num_cpus::get() / 2);
        assert_eq!(worker_count(None), expected);
        assert_eq!(worker_count(Some(3)), 3);
        assert_eq!(worker_count(Some(0)), 1);
    }

    #[test]
    fn test_build_worker_pool() {
        let pool = build_worker_pool(Some(2)).unwrap();
        assert_eq!(pool.current_num_threads(), 2);
    }
}
