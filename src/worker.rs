use crate::config::Config;
use crate::error::GachaError;
use log::{error, info};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::panic::{self, AssertUnwindSafe};

const DEFAULT_STACK_MB: usize = 4;

/// Dedicated rayon pool for batch simulations.
pub struct WorkerPool {
    pool: ThreadPool,
    num_threads: usize,
}

impl WorkerPool {
    #[cfg(test)]
    pub fn new(num_threads: usize) -> Result<Self, GachaError> {
        Self::build_pool(num_threads.max(1), DEFAULT_STACK_MB * 1024 * 1024)
    }

    /// Leaves `worker_reserve_cores` free, capped by `worker_max_threads` (0 = no cap).
    pub fn new_with_config(config: &Config) -> Result<Self, GachaError> {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        let mut num_threads = if cores > config.worker_reserve_cores {
            cores - config.worker_reserve_cores
        } else {
            1
        };
        if config.worker_max_threads > 0 && num_threads > config.worker_max_threads {
            num_threads = config.worker_max_threads;
        }
        let stack_mb = if config.worker_stack_size_mb == 0 {
            DEFAULT_STACK_MB
        } else {
            config.worker_stack_size_mb
        };
        Self::build_pool(num_threads, stack_mb * 1024 * 1024)
    }

    fn build_pool(num_threads: usize, stack_size: usize) -> Result<Self, GachaError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("summon-worker-{}", i))
            .stack_size(stack_size)
            .panic_handler(|err| {
                error!("Worker thread panicked: {:?}", err);
            })
            .build()
            .map_err(|e| GachaError::Worker(e.to_string()))?;

        info!("Worker pool initialized with {} threads", num_threads);

        Ok(Self { pool, num_threads })
    }

    /// Runs `f` inside the pool; a panic comes back as `GachaError::Worker`.
    pub fn execute<F, R>(&self, f: F) -> Result<R, GachaError>
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool
            .install(|| panic::catch_unwind(AssertUnwindSafe(f)))
            .map_err(|err| {
                let msg = if let Some(s) = err.downcast_ref::<&str>() {
                    format!("task panicked: {}", s)
                } else if let Some(s) = err.downcast_ref::<String>() {
                    format!("task panicked: {}", s)
                } else {
                    "task panicked with unknown payload".to_string()
                };
                GachaError::Worker(msg)
            })
    }

    pub fn thread_count(&self) -> usize {
        self.num_threads
    }
}
