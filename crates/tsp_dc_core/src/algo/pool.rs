use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    thread,
};

use crate::{Error, Result, constants::WORKER_THREAD_PREFIX};

const THREAD_FALLBACK_PARALLELISM: usize = 2;
const THREAD_MIN_PARALLELISM: usize = 2;
const THREAD_RESERVED_CORES: usize = 1;

/// Bounded work-stealing pool that runs divide-and-conquer sub-solves.
///
/// Built once by the caller and borrowed by every solver that needs it;
/// dropping it joins the worker threads. Blocking on child tasks inside the
/// pool is safe because a waiting worker steals and runs pending jobs
/// instead of idling.
pub struct SolverPool {
    pool: rayon::ThreadPool,
}

impl SolverPool {
    /// `threads == 0` picks [`SolverPool::default_threads`].
    pub fn new(threads: usize) -> Result<Self> {
        let threads = if threads == 0 {
            Self::default_threads()
        } else {
            threads
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|idx| format!("{WORKER_THREAD_PREFIX}-{idx}"))
            .build()
            .map_err(|e| Error::other(format!("rayon pool: {e}")))?;

        log::debug!("pool: created threads={threads}");
        Ok(Self { pool })
    }

    pub fn default_threads() -> usize {
        thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(THREAD_FALLBACK_PARALLELISM)
            .max(THREAD_MIN_PARALLELISM)
            - THREAD_RESERVED_CORES
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs `op` on the pool and waits for it. A panic anywhere in the task
    /// tree comes back as [`Error::TaskFailed`] instead of unwinding into the
    /// caller.
    pub fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send,
        F: FnOnce() -> Result<T> + Send,
    {
        panic::catch_unwind(AssertUnwindSafe(|| self.pool.install(op)))
            .unwrap_or_else(|payload| Err(Error::task_failed(panic_message(&*payload))))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        String::from("worker panicked")
    }
}
