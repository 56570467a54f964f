use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::PipelineError;

/// Where background transform work runs.
#[derive(Clone, Debug, Default)]
pub enum Executor {
    /// rayon's global pool.
    #[default]
    Global,
    /// A dedicated pool, shareable between pipelines.
    Pool(Arc<ThreadPool>),
}

impl Executor {
    pub fn dedicated(threads: usize) -> Result<Self, PipelineError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("prisma-worker-{i}"))
            .build()
            .map_err(|err| PipelineError::ThreadPool(err.to_string()))?;
        Ok(Executor::Pool(Arc::new(pool)))
    }

    /// Fire-and-forget. Parallel iterators inside `job` use the same pool.
    pub(crate) fn spawn(&self, job: impl FnOnce() + Send + 'static) {
        match self {
            Executor::Global => rayon::spawn(job),
            Executor::Pool(pool) => pool.spawn(job),
        }
    }
}
