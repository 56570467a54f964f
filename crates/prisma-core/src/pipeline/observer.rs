use crate::error::PipelineError;
use crate::pipeline::RunReport;

/// Receives the aggregate result of a pipeline run.
///
/// Always called on the interactive thread, at most once per run. The
/// pipeline holds observers weakly and never keeps one alive.
pub trait PipelineObserver: Send + Sync {
    fn on_pipeline_result(&self, outcome: Result<RunReport, PipelineError>);
}

impl<F> PipelineObserver for F
where
    F: Fn(Result<RunReport, PipelineError>) + Send + Sync,
{
    fn on_pipeline_result(&self, outcome: Result<RunReport, PipelineError>) {
        self(outcome)
    }
}
