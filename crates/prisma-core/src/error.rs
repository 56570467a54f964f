use thiserror::Error;

/// The transform catalog could not be built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InstantiationError {
    #[error("unknown transform kind `{0}`")]
    UnknownKind(String),
    #[error("invalid `{param}` for {kind}: {value}")]
    InvalidParameter {
        kind: &'static str,
        param: &'static str,
        value: f32,
    },
    #[error("source image is empty ({width}x{height})")]
    EmptySource { width: u32, height: u32 },
}

/// A single transform ran but produced no output.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("transform `{name}` failed: {reason}")]
pub struct TransformFailed {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Instantiation(#[from] InstantiationError),
    #[error(transparent)]
    TransformFailed(#[from] TransformFailed),
    #[error("a run is already in flight (run {0})")]
    RunInFlight(u64),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}
