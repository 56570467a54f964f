//! Filter preview core: image buffers, transforms, and the pipeline that runs
//! a catalog of transforms over one source photo off the interactive thread.

pub mod color;
pub mod dispatch;
pub mod error;
pub mod image_buf;
pub mod loader;
pub mod pipeline;
mod sync;
pub mod transform;

pub use dispatch::{MainHandle, MainQueue};
pub use error::{InstantiationError, PipelineError, TransformFailed};
pub use image_buf::ImageBuf;
pub use pipeline::{
    Executor, FailurePolicy, FilterCell, FilterPipeline, PipelineBuilder, PipelineObserver,
    PipelineOptions, PipelineState, RunReport,
};
pub use transform::{Transform, TransformKind, TransformOp, TransformSpec};
