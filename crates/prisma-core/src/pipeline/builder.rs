use std::sync::{Arc, Weak};

use tracing::warn;

use crate::dispatch::MainHandle;
use crate::error::InstantiationError;
use crate::image_buf::ImageBuf;
use crate::pipeline::{Executor, FailurePolicy, FilterPipeline, PipelineObserver, PipelineOptions};
use crate::transform::TransformSpec;

/// Configures a [`FilterPipeline`] with its observer wired up front.
///
/// If the catalog cannot be built, `build` returns the error and also
/// posts it to the observer on the interactive thread, once.
pub struct PipelineBuilder {
    source: Arc<ImageBuf>,
    main: MainHandle,
    specs: Vec<TransformSpec>,
    observer: Option<Weak<dyn PipelineObserver>>,
    options: PipelineOptions,
}

impl PipelineBuilder {
    pub(crate) fn new(source: Arc<ImageBuf>, main: MainHandle) -> Self {
        Self {
            source,
            main,
            specs: Vec::new(),
            observer: None,
            options: PipelineOptions::default(),
        }
    }

    pub fn spec(mut self, spec: TransformSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn specs(mut self, specs: impl IntoIterator<Item = TransformSpec>) -> Self {
        self.specs.extend(specs);
        self
    }

    pub fn observer<O: PipelineObserver + 'static>(mut self, observer: &Arc<O>) -> Self {
        let weak: Weak<O> = Arc::downgrade(observer);
        let weak: Weak<dyn PipelineObserver> = weak;
        self.observer = Some(weak);
        self
    }

    pub fn options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.options.failure_policy = policy;
        self
    }

    pub fn executor(mut self, executor: Executor) -> Self {
        self.options.executor = executor;
        self
    }

    pub fn build(self) -> Result<FilterPipeline, InstantiationError> {
        match FilterPipeline::configure(self.source, &self.specs, self.main.clone(), self.options) {
            Ok(pipeline) => {
                if let Some(observer) = self.observer {
                    pipeline.set_observer_weak(observer);
                }
                Ok(pipeline)
            }
            Err(err) => {
                if let Some(observer) = self.observer {
                    let reported = err.clone();
                    self.main.post(move || match observer.upgrade() {
                        Some(observer) => observer.on_pipeline_result(Err(reported.into())),
                        None => warn!("observer gone, dropping configuration failure"),
                    });
                }
                Err(err)
            }
        }
    }
}
