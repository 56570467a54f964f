mod builder;
mod executor;
mod observer;


use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::dispatch::MainHandle;
use crate::error::{InstantiationError, PipelineError, TransformFailed};
use crate::image_buf::ImageBuf;
use crate::sync::lock;
use crate::transform::{Transform, TransformSpec};

pub use builder::PipelineBuilder;
pub use executor::Executor;
pub use observer::PipelineObserver;

/// What a run reports when some transforms fail.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// The run succeeds; failures are listed in [`RunReport::failed`].
    #[default]
    Tolerate,
    /// Any failure fails the run with the first failure in display order.
    FailBatch,
}

impl FailurePolicy {
    fn outcome(self, report: RunReport) -> Result<RunReport, PipelineError> {
        if self == FailurePolicy::FailBatch
            && let Some(first) = report.failed.first()
        {
            return Err(PipelineError::TransformFailed(first.clone()));
        }
        Ok(report)
    }
}

#[derive(Clone, Debug, Default)]
pub struct PipelineOptions {
    pub executor: Executor,
    pub failure_policy: FailurePolicy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Ready,
    Running,
    Completed,
}

/// Summary of one finished run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    pub run: u64,
    /// Transforms that produced an output.
    pub completed: usize,
    /// Failures, in display order.
    pub failed: Vec<TransformFailed>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One grid cell: display name and filtered image, if the transform produced one.
#[derive(Clone, Debug)]
pub struct FilterCell {
    pub name: String,
    pub image: Option<Arc<ImageBuf>>,
}

/// Runs a fixed set of transforms over one source image.
///
/// ```text
/// configure -> Ready -> run_all -> Running -> Completed -> run_all ...
///                                     |
///                       background pool, one job per run,
///                       transforms in parallel, joined,
///                       then one notification on the interactive thread
/// ```
///
/// At most one run is in flight; overlapping calls get
/// [`PipelineError::RunInFlight`]. A run counts as in flight until its
/// notification has been taken on the interactive thread.
pub struct FilterPipeline {
    shared: Arc<Shared>,
    executor: Executor,
}

struct Shared {
    source: Arc<ImageBuf>,
    transforms: Vec<Transform>,
    output_images: Mutex<Vec<Arc<ImageBuf>>>,
    observer: Mutex<Option<Weak<dyn PipelineObserver>>>,
    state: Mutex<PipelineState>,
    runs: AtomicU64,
    policy: FailurePolicy,
    main: MainHandle,
}

impl FilterPipeline {
    /// Build every transform in `specs`, or fail as a whole. Notifies nobody.
    pub fn configure(
        source: Arc<ImageBuf>,
        specs: &[TransformSpec],
        main: MainHandle,
        options: PipelineOptions,
    ) -> Result<Self, InstantiationError> {
        let transforms = specs
            .iter()
            .map(|spec| Transform::create(source.clone(), spec))
            .collect::<Result<Vec<_>, _>>()?;
        info!(
            transforms = transforms.len(),
            width = source.width,
            height = source.height,
            "pipeline configured"
        );
        Ok(Self::from_transforms(source, transforms, main, options))
    }

    /// Assemble a pipeline from already-built transforms.
    pub fn from_transforms(
        source: Arc<ImageBuf>,
        transforms: Vec<Transform>,
        main: MainHandle,
        options: PipelineOptions,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                source,
                transforms,
                output_images: Mutex::new(Vec::new()),
                observer: Mutex::new(None),
                state: Mutex::new(PipelineState::Ready),
                runs: AtomicU64::new(0),
                policy: options.failure_policy,
                main,
            }),
            executor: options.executor,
        }
    }

    pub fn builder(source: Arc<ImageBuf>, main: MainHandle) -> PipelineBuilder {
        PipelineBuilder::new(source, main)
    }

    /// Register the observer. Only a weak reference is kept.
    pub fn set_observer<O: PipelineObserver + 'static>(&self, observer: &Arc<O>) {
        let weak: Weak<O> = Arc::downgrade(observer);
        let weak: Weak<dyn PipelineObserver> = weak;
        self.set_observer_weak(weak);
    }

    pub(crate) fn set_observer_weak(&self, observer: Weak<dyn PipelineObserver>) {
        *lock(&self.shared.observer) = Some(observer);
    }

    /// A run still in flight will then finish without notifying anyone.
    pub fn clear_observer(&self) {
        lock(&self.shared.observer).take();
    }

    /// Run every transform on the background pool, each into its own output
    /// slot, and notify the observer once all of them have finished.
    ///
    /// Returns the run id.
    pub fn run_all(&self) -> Result<u64, PipelineError> {
        let run = self.shared.begin()?;
        for transform in &self.shared.transforms {
            transform.clear_output();
        }

        let shared = Arc::clone(&self.shared);
        self.executor.spawn(move || {
            let t0 = Instant::now();
            let failed: Vec<TransformFailed> = shared
                .transforms
                .par_iter()
                .filter_map(|transform| transform.run().err())
                .collect();
            info!(
                run,
                transforms = shared.transforms.len(),
                failed = failed.len(),
                elapsed_ms = t0.elapsed().as_millis(),
                "run complete"
            );
            shared.finish(run, failed);
        });
        Ok(run)
    }

    /// Batch variant: run the transforms one after another in a single
    /// background job, collecting results into [`FilterPipeline::output_images`].
    ///
    /// Failed transforms contribute no image. The list is rebuilt on every
    /// call.
    pub fn apply_batch(&self) -> Result<u64, PipelineError> {
        let run = self.shared.begin()?;
        lock(&self.shared.output_images).clear();

        let shared = Arc::clone(&self.shared);
        self.executor.spawn(move || {
            let t0 = Instant::now();
            let mut failed = Vec::new();
            for transform in &shared.transforms {
                match transform.produce() {
                    Ok(image) => lock(&shared.output_images).push(Arc::new(image)),
                    Err(reason) => {
                        warn!(transform = transform.name(), %reason, "transform failed");
                        failed.push(TransformFailed {
                            name: transform.name().to_string(),
                            reason,
                        });
                    }
                }
            }
            info!(
                run,
                images = lock(&shared.output_images).len(),
                elapsed_ms = t0.elapsed().as_millis(),
                "batch complete"
            );
            shared.finish(run, failed);
        });
        Ok(run)
    }

    pub fn state(&self) -> PipelineState {
        *lock(&self.shared.state)
    }

    pub fn source(&self) -> &Arc<ImageBuf> {
        &self.shared.source
    }

    /// Transforms in display order.
    pub fn transforms(&self) -> &[Transform] {
        &self.shared.transforms
    }

    pub fn len(&self) -> usize {
        self.shared.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.transforms.is_empty()
    }

    /// Grid cells in display order, independent of completion order.
    pub fn cells(&self) -> Vec<FilterCell> {
        self.shared
            .transforms
            .iter()
            .map(|transform| FilterCell {
                name: transform.name().to_string(),
                image: transform.output_image(),
            })
            .collect()
    }

    /// Results of the last [`FilterPipeline::apply_batch`].
    pub fn output_images(&self) -> Vec<Arc<ImageBuf>> {
        lock(&self.shared.output_images).clone()
    }

    /// Number of runs started so far.
    pub fn run_count(&self) -> u64 {
        self.shared.runs.load(Ordering::SeqCst)
    }
}

impl Shared {
    fn begin(&self) -> Result<u64, PipelineError> {
        let mut state = lock(&self.state);
        if *state == PipelineState::Running {
            return Err(PipelineError::RunInFlight(self.runs.load(Ordering::SeqCst)));
        }
        *state = PipelineState::Running;
        let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(run, "run started");
        Ok(run)
    }

    /// Called once per run on the worker, after every transform has finished.
    fn finish(self: &Arc<Self>, run: u64, failed: Vec<TransformFailed>) {
        let report = RunReport {
            run,
            completed: self.transforms.len() - failed.len(),
            failed,
        };
        let outcome = self.policy.outcome(report);

        // The run stays in flight until the interactive thread takes the result.
        let shared = Arc::clone(self);
        self.main.post(move || {
            *lock(&shared.state) = PipelineState::Completed;
            shared.deliver(run, outcome);
        });
    }

    fn deliver(&self, run: u64, outcome: Result<RunReport, PipelineError>) {
        let observer = lock(&self.observer).as_ref().and_then(Weak::upgrade);
        match observer {
            Some(observer) => observer.on_pipeline_result(outcome),
            None => warn!(run, "no observer, dropping result"),
        }
    }
}
