use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use prisma_core::{FilterCell, FilterPipeline, PipelineError, PipelineObserver, RunReport};
use prisma_thumbnails::{generator, sheet};

pub const CONTACT_SHEET: &str = "contact_sheet.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One output slot per filter, shown under the filter's name.
    PerFilter,
    /// Sequential batch; images only.
    Batch,
}

/// What the grid currently shows.
#[derive(Debug, Default)]
pub struct Grid {
    pub visible: bool,
    pub written: Vec<PathBuf>,
    pub report: Option<RunReport>,
    pub error: Option<String>,
}

/// The preview screen. Observes the pipeline and refreshes the grid on the
/// interactive thread when a run finishes.
pub struct App {
    out_dir: PathBuf,
    columns: u32,
    mode: Mode,
    pipeline: OnceLock<Arc<FilterPipeline>>,
    grid: Mutex<Grid>,
    notified: OnceLock<()>,
}

impl App {
    pub fn new(out_dir: PathBuf, columns: u32, mode: Mode) -> Arc<Self> {
        Arc::new(Self {
            out_dir,
            columns,
            mode,
            pipeline: OnceLock::new(),
            grid: Mutex::new(Grid::default()),
            notified: OnceLock::new(),
        })
    }

    pub fn attach(&self, pipeline: Arc<FilterPipeline>) {
        if self.pipeline.set(pipeline).is_err() {
            warn!("pipeline already attached");
        }
    }

    pub fn has_result(&self) -> bool {
        self.notified.get().is_some()
    }

    pub fn succeeded(&self) -> bool {
        let grid = self.grid();
        grid.visible && grid.error.is_none()
    }

    pub fn grid(&self) -> MutexGuard<'_, Grid> {
        self.grid.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cells(&self, pipeline: &FilterPipeline) -> Vec<FilterCell> {
        match self.mode {
            Mode::PerFilter => pipeline.cells(),
            Mode::Batch => pipeline
                .output_images()
                .into_iter()
                .enumerate()
                .map(|(i, image)| FilterCell {
                    name: format!("batch-{i}"),
                    image: Some(image),
                })
                .collect(),
        }
    }

    fn reload_grid(&self) -> Result<Vec<PathBuf>> {
        let pipeline = self.pipeline.get().context("no pipeline attached")?;
        let cells = self.cells(pipeline);
        let mut written = generator::write_cells(&self.out_dir, &cells)?;
        if !cells.is_empty() {
            let path = self.out_dir.join(CONTACT_SHEET);
            sheet::contact_sheet(&cells, self.columns)?
                .save(&path)
                .with_context(|| format!("write contact sheet: {}", path.display()))?;
            written.push(path);
        }
        Ok(written)
    }
}

impl PipelineObserver for App {
    fn on_pipeline_result(&self, outcome: Result<RunReport, PipelineError>) {
        match outcome {
            Ok(report) => {
                for failed in &report.failed {
                    warn!(
                        filter = %failed.name,
                        reason = %failed.reason,
                        "filter produced no image"
                    );
                }
                let reloaded = self.reload_grid();
                let mut grid = self.grid();
                match reloaded {
                    Ok(written) => {
                        info!(
                            run = report.run,
                            completed = report.completed,
                            files = written.len(),
                            out = %self.out_dir.display(),
                            "grid updated"
                        );
                        grid.visible = true;
                        grid.written = written;
                    }
                    Err(err) => {
                        error!("failed to write grid: {err:#}");
                        grid.error = Some(format!("{err:#}"));
                    }
                }
                grid.report = Some(report);
            }
            Err(err) => {
                error!(%err, "filters failed");
                self.grid().error = Some(err.to_string());
            }
        }
        let _ = self.notified.set(());
    }
}
