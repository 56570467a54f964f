mod app;
mod cli;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::error;
use tracing_subscriber::EnvFilter;

use prisma_core::loader::load_image_scaled;
use prisma_core::transform::catalog;
use prisma_core::{Executor, FailurePolicy, FilterPipeline, MainQueue};

use app::{App, Mode};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: cli::Args = argh::from_env();
    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the grid was shown.
fn run(args: cli::Args) -> Result<bool> {
    let specs = match &args.catalog {
        Some(path) => catalog::load_catalog(path)?,
        None => catalog::preset(&args.preset)
            .with_context(|| format!("unknown preset `{}` (try blurs or effects)", args.preset))?,
    };
    let source = Arc::new(load_image_scaled(&args.input, Some(args.max_edge))?);

    // This thread is the interactive thread from here on.
    let queue = MainQueue::new();
    let mode = if args.batch { Mode::Batch } else { Mode::PerFilter };
    let app = App::new(args.out.clone(), args.columns, mode);

    let executor = match args.threads {
        Some(threads) => Executor::dedicated(threads)?,
        None => Executor::Global,
    };
    let policy = if args.fail_batch {
        FailurePolicy::FailBatch
    } else {
        FailurePolicy::Tolerate
    };

    let built = FilterPipeline::builder(source, queue.handle())
        .specs(specs)
        .observer(&app)
        .executor(executor)
        .failure_policy(policy)
        .build();
    let pipeline = match built {
        Ok(pipeline) => Arc::new(pipeline),
        Err(_) => {
            // The failure was posted to the app; deliver it.
            queue.pump();
            return Ok(false);
        }
    };
    app.attach(pipeline.clone());

    match mode {
        Mode::PerFilter => pipeline.run_all()?,
        Mode::Batch => pipeline.apply_batch()?,
    };

    if !queue.pump_until(|| app.has_result(), Duration::from_secs(args.timeout)) {
        bail!("no result after {}s", args.timeout);
    }
    Ok(app.succeeded())
}
