//! A whole batch run, from input paths to the summary
//!
//! ```text
//!   discover ──▶ build tasks ──▶ preflight ──▶ list + confirm ──▶ dispatch ──▶ summary
//! ```
//!
//! Nothing is executed before the user answers `y` (or `--yes` was given).

use crate::config::RunConfig;
use crate::cpptraj::Cpptraj;
use crate::discovery::TrajectoryFinder;
use crate::dispatch::{DispatchResult, Dispatcher};
use crate::error::{Result, TaskError, TrajuError};
use crate::interrupt::Interrupt;
use crate::progress::{print_header, print_summary, print_tasks, ProgressReporter};
use crate::prompt::{confirm, MAX_ATTEMPTS};
use crate::tasks::TaskBuilder;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// What happened during a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Dispatch counts and timings
    pub result: DispatchResult,

    /// Trajectories left out for want of a usable topology
    pub skipped: Vec<TaskError>,

    /// Input paths that did not exist
    pub missing: Vec<PathBuf>,
}

/// One configured batch run
pub struct Batch {
    config: RunConfig,
    tool: Cpptraj,
    workdir: PathBuf,
    interrupt: Arc<Interrupt>,
}

impl Batch {
    /// Create a run rooted at the current directory
    pub fn new(config: RunConfig, tool: Cpptraj) -> Result<Self> {
        Ok(Self::with_workdir(config, tool, std::env::current_dir()?))
    }

    /// Create a run rooted at `workdir`
    pub fn with_workdir(config: RunConfig, tool: Cpptraj, workdir: PathBuf) -> Self {
        Self {
            config,
            tool,
            workdir,
            interrupt: Arc::new(Interrupt::new()),
        }
    }

    /// Share `interrupt` with the signal handler
    pub fn interrupt(mut self, interrupt: Arc<Interrupt>) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Run the batch, reading answers from `input` and writing listings to `output`
    pub fn run<R: BufRead, W: Write>(self, input: &mut R, output: &mut W) -> Result<BatchReport> {
        let discovered = TrajectoryFinder::with_base(&self.config, self.workdir.clone())
            .find(&self.config.paths)?;
        let missing = discovered.missing.clone();

        let set = TaskBuilder::with_workdir(&self.config, self.workdir.clone())
            .build(&discovered.into_trajectories())?;

        if set.is_empty() {
            warn!("Nothing to process");
            return Ok(BatchReport {
                result: DispatchResult {
                    completed: true,
                    ..DispatchResult::default()
                },
                skipped: set.skipped,
                missing,
            });
        }

        // Make sure cpptraj runs before asking anything
        let program = self.tool.program().display().to_string();
        let dispatcher =
            Dispatcher::new(self.config.clone(), self.tool).with_interrupt(self.interrupt);
        dispatcher.preflight()?;

        let total = set.len();
        if !self.config.silent {
            print_tasks(output, &set.tasks)?;
            confirm(input, output, MAX_ATTEMPTS)?;
            print_header(output, &program, dispatcher.worker_count(total), total)?;
        }

        let reporter = ProgressReporter::new(total);
        let outcome = dispatcher.run(set.tasks, |progress| reporter.update(&progress));
        reporter.finish();

        let report = BatchReport {
            result: outcome?,
            skipped: set.skipped,
            missing,
        };

        if self.config.summary {
            print_summary(output, &report)?;
        }

        if !report.result.failed.is_empty() {
            warn!(
                failed = report.result.failed.len(),
                "Some trajectories could not be processed"
            );
        }

        if !report.result.completed {
            info!("Run was interrupted before completion");
            return Err(TrajuError::Interrupted);
        }

        Ok(report)
    }
}
