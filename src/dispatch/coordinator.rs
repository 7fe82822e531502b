//! Dispatch coordinator - runs every task through the worker pool
//!
//! The coordinator is responsible for:
//! - Sizing and spawning the worker pool
//! - Polling the completion counter for progress reporting
//! - Collecting task outcomes
//! - Stopping early in strict mode or on interrupt

use crate::config::RunConfig;
use crate::cpptraj::{Cpptraj, ScriptOptions};
use crate::dispatch::queue::{CompletionCounter, TaskQueue};
use crate::dispatch::worker::{Worker, WorkerContext};
use crate::error::{Result, TaskOutcome, TrajuError};
use crate::interrupt::Interrupt;
use crate::tasks::Task;
use crossbeam_channel::{unbounded, TryRecvError};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How often the counter is polled
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Snapshot handed to the progress callback
#[derive(Debug, Clone, Copy)]
pub struct DispatchProgress {
    /// Tasks finished, successfully or not
    pub completed: usize,

    /// Total tasks
    pub total: usize,

    /// Tasks that failed so far
    pub failed: usize,
}

/// Result of a dispatch run
#[derive(Debug, Default)]
pub struct DispatchResult {
    /// Tasks queued
    pub total: usize,

    /// Tasks whose output is in place
    pub succeeded: usize,

    /// Tasks that failed (non-strict runs)
    pub failed: Vec<PathBuf>,

    /// Combined size of the written outputs
    pub output_bytes: u64,

    /// Wall time of the run
    pub duration: Duration,

    /// Whether every task ran (vs was interrupted)
    pub completed: bool,
}

/// Runs tasks through a bounded pool of worker threads
pub struct Dispatcher {
    /// Configuration
    config: Arc<RunConfig>,

    /// cpptraj handle shared by workers
    tool: Arc<Cpptraj>,

    /// Raised on strict-mode failures
    shutdown: Arc<AtomicBool>,

    /// User Ctrl+C presses
    interrupt: Arc<Interrupt>,
}

impl Dispatcher {
    /// Create a new dispatcher
    pub fn new(config: RunConfig, tool: Cpptraj) -> Self {
        Self {
            config: Arc::new(config),
            tool: Arc::new(tool),
            shutdown: Arc::new(AtomicBool::new(false)),
            interrupt: Arc::new(Interrupt::new()),
        }
    }

    /// Share `interrupt` with the signal handler
    pub fn with_interrupt(mut self, interrupt: Arc<Interrupt>) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Worker count for `tasks` tasks: min(max procs, CPUs, tasks), at least one
    pub fn worker_count(&self, tasks: usize) -> usize {
        self.config.worker_count().min(tasks).max(1)
    }

    /// Check that cpptraj can be run at all
    pub fn preflight(&self) -> Result<()> {
        self.tool.preflight()?;
        Ok(())
    }

    /// Run every task, calling `on_progress` roughly every [`POLL_INTERVAL`]
    ///
    /// In strict mode the first failure is returned as an error right away;
    /// tasks still running in other workers are not waited for.
    pub fn run<F>(&self, tasks: Vec<Task>, mut on_progress: F) -> Result<DispatchResult>
    where
        F: FnMut(DispatchProgress),
    {
        let start = Instant::now();
        let total = tasks.len();
        let mut result = DispatchResult {
            total,
            ..DispatchResult::default()
        };

        if total == 0 {
            result.completed = true;
            return Ok(result);
        }

        self.interrupt.arm();

        let queue = TaskQueue::new(tasks);
        let counter = Arc::new(CompletionCounter::new(total));
        let (outcome_tx, outcome_rx) = unbounded();

        let ctx = WorkerContext {
            tool: Arc::clone(&self.tool),
            options: ScriptOptions::from_config(&self.config),
            strict: self.config.strict,
            queue: queue.receiver(),
            outcomes: outcome_tx,
            counter: Arc::clone(&counter),
            shutdown: Arc::clone(&self.shutdown),
            interrupt: Arc::clone(&self.interrupt),
        };

        let worker_count = self.worker_count(total);
        let mut workers = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            workers.push(Worker::spawn(id, ctx.clone())?);
        }
        // Only workers hold senders now; the channel closes when they all exit
        drop(ctx);

        debug!("{} thread(s) allocated for trajs processing", workers.len());

        loop {
            let mut disconnected = false;
            loop {
                match outcome_rx.try_recv() {
                    Ok(outcome) => self.record(&mut result, outcome)?,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }

            on_progress(DispatchProgress {
                completed: counter.completed(),
                total,
                failed: result.failed.len(),
            });

            if disconnected {
                break;
            }

            thread::sleep(POLL_INTERVAL);
        }

        for worker in workers {
            let id = worker.id();
            if let Err(e) = worker.join() {
                warn!(worker = id, error = %e, "Worker failed to join cleanly");
            }
        }

        result.duration = start.elapsed();
        result.completed = counter.is_finished();

        info!(
            total = result.total,
            succeeded = result.succeeded,
            failed = result.failed.len(),
            duration_secs = result.duration.as_secs(),
            "Dispatch finished"
        );

        Ok(result)
    }

    /// Fold one outcome into `result`; strict failures end the run
    fn record(&self, result: &mut DispatchResult, outcome: TaskOutcome) -> Result<()> {
        match outcome {
            TaskOutcome::Success { trajectory, output } => {
                debug!(trajectory = %trajectory.display(), "Output in place");
                result.succeeded += 1;
                result.output_bytes += std::fs::metadata(&output).map(|m| m.len()).unwrap_or(0);
            }
            TaskOutcome::Failed { trajectory, error } => {
                if self.config.strict || !error.is_recoverable() {
                    self.shutdown.store(true, Ordering::SeqCst);
                    return Err(TrajuError::Tool(error));
                }
                result.failed.push(trajectory);
            }
        }
        Ok(())
    }
}
