//! Worker thread logic for parallel trajectory processing
//!
//! Each worker:
//! - Pulls tasks from the shared queue until it is empty
//! - Runs cpptraj synchronously for each task
//! - Bumps the completion counter once per task
//! - Sends the task outcome back to the dispatcher

use crate::cpptraj::{Cpptraj, ScriptOptions};
use crate::dispatch::queue::{CompletionCounter, TaskQueueReceiver};
use crate::error::{TaskOutcome, WorkerError};
use crate::interrupt::Interrupt;
use crate::tasks::Task;
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Everything a worker needs, shared by all workers of a run
#[derive(Clone)]
pub struct WorkerContext {
    pub tool: Arc<Cpptraj>,
    pub options: ScriptOptions,
    pub strict: bool,
    pub queue: TaskQueueReceiver,
    pub outcomes: Sender<TaskOutcome>,
    pub counter: Arc<CompletionCounter>,
    pub shutdown: Arc<AtomicBool>,
    pub interrupt: Arc<Interrupt>,
}

impl WorkerContext {
    fn stopped(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst) || self.interrupt.is_requested()
    }
}

/// A worker thread that processes tasks
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn(id: usize, ctx: WorkerContext) -> Result<Self, WorkerError> {
        let handle = thread::Builder::new()
            .name(format!("traju-{}", id))
            .spawn(move || worker_loop(id, ctx))
            .map_err(|e| WorkerError::InitFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Wait for the worker to finish
    pub fn join(mut self) -> Result<(), WorkerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| WorkerError::Panicked {
                id: self.id,
                message: "Worker thread panicked".into(),
            }),
            None => Ok(()),
        }
    }
}

/// Main worker loop
fn worker_loop(id: usize, ctx: WorkerContext) {
    debug!(worker = id, "Worker starting");
    let mut processed = 0u64;

    while !ctx.stopped() {
        let Some(task) = ctx.queue.next() else {
            break;
        };

        let outcome = process_task(id, &task, &ctx);
        processed += 1;

        if !outcome.is_success() && ctx.strict {
            // Stop every worker from taking another task
            ctx.shutdown.store(true, Ordering::SeqCst);
            warn!("Execution stopped: `--strict` was specified");
        }

        ctx.counter.record();

        if ctx.outcomes.send(outcome).is_err() {
            // Dispatcher is gone; nobody is waiting for more results
            break;
        }
    }

    debug!(worker = id, processed, "Worker shutting down");
}

/// Process a single task
fn process_task(worker_id: usize, task: &Task, ctx: &WorkerContext) -> TaskOutcome {
    let started = Instant::now();

    match ctx.tool.process(task, ctx.options) {
        Ok(()) => {
            info!(
                worker = worker_id,
                trajectory = %task.trajectory().display(),
                output = %task.output().display(),
                secs = started.elapsed().as_secs_f64(),
                "Trajectory processed"
            );
            TaskOutcome::Success {
                trajectory: task.trajectory().to_path_buf(),
                output: task.output().to_path_buf(),
            }
        }
        Err(error) => {
            warn!(
                worker = worker_id,
                trajectory = %task.trajectory().display(),
                error = %error,
                "Trajectory failed"
            );
            TaskOutcome::Failed {
                trajectory: task.trajectory().to_path_buf(),
                error,
            }
        }
    }
}
