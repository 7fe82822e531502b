//! Error types for traju
//!
//! This module defines the error hierarchy for a batch run:
//! - Configuration and CLI errors
//! - Task construction errors (inputs, topology pairing, output collisions)
//! - External tool errors (cpptraj lookup and execution)
//! - Interactive confirmation errors
//! - Worker thread errors
//!
//! Library code returns these through `thiserror` enums; the binary wraps
//! them with `anyhow` context at the top level.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for traju
#[derive(Error, Debug)]
pub enum TrajuError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task construction errors
    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    /// External tool errors
    #[error("cpptraj error: {0}")]
    Tool(#[from] ToolError),

    /// Confirmation prompt errors
    #[error("{0}")]
    Prompt(#[from] PromptError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Interrupted by signal
    #[error("Operation interrupted by signal")]
    Interrupted,
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid process limit
    #[error("Invalid process limit {count}: must be at least 1")]
    InvalidMaxProcs { count: usize },

    /// No usable extension was given
    #[error("No {kind} extensions given")]
    EmptyExtensions { kind: &'static str },

    /// Output mode declared on the CLI but not implemented
    #[error("Output mode '{mode}' is not supported yet")]
    UnsupportedMode { mode: &'static str },
}

/// Errors raised while turning discovered files into tasks
#[derive(Error, Debug, Clone)]
pub enum TaskError {
    /// Input path does not exist
    #[error("Input path '{}' does not exist", path.display())]
    InputNotFound { path: PathBuf },

    /// No topology next to the trajectory
    #[error("No topology file found in '{}' for trajectory '{}'", dir.display(), trajectory.display())]
    MissingTopology { trajectory: PathBuf, dir: PathBuf },

    /// More than one candidate topology
    #[error("{count} topology files found in '{}' for trajectory '{}'", dir.display(), trajectory.display())]
    AmbiguousTopology {
        trajectory: PathBuf,
        dir: PathBuf,
        count: usize,
    },

    /// Two or more tasks would write the same file
    #[error(
        "{count} trajectories would be written to '{}'; use --nearby/-n to keep outputs apart",
        path.display()
    )]
    OutputCollision { path: PathBuf, count: usize },

    /// A task would replace a trajectory another task still reads
    #[error(
        "Output '{}' is also the input of another task; remove leftovers from earlier runs \
         or change --prefix/--postfix",
        output.display()
    )]
    OutputShadowsInput { output: PathBuf, trajectory: PathBuf },
}

/// External tool errors
#[derive(Error, Debug, Clone)]
pub enum ToolError {
    /// Tool could not be found
    #[error("`{program}` wasn't found{hint}")]
    NotFound { program: String, hint: String },

    /// The availability check returned non-zero
    #[error("`{program}` preflight check exited with {code}")]
    PreflightFailed { program: String, code: String },

    /// The process could not be started
    #[error("Failed to start `{program}`: {reason}")]
    SpawnFailed { program: String, reason: String },

    /// Processing of a trajectory returned non-zero
    #[error("Processing of '{}' returned exit code {code}", trajectory.display())]
    Failed { trajectory: PathBuf, code: String },

    /// Temporary output could not be moved into place
    #[error("Failed to move '{}' to '{}': {reason}", from.display(), to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },
}

impl ToolError {
    /// Check if a non-strict run may skip this error and carry on
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ToolError::Failed { .. } | ToolError::MoveFailed { .. } | ToolError::SpawnFailed { .. }
        )
    }
}

/// Interactive confirmation errors
#[derive(Error, Debug)]
pub enum PromptError {
    /// User answered `n`
    #[error("Aborted by user")]
    Declined,

    /// Answer could not be interpreted
    #[error("It was not clear: no y/n answer after {attempts} attempt(s)")]
    Unclear { attempts: usize },

    /// Terminal I/O failed
    #[error("Prompt I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Worker could not be started
    #[error("Failed to initialize worker {id}: {reason}")]
    InitFailed { id: usize, reason: String },
}

/// Result type alias for TrajuError
pub type Result<T> = std::result::Result<T, TrajuError>;

/// Result type alias for ToolError
pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// Outcome of processing a single task
#[derive(Debug)]
pub enum TaskOutcome {
    /// Tool succeeded and the output is in place
    Success { trajectory: PathBuf, output: PathBuf },

    /// Tool failed; any temporary output was removed
    Failed {
        trajectory: PathBuf,
        error: ToolError,
    },
}

impl TaskOutcome {
    /// Returns true if this outcome represents success
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_recoverable() {
        let failed = ToolError::Failed {
            trajectory: "a.nc".into(),
            code: "1".into(),
        };
        assert!(failed.is_recoverable());

        let missing = ToolError::NotFound {
            program: "cpptraj".into(),
            hint: String::new(),
        };
        assert!(!missing.is_recoverable());
    }

    #[test]
    fn test_error_conversion() {
        let task_err = TaskError::MissingTopology {
            trajectory: "run/a.nc".into(),
            dir: "run".into(),
        };
        let err: TrajuError = task_err.into();
        assert!(matches!(err, TrajuError::Task(_)));

        let err: TrajuError = PromptError::Declined.into();
        assert_eq!(err.to_string(), "Aborted by user");
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome = TaskOutcome::Failed {
            trajectory: "b.nc".into(),
            error: ToolError::Failed {
                trajectory: "b.nc".into(),
                code: "2".into(),
            },
        };
        assert!(!outcome.is_success());

        let outcome = TaskOutcome::Success {
            trajectory: "b.nc".into(),
            output: "b_u.nc".into(),
        };
        assert!(outcome.is_success());
    }
}
