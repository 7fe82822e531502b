//! Task construction
//!
//! A task pairs one trajectory with the single topology file found next to it
//! and fixes where the processed trajectory will be written.
//!
//! ```text
//!   discovered trajectories
//!              │
//!              ▼
//!   ┌─────────────────────┐   0 or >1 topologies
//!   │  find_topology()    │──────────────────────▶ skipped (or abort if strict)
//!   └──────────┬──────────┘
//!              │ exactly one
//!              ▼
//!   ┌─────────────────────┐
//!   │  output_path()      │  workdir / nearby / overwrite
//!   └──────────┬──────────┘
//!              ▼
//!   ┌─────────────────────┐   duplicate output
//!   │ check_unique_outputs│──────────────────────▶ abort
//!   └──────────┬──────────┘
//!              ▼
//!           Vec<Task>
//! ```

pub mod builder;
pub mod naming;

pub use builder::{check_unique_outputs, TaskBuilder, TaskSet};
pub use naming::{temporary_output, OutputNaming, TEMP_PREFIX};

use std::path::{Path, PathBuf};

/// One unit of work: run cpptraj on `trajectory` with `topology`, write `output`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    topology: PathBuf,
    trajectory: PathBuf,
    output: PathBuf,
}

impl Task {
    /// Create a new task
    pub fn new(topology: PathBuf, trajectory: PathBuf, output: PathBuf) -> Self {
        Self {
            topology,
            trajectory,
            output,
        }
    }

    pub fn topology(&self) -> &Path {
        &self.topology
    }

    pub fn trajectory(&self) -> &Path {
        &self.trajectory
    }

    /// Final location of the processed trajectory
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// True when the output replaces the input
    pub fn is_in_place(&self) -> bool {
        self.output == self.trajectory
    }
}
