//! traju - batch processing of MD trajectories with AmberTools cpptraj
//!
//! Finds trajectory files, pairs each one with the single topology file that
//! sits next to it, and runs `cpptraj` on every pair in parallel. All the
//! scientific work (stripping water, aligning, format conversion) happens in
//! cpptraj; traju only handles files and processes.
//!
//! # Architecture
//!
//! ```text
//!   paths ──▶ TrajectoryFinder ──▶ TaskBuilder ──▶ confirm ──▶ Dispatcher
//!             (*.nc, -r)           (topology,      (y/n)       (worker pool,
//!                                   output path,                counter,
//!                                   collisions)                 progress)
//!                                                                  │
//!                                                     ┌────────────┼────────────┐
//!                                                     ▼            ▼            ▼
//!                                                  cpptraj      cpptraj      cpptraj
//! ```
//!
//! # Example
//!
//! ```bash
//! # Every *.nc in the current folder, outputs as <stem>_u.nc here
//! traju
//!
//! # Recursive, strip water, write next to the inputs, no questions
//! traju runs/ -r -d -n -y
//! ```

pub mod batch;
pub mod config;
pub mod cpptraj;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod interrupt;
pub mod progress;
pub mod prompt;
pub mod tasks;

pub use batch::{Batch, BatchReport};
pub use config::{CliArgs, OutputMode, RunConfig};
pub use cpptraj::Cpptraj;
pub use discovery::{Discovered, TrajectoryFinder};
pub use dispatch::{DispatchResult, Dispatcher};
pub use error::{Result, TrajuError};
pub use tasks::{Task, TaskBuilder, TaskSet};
