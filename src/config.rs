//! Configuration types for traju
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//! - Output mode selection

use crate::error::ConfigError;
use crate::tasks::OutputNaming;
use clap::Parser;
use std::path::PathBuf;

/// Default upper limit for concurrent cpptraj processes
const DEFAULT_MAX_PROCS: usize = 16;

/// Batch processing of MD trajectories with AmberTools cpptraj
#[derive(Parser, Debug, Clone)]
#[command(
    name = "traju",
    version,
    about = "Batch processing of MD trajectories with AmberTools cpptraj",
    long_about = "Finds trajectories, pairs each one with the single topology file in its folder \
                  and runs cpptraj on every pair in parallel.\n\n\
                  cpptraj is looked up via --cpptraj, then $AMBERHOME/bin, then PATH.",
    after_help = "EXAMPLES:\n    \
        traju                       # every *.nc in the current folder\n    \
        traju runs/ -r -n -d        # recursive, strip water, write next to inputs\n    \
        traju md1.nc md2.nc -o -a   # align backbone and overwrite in place\n    \
        traju . -y --strict -p 4    # non-interactive, stop on first problem"
)]
pub struct CliArgs {
    /// Paths to trajectories or to directories containing them
    #[arg(value_name = "PATH", default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Go through subfolders
    #[arg(short = 'r', long)]
    pub recursive: bool,

    /// Stop when a problem occurs, else just warn
    #[arg(long)]
    pub strict: bool,

    /// Trajectory file extensions (comma separated)
    #[arg(long, value_delimiter = ',', default_value = "nc", value_name = "EXTS")]
    pub traj_exts: Vec<String>,

    /// Topology file extensions (comma separated)
    #[arg(long, value_delimiter = ',', default_value = "prmtop", value_name = "EXTS")]
    pub top_exts: Vec<String>,

    /// Run silently without interactivity
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Print a summary when the run finishes
    #[arg(short = 's', long)]
    pub summary: bool,

    /// Upper limit for number of concurrent processes (the CPU count is a limit too)
    #[arg(short = 'p', long, default_value_t = DEFAULT_MAX_PROCS, value_name = "NUM")]
    pub max_procs: usize,

    /// Overwrite original files
    #[arg(short = 'o', long, conflicts_with_all = ["nearby", "join"])]
    pub overwrite: bool,

    /// Write new trajectories to the same folder as the originals
    #[arg(short = 'n', long, conflicts_with_all = ["overwrite", "join"])]
    pub nearby: bool,

    /// Join trajectories into one
    #[arg(short = 'j', long, conflicts_with_all = ["overwrite", "nearby"])]
    pub join: bool,

    /// Add prefix to new trajectories
    #[arg(long, default_value = "", value_name = "TEXT")]
    pub prefix: String,

    /// Add postfix to new trajectories
    #[arg(long, default_value = "_u", value_name = "TEXT")]
    pub postfix: String,

    /// Extension for new trajectories (empty keeps the input's extension)
    #[arg(short = 'e', long, default_value = "nc", value_name = "EXT")]
    pub ext: String,

    /// Align protein backbone to the first frame
    #[arg(short = 'a', long)]
    pub align: bool,

    /// Remove water
    #[arg(short = 'd', long)]
    pub dehyd: bool,

    /// Path to the cpptraj executable
    #[arg(long, value_name = "PATH")]
    pub cpptraj: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Where processed trajectories are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Derived file name in the current working directory
    #[default]
    Workdir,
    /// Derived file name next to the input
    Nearby,
    /// Replace the input in place
    Overwrite,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Input trajectories and directories
    pub paths: Vec<PathBuf>,

    /// Scan directories recursively
    pub recursive: bool,

    /// Abort on the first per-item problem
    pub strict: bool,

    /// Trajectory extensions, without leading dot
    pub traj_exts: Vec<String>,

    /// Topology extensions, without leading dot
    pub top_exts: Vec<String>,

    /// No listing, no confirmation prompt
    pub silent: bool,

    /// Print a summary at the end
    pub summary: bool,

    /// Verbose logging
    pub verbose: bool,

    /// Upper limit for concurrent cpptraj processes
    pub max_procs: usize,

    /// Output placement
    pub output_mode: OutputMode,

    /// Output file naming
    pub naming: OutputNaming,

    /// Align backbone to the first frame
    pub align: bool,

    /// Strip water
    pub dehydrate: bool,

    /// Explicit cpptraj location
    pub cpptraj: Option<PathBuf>,
}

impl RunConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if args.max_procs == 0 {
            return Err(ConfigError::InvalidMaxProcs {
                count: args.max_procs,
            });
        }

        if args.join {
            return Err(ConfigError::UnsupportedMode { mode: "join" });
        }

        let output_mode = if args.overwrite {
            OutputMode::Overwrite
        } else if args.nearby {
            OutputMode::Nearby
        } else {
            OutputMode::Workdir
        };

        let traj_exts = normalize_extensions(&args.traj_exts);
        if traj_exts.is_empty() {
            return Err(ConfigError::EmptyExtensions { kind: "trajectory" });
        }

        let top_exts = normalize_extensions(&args.top_exts);
        if top_exts.is_empty() {
            return Err(ConfigError::EmptyExtensions { kind: "topology" });
        }

        let naming = OutputNaming::new(args.prefix, args.postfix, strip_dot(&args.ext));

        Ok(Self {
            paths: args.paths,
            recursive: args.recursive,
            strict: args.strict,
            traj_exts,
            top_exts,
            silent: args.yes,
            summary: args.summary,
            verbose: args.verbose,
            max_procs: args.max_procs,
            output_mode,
            naming,
            align: args.align,
            dehydrate: args.dehyd,
            cpptraj: args.cpptraj,
        })
    }

    /// Number of worker threads: the process limit capped by the CPU count
    pub fn worker_count(&self) -> usize {
        self.max_procs.min(num_cpus::get()).max(1)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            paths: vec![PathBuf::from(".")],
            recursive: false,
            strict: false,
            traj_exts: vec!["nc".to_string()],
            top_exts: vec!["prmtop".to_string()],
            silent: true,
            summary: false,
            verbose: false,
            max_procs: DEFAULT_MAX_PROCS,
            output_mode: OutputMode::Workdir,
            naming: OutputNaming::default(),
            align: false,
            dehydrate: false,
            cpptraj: None,
        }
    }
}

fn strip_dot(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_string()
}

/// Trim, drop leading dots and empties, keep first occurrence of each
fn normalize_extensions(exts: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(exts.len());
    for ext in exts.iter().map(|e| strip_dot(e)) {
        if !ext.is_empty() && !out.contains(&ext) {
            out.push(ext);
        }
    }
    out
}
