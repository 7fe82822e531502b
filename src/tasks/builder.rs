//! Pairing trajectories with topologies and placing outputs

use crate::config::{OutputMode, RunConfig};
use crate::discovery::{has_extension, normalize_path};
use crate::error::{Result, TaskError};
use crate::tasks::{OutputNaming, Task};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Tasks ready for dispatch plus the trajectories that were left out
#[derive(Debug, Default)]
pub struct TaskSet {
    pub tasks: Vec<Task>,
    pub skipped: Vec<TaskError>,
}

impl TaskSet {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Builds tasks from discovered trajectories
pub struct TaskBuilder {
    top_exts: Vec<String>,
    mode: OutputMode,
    naming: OutputNaming,
    strict: bool,
    workdir: PathBuf,
}

impl TaskBuilder {
    /// Create a builder; `workdir` receives outputs in workdir mode and anchors relative paths
    pub fn with_workdir(config: &RunConfig, workdir: PathBuf) -> Self {
        Self {
            top_exts: config.top_exts.clone(),
            mode: config.output_mode,
            naming: config.naming.clone(),
            strict: config.strict,
            workdir,
        }
    }

    /// Build tasks for `trajectories`
    ///
    /// A trajectory without exactly one topology is skipped with a warning,
    /// or aborts the build in strict mode. Output collisions always abort.
    pub fn build(&self, trajectories: &[PathBuf]) -> Result<TaskSet> {
        debug!("Starting to create {} task(s)", trajectories.len());

        let mut set = TaskSet::default();

        for trajectory in trajectories {
            let topology = match self.find_topology(trajectory) {
                Ok(topology) => topology,
                Err(e) if self.strict => return Err(e.into()),
                Err(e) => {
                    warn!("{}", e);
                    set.skipped.push(e);
                    continue;
                }
            };

            let output = self.output_path(trajectory);
            set.tasks.push(Task::new(topology, trajectory.clone(), output));
        }

        check_unique_outputs(&set.tasks, &self.workdir)?;

        debug!(
            tasks = set.tasks.len(),
            skipped = set.skipped.len(),
            "Tasks created"
        );
        Ok(set)
    }

    /// Find the single topology file in the trajectory's folder
    pub fn find_topology(&self, trajectory: &Path) -> std::result::Result<PathBuf, TaskError> {
        let dir = self.folder_of(trajectory);

        let mut candidates: Vec<PathBuf> = match fs::read_dir(&dir) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.is_file() && has_extension(path, &self.top_exts))
                .collect(),
            Err(e) => {
                debug!(path = %dir.display(), error = %e, "Cannot read trajectory folder");
                Vec::new()
            }
        };

        match candidates.len() {
            0 => Err(TaskError::MissingTopology {
                trajectory: trajectory.to_path_buf(),
                dir,
            }),
            1 => Ok(candidates.remove(0)),
            count => Err(TaskError::AmbiguousTopology {
                trajectory: trajectory.to_path_buf(),
                dir,
                count,
            }),
        }
    }

    /// Where the processed `trajectory` goes under the configured mode
    pub fn output_path(&self, trajectory: &Path) -> PathBuf {
        match self.mode {
            OutputMode::Overwrite => trajectory.to_path_buf(),
            OutputMode::Nearby => self.folder_of(trajectory).join(self.naming.file_name(trajectory)),
            OutputMode::Workdir => self.workdir.join(self.naming.file_name(trajectory)),
        }
    }

    fn folder_of(&self, path: &Path) -> PathBuf {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => self.workdir.clone(),
        }
    }
}

/// Fail if any two tasks would write the same file, or if a task would
/// replace a trajectory that another task reads
///
/// Paths are compared after lexical normalization against `base`. A task
/// writing in place only shadows its own input, which is allowed.
pub fn check_unique_outputs(tasks: &[Task], base: &Path) -> std::result::Result<(), TaskError> {
    let mut counts: HashMap<PathBuf, usize> = HashMap::with_capacity(tasks.len());
    for task in tasks {
        *counts.entry(normalize_path(task.output(), base)).or_default() += 1;
    }

    // Report the first duplicate in task order
    for task in tasks {
        let key = normalize_path(task.output(), base);
        let count = counts[&key];
        if count > 1 {
            warn!(
                "Non-unique names for trajectories were found, outputs would be overwritten! \
                 Note: you can use --nearby/-n to avoid this"
            );
            return Err(TaskError::OutputCollision {
                path: task.output().to_path_buf(),
                count,
            });
        }
    }

    let inputs: HashMap<PathBuf, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, task)| (normalize_path(task.trajectory(), base), i))
        .collect();

    for (i, task) in tasks.iter().enumerate() {
        match inputs.get(&normalize_path(task.output(), base)) {
            Some(&reader) if reader != i => {
                warn!(
                    "Output `{}` is the input of another task, it would be overwritten while read",
                    task.output().display()
                );
                return Err(TaskError::OutputShadowsInput {
                    output: task.output().to_path_buf(),
                    trajectory: task.trajectory().to_path_buf(),
                });
            }
            _ => {}
        }
    }

    Ok(())
}
