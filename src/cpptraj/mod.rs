//! cpptraj process handling
//!
//! Locates the cpptraj executable, checks that it runs, and processes one
//! task at a time:
//!
//! ```text
//!   script ──stdin──▶ cpptraj ──▶ .traju-<uuid>.<ext>
//!                                   │
//!                     exit 0 ───────┴──▶ rename to final output
//!                     exit ≠ 0 ─────────▶ delete scratch file
//! ```

pub mod script;

pub use script::{CpptrajScript, ScriptOptions};

use crate::error::{ToolError, ToolResult};
use crate::tasks::{temporary_output, Task};
use std::ffi::OsString;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, error, trace, warn};

/// Default program name, looked up on PATH
pub const PROGRAM: &str = "cpptraj";

/// Environment variable pointing at the AmberTools installation
pub const AMBERHOME_VAR: &str = "AMBERHOME";

/// Handle on the cpptraj executable
#[derive(Debug, Clone)]
pub struct Cpptraj {
    program: PathBuf,
    amberhome_set: bool,
}

impl Cpptraj {
    /// Use `program` as is
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            amberhome_set: true,
        }
    }

    /// Resolve cpptraj from an explicit path, `$AMBERHOME/bin`, or PATH
    pub fn locate(explicit: Option<&Path>) -> Self {
        Self::locate_with(explicit, std::env::var_os(AMBERHOME_VAR))
    }

    /// Resolve cpptraj with a given AMBERHOME value
    pub fn locate_with(explicit: Option<&Path>, amberhome: Option<OsString>) -> Self {
        let amberhome = amberhome.filter(|home| !home.is_empty());
        let amberhome_set = amberhome.is_some();

        let program = match (explicit, &amberhome) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(home)) => {
                let candidate = Path::new(home).join("bin").join(PROGRAM);
                if candidate.is_file() {
                    candidate
                } else {
                    debug!(path = %candidate.display(), "No cpptraj under AMBERHOME, using PATH");
                    PathBuf::from(PROGRAM)
                }
            }
            (None, None) => PathBuf::from(PROGRAM),
        };

        Self {
            program,
            amberhome_set,
        }
    }

    /// Program that will be spawned
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Check that cpptraj can be started and exits cleanly on `quit`
    pub fn preflight(&self) -> ToolResult<()> {
        let status = self.execute(script::noop_script())?;
        if !status.success() {
            return Err(ToolError::PreflightFailed {
                program: self.program_name(),
                code: describe_status(&status),
            });
        }
        debug!(program = %self.program.display(), "cpptraj is available");
        Ok(())
    }

    /// Run cpptraj with `script` on stdin and wait for it
    pub fn execute(&self, script: &str) -> ToolResult<ExitStatus> {
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            // cpptraj may exit before reading everything; its status tells the story
            if let Err(e) = stdin.write_all(script.as_bytes()) {
                if e.kind() != ErrorKind::BrokenPipe {
                    warn!(error = %e, "Failed to write cpptraj input");
                }
            }
        }

        let output = child.wait_with_output().map_err(|e| ToolError::SpawnFailed {
            program: self.program_name(),
            reason: e.to_string(),
        })?;

        if !output.status.success() && !output.stderr.is_empty() {
            debug!(stderr = %String::from_utf8_lossy(&output.stderr).trim_end(), "cpptraj stderr");
        }

        Ok(output.status)
    }

    /// Process a single task, leaving the result at `task.output()`
    ///
    /// The scratch file is removed whenever the task does not succeed.
    pub fn process(&self, task: &Task, options: ScriptOptions) -> ToolResult<()> {
        let tmp = temporary_output(task.output());
        let script = CpptrajScript::new(task.topology(), task.trajectory(), &tmp)
            .options(options)
            .render();

        trace!(trajectory = %task.trajectory().display(), script = %script, "Running cpptraj");

        let status = match self.execute(&script) {
            Ok(status) => status,
            Err(e) => {
                remove_scratch(&tmp);
                return Err(e);
            }
        };

        if !status.success() {
            error!(
                "Processing of `{}` returns non-zero exit code",
                task.trajectory().display()
            );
            remove_scratch(&tmp);
            return Err(ToolError::Failed {
                trajectory: task.trajectory().to_path_buf(),
                code: describe_status(&status),
            });
        }

        if let Err(e) = fs::rename(&tmp, task.output()) {
            remove_scratch(&tmp);
            return Err(ToolError::MoveFailed {
                from: tmp,
                to: task.output().to_path_buf(),
                reason: e.to_string(),
            });
        }

        Ok(())
    }

    fn spawn_error(&self, e: std::io::Error) -> ToolError {
        if e.kind() == ErrorKind::NotFound {
            let hint = if self.amberhome_set {
                String::new()
            } else {
                format!(", env `{}` not assigned too", AMBERHOME_VAR)
            };
            ToolError::NotFound {
                program: self.program_name(),
                hint,
            }
        } else {
            ToolError::SpawnFailed {
                program: self.program_name(),
                reason: e.to_string(),
            }
        }
    }
}

fn remove_scratch(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => warn!("Suspicious tmp out traj file `{}` was deleted", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to delete tmp out traj file"),
    }
}

/// Exit code, or a note that the process was killed by a signal
fn describe_status(status: &ExitStatus) -> String {
    match status.code() {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_locate_explicit_wins() {
        let tool = Cpptraj::locate_with(Some(Path::new("/opt/x/cpptraj")), Some("/amber".into()));
        assert_eq!(tool.program(), Path::new("/opt/x/cpptraj"));
    }

    #[test]
    fn test_locate_amberhome() {
        let home = tempdir().unwrap();
        let bin = home.path().join("bin");
        fs::create_dir_all(&bin).unwrap();
        fs::write(bin.join(PROGRAM), b"").unwrap();

        let tool = Cpptraj::locate_with(None, Some(home.path().as_os_str().to_owned()));
        assert_eq!(tool.program(), bin.join(PROGRAM));
    }

    #[test]
    fn test_locate_falls_back_to_path() {
        let home = tempdir().unwrap();
        let tool = Cpptraj::locate_with(None, Some(home.path().as_os_str().to_owned()));
        assert_eq!(tool.program(), Path::new(PROGRAM));

        let tool = Cpptraj::locate_with(None, None);
        assert_eq!(tool.program(), Path::new(PROGRAM));
    }

    #[test]
    fn test_missing_program_hints_amberhome() {
        let tool = Cpptraj::locate_with(Some(Path::new("/nonexistent/traju/cpptraj")), None);
        match tool.preflight() {
            Err(ToolError::NotFound { hint, .. }) => assert!(hint.contains(AMBERHOME_VAR)),
            other => panic!("expected NotFound, got {:?}", other),
        }

        let tool = Cpptraj::locate_with(
            Some(Path::new("/nonexistent/traju/cpptraj")),
            Some("/amber".into()),
        );
        match tool.preflight() {
            Err(ToolError::NotFound { hint, .. }) => assert!(hint.is_empty()),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }
}
