//! Trajectory discovery
//!
//! Turns the paths given on the command line into a list of trajectory files:
//! - files are taken as-is
//! - directories are scanned for `*.<ext>` (or `**/*.<ext>` when recursive)
//!
//! The result is deduplicated, keeping the first occurrence of every file.

use crate::config::RunConfig;
use crate::error::{Result, TaskError};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Trajectories found for a run
#[derive(Debug, Default, Clone)]
pub struct Discovered {
    /// Files named directly on the command line
    pub explicit: Vec<PathBuf>,

    /// Files found by scanning directories
    pub found: Vec<PathBuf>,

    /// Inputs that do not exist (non-strict runs only)
    pub missing: Vec<PathBuf>,
}

impl Discovered {
    /// Total number of trajectories
    pub fn len(&self) -> usize {
        self.explicit.len() + self.found.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume into a flat list, explicit ones first
    pub fn into_trajectories(self) -> Vec<PathBuf> {
        let mut all = self.explicit;
        all.extend(self.found);
        all
    }
}

/// Finds trajectory files under the configured inputs
pub struct TrajectoryFinder {
    extensions: Vec<String>,
    recursive: bool,
    strict: bool,
    list: bool,
    base: PathBuf,
}

impl TrajectoryFinder {
    /// Create a finder resolving relative inputs against `base`
    pub fn with_base(config: &RunConfig, base: PathBuf) -> Self {
        Self {
            extensions: config.traj_exts.clone(),
            recursive: config.recursive,
            strict: config.strict,
            list: !config.silent,
            base,
        }
    }

    /// Find trajectories under `paths`
    pub fn find(&self, paths: &[PathBuf]) -> Result<Discovered> {
        let mut discovered = Discovered::default();
        let mut seen = HashSet::new();
        let mut dirs = Vec::new();

        for path in paths {
            if path.is_file() {
                if seen.insert(normalize_path(path, &self.base)) {
                    discovered.explicit.push(path.clone());
                }
            } else if path.is_dir() {
                dirs.push(path);
            } else if self.strict {
                return Err(TaskError::InputNotFound { path: path.clone() }.into());
            } else {
                warn!(path = %path.display(), "Input path does not exist, skipping");
                discovered.missing.push(path.clone());
            }
        }

        if !discovered.explicit.is_empty() {
            info!("{} traj(s) specified explicitly", discovered.explicit.len());
            if self.list {
                for traj in &discovered.explicit {
                    println!("* {}", traj.display());
                }
            }
        }

        if dirs.is_empty() {
            return Ok(discovered);
        }

        for dir in dirs {
            let mut matches = Vec::new();
            self.scan(dir, &mut matches)?;
            matches.sort();
            for path in matches {
                if seen.insert(normalize_path(&path, &self.base)) {
                    discovered.found.push(path);
                } else {
                    debug!(path = %path.display(), "Duplicate trajectory ignored");
                }
            }
        }

        if self.recursive {
            info!(
                "{} traj(s) found in folder and subfolders recursively",
                discovered.found.len()
            );
        } else {
            info!("{} traj(s) found in folder", discovered.found.len());
        }

        if self.list {
            for traj in &discovered.found {
                println!(" * {}", traj.display());
            }
        }

        Ok(discovered)
    }

    /// Collect matching files under `root`
    fn scan(&self, root: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                // The root must be readable; subfolders are best effort
                Err(e) if dir.as_path() == root => return Err(e.into()),
                Err(e) => {
                    warn!(path = %dir.display(), error = %e, "Cannot read folder, skipping");
                    continue;
                }
            };

            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(path = %dir.display(), error = %e, "Cannot read folder entry, skipping");
                        continue;
                    }
                };
                let path = entry.path();
                let file_type = match entry.file_type() {
                    Ok(file_type) => file_type,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Cannot stat entry, skipping");
                        continue;
                    }
                };

                if file_type.is_dir() {
                    if self.recursive {
                        pending.push(path);
                    }
                } else if path.is_file() && self.matches(&path) {
                    out.push(path);
                }
            }
        }

        Ok(())
    }

    fn matches(&self, path: &Path) -> bool {
        has_extension(path, &self.extensions)
    }
}

/// Check whether `path` ends in one of `extensions` (given without dots)
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => extensions.iter().any(|want| want == ext),
        None => false,
    }
}

/// Lexically normalize a path against `base`, without touching the filesystem
///
/// Relative paths are joined onto `base`; `.` components are dropped and `..`
/// pops the previous normal component.
pub fn normalize_path(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    fn finder(exts: &[&str], recursive: bool, strict: bool) -> TrajectoryFinder {
        TrajectoryFinder {
            extensions: exts.iter().map(|e| e.to_string()).collect(),
            recursive,
            strict,
            list: false,
            base: PathBuf::from("/work"),
        }
    }

    #[test]
    fn test_scan_flat_folder() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("b.nc"));
        touch(&dir.path().join("a.nc"));
        touch(&dir.path().join("sys.prmtop"));
        touch(&dir.path().join("sub/c.nc"));

        let found = finder(&["nc"], false, false)
            .find(&[dir.path().to_path_buf()])
            .unwrap();

        assert!(found.explicit.is_empty());
        assert_eq!(
            found.found,
            vec![dir.path().join("a.nc"), dir.path().join("b.nc")]
        );
    }

    #[test]
    fn test_scan_recursive() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.nc"));
        touch(&dir.path().join("sub/c.nc"));
        touch(&dir.path().join("sub/deeper/d.mdcrd"));
        touch(&dir.path().join("sub/deeper/notes.txt"));

        let found = finder(&["nc", "mdcrd"], true, false)
            .find(&[dir.path().to_path_buf()])
            .unwrap();

        assert_eq!(
            found.found,
            vec![
                dir.path().join("a.nc"),
                dir.path().join("sub/c.nc"),
                dir.path().join("sub/deeper/d.mdcrd"),
            ]
        );
    }

    #[test]
    fn test_explicit_files_taken_as_is() {
        let dir = tempdir().unwrap();
        let odd = dir.path().join("traj.dat");
        touch(&odd);

        let found = finder(&["nc"], false, false).find(&[odd.clone()]).unwrap();
        assert_eq!(found.explicit, vec![odd]);
        assert!(found.found.is_empty());
    }

    #[test]
    fn test_deduplicates_overlapping_inputs() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.nc");
        touch(&a);

        let found = finder(&["nc"], false, false)
            .find(&[a.clone(), dir.path().to_path_buf(), dir.path().join(".")])
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found.into_trajectories(), vec![a]);
    }

    #[test]
    fn test_missing_input() {
        let dir = tempdir().unwrap();
        let ghost = dir.path().join("ghost.nc");

        let found = finder(&["nc"], false, false).find(&[ghost.clone()]).unwrap();
        assert!(found.is_empty());
        assert_eq!(found.missing, vec![ghost.clone()]);

        let err = finder(&["nc"], false, true).find(&[ghost]).unwrap_err();
        assert!(matches!(
            err,
            crate::error::TrajuError::Task(TaskError::InputNotFound { .. })
        ));
    }

    #[test]
    fn test_has_extension() {
        let exts = vec!["nc".to_string(), "mdcrd".to_string()];
        assert!(has_extension(Path::new("x/a.nc"), &exts));
        assert!(has_extension(Path::new("a.mdcrd"), &exts));
        assert!(!has_extension(Path::new("a.ncdf"), &exts));
        assert!(!has_extension(Path::new("nc"), &exts));
    }

    #[test]
    fn test_normalize_path() {
        let base = Path::new("/work");
        assert_eq!(normalize_path(Path::new("a.nc"), base), PathBuf::from("/work/a.nc"));
        assert_eq!(normalize_path(Path::new("./a.nc"), base), PathBuf::from("/work/a.nc"));
        assert_eq!(
            normalize_path(Path::new("runs/../a.nc"), base),
            PathBuf::from("/work/a.nc")
        );
        assert_eq!(normalize_path(Path::new("/x/./y"), base), PathBuf::from("/x/y"));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_survives_unusable_entries() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        touch(&dir.path().join("sub/c.nc"));
        symlink(dir.path().join("nowhere"), dir.path().join("sub/dangling.nc")).unwrap();
        symlink(dir.path().join("sub"), dir.path().join("sub/loop")).unwrap();

        let found = finder(&["nc"], true, false)
            .find(&[dir.path().to_path_buf()])
            .unwrap();

        assert_eq!(found.found, vec![dir.path().join("sub/c.nc")]);
    }
}
