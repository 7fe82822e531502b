//! Output file naming

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Prefix of in-progress output files
pub const TEMP_PREFIX: &str = ".traju-";

/// How processed trajectories are named: `prefix + stem + postfix + "." + ext`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    pub prefix: String,
    pub postfix: String,
    /// Output extension without dot; empty keeps the input's extension
    pub ext: String,
}

impl OutputNaming {
    pub fn new(prefix: String, postfix: String, ext: String) -> Self {
        Self {
            prefix,
            postfix,
            ext,
        }
    }

    /// Extension used for the output of `trajectory`
    pub fn extension_for<'a>(&'a self, trajectory: &'a Path) -> Option<&'a OsStr> {
        if self.ext.is_empty() {
            trajectory.extension()
        } else {
            Some(OsStr::new(&self.ext))
        }
    }

    /// Derived output file name for `trajectory` (no directory part)
    pub fn file_name(&self, trajectory: &Path) -> PathBuf {
        let stem = trajectory.file_stem().unwrap_or_default();

        let mut name = std::ffi::OsString::with_capacity(
            self.prefix.len() + stem.len() + self.postfix.len() + self.ext.len() + 1,
        );
        name.push(&self.prefix);
        name.push(stem);
        name.push(&self.postfix);
        if let Some(ext) = self.extension_for(trajectory) {
            name.push(".");
            name.push(ext);
        }
        PathBuf::from(name)
    }
}

impl Default for OutputNaming {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            postfix: "_u".to_string(),
            ext: "nc".to_string(),
        }
    }
}

/// Unique scratch path next to `output`, keeping its extension
///
/// cpptraj picks the output format from the extension, and living in the same
/// folder keeps the final move a plain rename.
pub fn temporary_output(output: &Path) -> PathBuf {
    let mut name = std::ffi::OsString::from(TEMP_PREFIX);
    name.push(uuid::Uuid::new_v4().simple().to_string());
    if let Some(ext) = output.extension() {
        name.push(".");
        name.push(ext);
    }
    output.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_naming() {
        let naming = OutputNaming::default();
        assert_eq!(naming.file_name(Path::new("runs/md1.nc")), PathBuf::from("md1_u.nc"));
    }

    #[test]
    fn test_prefix_postfix_ext() {
        let naming = OutputNaming::new("dry_".into(), "".into(), "dcd".into());
        assert_eq!(naming.file_name(Path::new("md.prod.nc")), PathBuf::from("dry_md.prod.dcd"));
    }

    #[test]
    fn test_empty_ext_keeps_input_extension() {
        let naming = OutputNaming::new("".into(), "_u".into(), "".into());
        assert_eq!(naming.file_name(Path::new("a.mdcrd")), PathBuf::from("a_u.mdcrd"));
        assert_eq!(naming.file_name(Path::new("noext")), PathBuf::from("noext_u"));
    }

    #[test]
    fn test_temporary_output() {
        let tmp = temporary_output(Path::new("/data/run/a_u.nc"));
        assert_eq!(tmp.parent(), Some(Path::new("/data/run")));
        assert_eq!(tmp.extension(), Some(OsStr::new("nc")));

        let name = tmp.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(TEMP_PREFIX));

        let other = temporary_output(Path::new("/data/run/a_u.nc"));
        assert_ne!(tmp, other);
    }
}
