//! cpptraj input scripts

use crate::config::RunConfig;
use std::fmt::Write as _;
use std::path::Path;

/// Residue mask for water molecules
pub const WATER_MASK: &str = ":WAT";

/// Backbone atoms, over all residues
pub const BACKBONE_MASK: &str = "@CA,C,O,N,H";

/// Optional processing steps applied to every trajectory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptOptions {
    /// Remove water
    pub strip_water: bool,

    /// Align the backbone to the first frame
    pub align: bool,
}

impl ScriptOptions {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            strip_water: config.dehydrate,
            align: config.align,
        }
    }
}

/// Script fed to cpptraj on stdin for a single trajectory
#[derive(Debug, Clone)]
pub struct CpptrajScript<'a> {
    topology: &'a Path,
    trajectory: &'a Path,
    output: &'a Path,
    options: ScriptOptions,
}

impl<'a> CpptrajScript<'a> {
    pub fn new(topology: &'a Path, trajectory: &'a Path, output: &'a Path) -> Self {
        Self {
            topology,
            trajectory,
            output,
            options: ScriptOptions::default(),
        }
    }

    pub fn options(mut self, options: ScriptOptions) -> Self {
        self.options = options;
        self
    }

    /// Render the script text
    pub fn render(&self) -> String {
        let mut s = String::with_capacity(256);

        // Writing to a String cannot fail
        let _ = writeln!(s, "parm {}", quote(self.topology));
        let _ = writeln!(s, "trajin {}", quote(self.trajectory));
        if self.options.strip_water {
            let _ = writeln!(s, "strip {}", WATER_MASK);
        }
        if self.options.align {
            let _ = writeln!(s, "align {} first", BACKBONE_MASK);
        }
        let _ = writeln!(s, "trajout {}", quote(self.output));
        s.push_str("run\nquit\n");
        s
    }
}

/// Script used to check that cpptraj starts at all
pub fn noop_script() -> &'static str {
    "quit\n"
}

/// Double-quote paths containing whitespace so cpptraj keeps them as one argument
fn quote(path: &Path) -> String {
    let text = path.to_string_lossy();
    if text.chars().any(char::is_whitespace) {
        format!("\"{}\"", text)
    } else {
        text.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_script() {
        let script = CpptrajScript::new(
            Path::new("run/sys.prmtop"),
            Path::new("run/a.nc"),
            Path::new(".traju-x.nc"),
        )
        .render();

        assert_eq!(
            script,
            "parm run/sys.prmtop\ntrajin run/a.nc\ntrajout .traju-x.nc\nrun\nquit\n"
        );
    }

    #[test]
    fn test_strip_and_align() {
        let script = CpptrajScript::new(Path::new("s.prmtop"), Path::new("a.nc"), Path::new("o.nc"))
            .options(ScriptOptions {
                strip_water: true,
                align: true,
            })
            .render();

        let lines: Vec<&str> = script.lines().collect();
        assert_eq!(
            lines,
            vec![
                "parm s.prmtop",
                "trajin a.nc",
                "strip :WAT",
                "align @CA,C,O,N,H first",
                "trajout o.nc",
                "run",
                "quit",
            ]
        );
    }

    #[test]
    fn test_paths_with_spaces_are_quoted() {
        let script = CpptrajScript::new(
            Path::new("my run/s.prmtop"),
            Path::new("my run/a.nc"),
            Path::new("o.nc"),
        )
        .render();
        assert!(script.starts_with("parm \"my run/s.prmtop\"\ntrajin \"my run/a.nc\"\n"));
    }

    #[test]
    fn test_options_from_config() {
        let config = RunConfig {
            dehydrate: true,
            ..RunConfig::default()
        };
        let options = ScriptOptions::from_config(&config);
        assert!(options.strip_water);
        assert!(!options.align);
    }
}
