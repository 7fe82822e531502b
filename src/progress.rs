//! Progress reporting for trajectory processing
//!
//! Provides a single overwriting `completed/total` status line using indicatif,
//! plus the header and summary blocks printed around a run.

use crate::batch::BatchReport;
use crate::dispatch::DispatchProgress;
use crate::tasks::Task;
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

/// Status line showing how many tasks have finished
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a reporter for `total` tasks, drawn on stdout
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stdout());

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{pos}/{len} [{elapsed_precise}] {bar:30.cyan/blue} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );

        Self { bar }
    }

    /// Update the status line
    pub fn update(&self, progress: &DispatchProgress) {
        self.bar.set_position(progress.completed as u64);
        if progress.failed > 0 {
            self.bar
                .set_message(format!("{} failed", format_number(progress.failed as u64)));
        }
    }

    /// Leave the final line on screen
    pub fn finish(&self) {
        self.bar.finish();
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// List queued tasks before asking for confirmation
pub fn print_tasks<W: Write>(out: &mut W, tasks: &[Task]) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style("Queued trajectories").bold())?;
    for task in tasks {
        if task.is_in_place() {
            writeln!(out, "  {} {}", task.trajectory().display(), style("(in place)").dim())?;
        } else {
            writeln!(
                out,
                "  {} {} {}",
                task.trajectory().display(),
                style("→").dim(),
                task.output().display()
            )?;
        }
    }
    writeln!(out)
}

/// Print a header at the start of the run
pub fn print_header<W: Write>(
    out: &mut W,
    program: &str,
    workers: usize,
    tasks: usize,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{} {}",
        style("traju").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out, "{}", style("─".repeat(50)).dim())?;
    writeln!(out, "  {} {}", style("cpptraj:").bold(), program)?;
    writeln!(out, "  {} {}", style("Workers:").bold(), workers)?;
    writeln!(out, "  {} {}", style("Tasks:").bold(), format_number(tasks as u64))?;
    writeln!(out)
}

/// Print a summary of the run
pub fn print_summary<W: Write>(out: &mut W, report: &BatchReport) -> io::Result<()> {
    let result = &report.result;

    writeln!(out)?;
    if result.completed {
        writeln!(out, "{}", style("Run Complete").green().bold())?;
    } else {
        writeln!(out, "{}", style("Run Interrupted").yellow().bold())?;
    }
    writeln!(out, "{}", style("─".repeat(50)).dim())?;
    writeln!(
        out,
        "  {} {}",
        style("Tasks:").bold(),
        format_number(result.total as u64)
    )?;
    writeln!(
        out,
        "  {} {}",
        style("Succeeded:").bold(),
        format_number(result.succeeded as u64)
    )?;
    if !result.failed.is_empty() {
        writeln!(
            out,
            "  {} {}",
            style("Failed:").yellow().bold(),
            format_number(result.failed.len() as u64)
        )?;
        for path in &result.failed {
            writeln!(out, "    {}", path.display())?;
        }
    }
    if !report.skipped.is_empty() {
        writeln!(
            out,
            "  {} {}",
            style("Skipped:").yellow().bold(),
            format_number(report.skipped.len() as u64)
        )?;
    }
    if !report.missing.is_empty() {
        writeln!(
            out,
            "  {} {}",
            style("Missing:").yellow().bold(),
            format_number(report.missing.len() as u64)
        )?;
        for path in &report.missing {
            writeln!(out, "    {}", path.display())?;
        }
    }
    writeln!(
        out,
        "  {} {}",
        style("Output Size:").bold(),
        format_size(result.output_bytes, BINARY)
    )?;
    writeln!(
        out,
        "  {} {}",
        style("Duration:").bold(),
        format_duration(result.duration)
    )?;
    writeln!(out)
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}
