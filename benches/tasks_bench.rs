//! Benchmarks for traju
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::path::{Path, PathBuf};

fn benchmark_output_naming(c: &mut Criterion) {
    use traju::tasks::OutputNaming;

    c.bench_function("output_file_name", |b| {
        let naming = OutputNaming::default();
        let traj = Path::new("/data/runs/replica_07/production.nc");

        b.iter(|| black_box(naming.file_name(black_box(traj))))
    });
}

fn benchmark_script_render(c: &mut Criterion) {
    use traju::cpptraj::{CpptrajScript, ScriptOptions};

    c.bench_function("script_render", |b| {
        let options = ScriptOptions {
            strip_water: true,
            align: true,
        };

        b.iter(|| {
            let script = CpptrajScript::new(
                Path::new("/data/sys.prmtop"),
                Path::new("/data/md.nc"),
                Path::new("/work/.traju-0.nc"),
            )
            .options(options)
            .render();
            black_box(script);
        })
    });
}

fn benchmark_collision_check(c: &mut Criterion) {
    use traju::tasks::{check_unique_outputs, Task};

    let tasks: Vec<Task> = (0..10_000)
        .map(|i| {
            Task::new(
                PathBuf::from(format!("/data/run{}/sys.prmtop", i)),
                PathBuf::from(format!("/data/run{}/md.nc", i)),
                PathBuf::from(format!("/data/run{}/./md_u.nc", i)),
            )
        })
        .collect();

    c.bench_function("check_unique_outputs_10k", |b| {
        b.iter(|| black_box(check_unique_outputs(&tasks, Path::new("/work")).is_ok()))
    });
}

criterion_group!(
    benches,
    benchmark_output_naming,
    benchmark_script_render,
    benchmark_collision_check
);
criterion_main!(benches);
