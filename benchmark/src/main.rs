mod output;
mod workload;

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use schedplot::{BenchConfig, Schedule, ThreadCount, WorkloadKind};
use tracing_subscriber::EnvFilter;

use output::{ExperimentReport, OutputRow};

#[derive(Parser, Debug)]
#[command(name = "schedplot-benchmark")]
struct Args {
    /// Label for this run (used in output file names).
    #[arg(long, default_value = "jacobi")]
    label: String,

    /// Kernel to time.
    #[arg(long, value_enum, default_value_t = WorkloadArg::Jacobi)]
    workload: WorkloadArg,

    /// Jacobi system dimension, or Mandelbrot image width.
    #[arg(long, default_value_t = 1000)]
    size: usize,

    /// Convergence threshold on the update max-norm.
    #[arg(long, default_value_t = 1e-6)]
    eps: f64,

    /// Iteration cap per solve, or escape-time cap per pixel.
    #[arg(long, default_value_t = 1000)]
    max_iter: usize,

    /// Thread counts to measure; must include 1.
    #[arg(long, value_delimiter = ',', default_value = "1,2,4,6,8")]
    threads: Vec<ThreadCount>,

    /// Scheduling policies, e.g. `static,static:2,dynamic:2,guided`.
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "static,static:2,dynamic,dynamic:2,guided"
    )]
    policies: Vec<Schedule>,

    /// Number of times to run each cell (min and max dropped when >2).
    #[arg(long, default_value_t = 3)]
    runs: usize,

    /// Where to write the timing table JSON consumed by `schedplot --input`.
    #[arg(long, default_value = "benchmark/reports/timings.json")]
    out: PathBuf,

    /// Directory to write per-run CSV and JSON reports.
    #[arg(long, default_value = "benchmark/reports/csv")]
    csv_dir: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let plan = BenchConfig {
        workload: args.workload.to_kind(),
        size: args.size,
        eps: args.eps,
        max_iter: args.max_iter,
        threads: args.threads,
        policies: args.policies,
        runs: args.runs,
    };

    println!("=== {} ({:?}, n={}) ===", args.label, plan.workload, plan.size);
    let result = workload::run_matrix(&plan)?;
    println!();

    let rows = result
        .runs
        .iter()
        .map(|run| run.to_row(&args.label))
        .collect::<Vec<_>>();
    write_runs_csv(&args.csv_dir, &args.label, &rows)?;

    let report = ExperimentReport {
        name: args.label.clone(),
        workload: plan.workload,
        size: plan.size,
        runs: rows,
        cells: result.cells,
    };
    let report_path = args.csv_dir.join(format!("{}.json", args.label));
    std::fs::write(&report_path, serde_json::to_vec_pretty(&report)?)
        .with_context(|| format!("write {}", report_path.display()))?;
    println!("    wrote {}", report_path.display());

    if let Some(parent) = args.out.parent() {
        create_dir_all(parent)?;
    }
    std::fs::write(&args.out, result.table.to_json_vec()?)
        .with_context(|| format!("write {}", args.out.display()))?;
    println!("    wrote {}", args.out.display());

    Ok(())
}

fn write_runs_csv(dir: &Path, name: &str, rows: &[OutputRow]) -> Result<()> {
    create_dir_all(dir)?;
    let path = dir.join(format!("{name}.csv"));
    let mut file = File::create(&path)?;
    writeln!(file, "label,policy,threads,run,duration_ms,iterations,norm")?;

    for row in rows {
        writeln!(
            file,
            "{},\"{}\",{},{},{:.3},{},{:e}",
            row.label, row.policy, row.threads, row.run, row.duration_ms, row.iterations, row.norm
        )?;
    }

    println!("    wrote {}", path.display());
    Ok(())
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
enum WorkloadArg {
    Jacobi,
    Mandelbrot,
}

impl WorkloadArg {
    fn to_kind(self) -> WorkloadKind {
        match self {
            WorkloadArg::Jacobi => WorkloadKind::Jacobi,
            WorkloadArg::Mandelbrot => WorkloadKind::Mandelbrot,
        }
    }
}
