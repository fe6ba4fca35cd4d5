use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use schedplot::jacobi::{self, JacobiParams, JacobiSystem};
use schedplot::mandelbrot::{self, MandelbrotParams};
use schedplot::{BenchConfig, PolicySeries, Schedule, ThreadCount, TimingTable, WorkloadKind};
use tracing::{info, warn};

use crate::output::{CellSummary, OutputRow};

#[derive(Clone, Debug)]
pub struct RunMeasurement {
    pub policy: Schedule,
    pub threads: ThreadCount,
    pub run: usize,
    pub duration: Duration,
    /// Jacobi sweeps, or total escape iterations for Mandelbrot.
    pub iterations: usize,
    /// Final update norm; zero for Mandelbrot.
    pub norm: f64,
}

/// Prepared input for one workload, shared by every run of the matrix.
enum Kernel {
    Jacobi(JacobiSystem, JacobiParams),
    Mandelbrot(MandelbrotParams),
}

impl Kernel {
    fn prepare(plan: &BenchConfig) -> Result<Self> {
        Ok(match plan.workload {
            WorkloadKind::Jacobi => Kernel::Jacobi(
                JacobiSystem::diagonally_dominant(plan.size),
                JacobiParams {
                    eps: plan.eps,
                    max_iter: plan.max_iter,
                },
            ),
            WorkloadKind::Mandelbrot => Kernel::Mandelbrot(MandelbrotParams {
                width: plan.size,
                height: (plan.size * 3 / 4).max(1),
                max_iter: u32::try_from(plan.max_iter)
                    .context("max_iter does not fit an escape-time counter")?,
            }),
        })
    }
}

impl RunMeasurement {
    pub fn to_row(&self, label: &str) -> OutputRow {
        OutputRow {
            label: label.to_string(),
            policy: self.policy.label(),
            threads: self.threads,
            run: self.run + 1,
            duration_ms: self.duration.as_secs_f64() * 1000.0,
            iterations: self.iterations,
            norm: self.norm,
        }
    }
}

/// Every run of the matrix plus the table of trimmed means.
pub struct MatrixResult {
    pub runs: Vec<RunMeasurement>,
    pub cells: Vec<CellSummary>,
    pub table: TimingTable,
}

pub fn validate(plan: &BenchConfig) -> Result<()> {
    if plan.size == 0 {
        return Err(anyhow!("problem size must be greater than zero"));
    }
    if plan.runs == 0 {
        return Err(anyhow!("runs must be greater than zero"));
    }
    if plan.policies.is_empty() {
        return Err(anyhow!("at least one policy is required"));
    }
    if !plan.threads.contains(&schedplot::BASELINE_THREADS) {
        return Err(anyhow!("thread counts must include 1 for the speedup baseline"));
    }
    if plan.threads.contains(&0) {
        return Err(anyhow!("thread counts must be greater than zero"));
    }
    Ok(())
}

/// Times the configured workload for every (policy, threads) pair.
///
/// Thread counts are sorted and deduplicated so the resulting table is valid.
pub fn run_matrix(plan: &BenchConfig) -> Result<MatrixResult> {
    validate(plan)?;

    let mut threads = plan.threads.clone();
    threads.sort_unstable();
    threads.dedup();

    let kernel = Kernel::prepare(plan)?;

    let mut runs = Vec::new();
    let mut cells = Vec::new();
    let mut series = Vec::new();

    for policy in &plan.policies {
        let mut times = Vec::with_capacity(threads.len());
        for &thread_count in &threads {
            let mut cell_runs = Vec::with_capacity(plan.runs);
            for run in 0..plan.runs {
                let measurement = run_once(&kernel, *policy, thread_count, run)?;
                println!(
                    "  {:<12} T={:>2} run {:>2}: {:>10.2?} ({} iterations)",
                    policy.label(),
                    thread_count,
                    run + 1,
                    measurement.duration,
                    measurement.iterations
                );
                cell_runs.push(measurement);
            }

            let summary = trim_runs(&cell_runs);
            info!(
                policy = %policy,
                threads = thread_count,
                mean_secs = summary.mean_secs,
                "cell finished"
            );
            times.push(summary.mean_secs);
            cells.push(CellSummary {
                policy: policy.label(),
                threads: thread_count,
                runs_used: summary.runs_used,
                mean_secs: summary.mean_secs,
            });
            runs.extend(cell_runs);
        }
        series.push(PolicySeries::new(policy.label(), times));
    }

    let table = TimingTable::new(threads, series).context("assemble timing table")?;
    Ok(MatrixResult { runs, cells, table })
}

fn run_once(
    kernel: &Kernel,
    policy: Schedule,
    threads: ThreadCount,
    run: usize,
) -> Result<RunMeasurement> {
    let (duration, iterations, norm) = match kernel {
        Kernel::Jacobi(system, params) => {
            let outcome = jacobi::solve(system, *params, threads, policy)
                .with_context(|| format!("solve with {policy} on {threads} threads"))?;
            if outcome.norm > params.eps {
                warn!(
                    policy = %policy,
                    threads,
                    norm = outcome.norm,
                    "solver hit the iteration cap before converging"
                );
            }
            (outcome.elapsed, outcome.iterations, outcome.norm)
        }
        Kernel::Mandelbrot(params) => {
            let outcome = mandelbrot::render(*params, threads, policy)
                .with_context(|| format!("render with {policy} on {threads} threads"))?;
            (outcome.elapsed, outcome.work as usize, 0.0)
        }
    };

    Ok(RunMeasurement {
        policy,
        threads,
        run,
        duration,
        iterations,
        norm,
    })
}

pub struct TrimmedStats {
    pub runs_used: usize,
    pub mean_secs: f64,
}

/// Mean duration after dropping the fastest and slowest run when more than
/// two runs are available.
pub fn trim_runs(runs: &[RunMeasurement]) -> TrimmedStats {
    if runs.is_empty() {
        return TrimmedStats {
            runs_used: 0,
            mean_secs: 0.0,
        };
    }

    let mut ordered = runs.iter().map(|run| run.duration).collect::<Vec<_>>();
    ordered.sort();

    let slice = if ordered.len() > 2 {
        &ordered[1..ordered.len() - 1]
    } else {
        &ordered[..]
    };

    let mean_secs =
        slice.iter().map(Duration::as_secs_f64).sum::<f64>() / (slice.len() as f64);

    TrimmedStats {
        runs_used: slice.len(),
        mean_secs,
    }
}
