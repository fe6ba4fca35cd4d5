use schedplot::WorkloadKind;
use serde::Serialize;

/// One timed run, as written to the per-run CSV and JSON report.
#[derive(Serialize, Debug, Clone)]
pub struct OutputRow {
    pub label: String,
    pub policy: String,
    pub threads: usize,
    pub run: usize,
    pub duration_ms: f64,
    pub iterations: usize,
    pub norm: f64,
}

/// Trimmed statistics for one (policy, threads) cell.
#[derive(Serialize, Debug, Clone)]
pub struct CellSummary {
    pub policy: String,
    pub threads: usize,
    pub runs_used: usize,
    pub mean_secs: f64,
}

#[derive(Serialize, Debug)]
pub struct ExperimentReport {
    pub name: String,
    pub workload: WorkloadKind,
    pub size: usize,
    pub runs: Vec<OutputRow>,
    pub cells: Vec<CellSummary>,
}
