use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::schedule::Schedule;
use crate::types::ThreadCount;

/// Chart rendering configuration.
///
/// Every field has a default, so a JSON config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    /// Directory the chart files are written into.
    pub output_dir: PathBuf,
    /// File name of the execution time chart.
    pub time_file: String,
    /// File name of the speedup chart.
    pub speedup_file: String,
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    pub labels: ChartLabels,
}

/// Text placed on the charts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChartLabels {
    pub time_title: String,
    pub speedup_title: String,
    pub threads_axis: String,
    pub time_axis: String,
    pub speedup_axis: String,
    pub legend_title: String,
    pub ideal: String,
}

impl Default for ChartLabels {
    fn default() -> Self {
        Self {
            time_title: "Execution time vs. thread count and scheduling policy".into(),
            speedup_title: "Speedup vs. thread count and scheduling policy".into(),
            threads_axis: "Threads".into(),
            time_axis: "Execution time (s)".into(),
            speedup_axis: "Speedup".into(),
            legend_title: "Scheduling policy".into(),
            ideal: "Ideal speedup".into(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            time_file: "execution_time.svg".into(),
            speedup_file: "speedup.svg".into(),
            width: 1000,
            height: 600,
            labels: ChartLabels::default(),
        }
    }
}

impl ChartConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn time_path(&self) -> PathBuf {
        self.output_dir.join(&self.time_file)
    }

    pub fn speedup_path(&self) -> PathBuf {
        self.output_dir.join(&self.speedup_file)
    }
}

/// Kernel timed by the benchmark harness.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadKind {
    /// Dense Jacobi solve; `size` is the system dimension.
    #[default]
    Jacobi,
    /// Escape-time image; `size` is the width, the height is `3/4` of it.
    Mandelbrot,
}

/// Parameters for timing a kernel across thread counts and policies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenchConfig {
    #[serde(default)]
    pub workload: WorkloadKind,
    /// Problem size, interpreted per workload.
    pub size: usize,
    /// Convergence threshold on the max-norm of an update.
    pub eps: f64,
    pub max_iter: usize,
    pub threads: Vec<ThreadCount>,
    pub policies: Vec<Schedule>,
    /// Repetitions per (threads, policy) cell.
    pub runs: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            workload: WorkloadKind::Jacobi,
            size: 1000,
            eps: 1e-6,
            max_iter: 1000,
            threads: vec![1, 2, 4, 6, 8],
            policies: vec![
                Schedule::static_blocks(),
                Schedule::static_chunks(2),
                Schedule::dynamic(None),
                Schedule::dynamic(Some(2)),
                Schedule::guided(None),
            ],
            runs: 1,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ChartConfig =
            serde_json::from_str(r#"{"width": 640, "labels": {"ideal": "Linear"}}"#).unwrap();
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 600);
        assert_eq!(config.labels.ideal, "Linear");
        assert_eq!(config.labels.legend_title, "Scheduling policy");
        assert_eq!(config.time_file, "execution_time.svg");
    }

    #[test]
    fn paths_join_output_dir() {
        let config = ChartConfig::default().with_output_dir("/tmp/charts");
        assert_eq!(config.time_path(), PathBuf::from("/tmp/charts/execution_time.svg"));
        assert_eq!(config.speedup_path(), PathBuf::from("/tmp/charts/speedup.svg"));
    }

    #[test]
    fn default_bench_matches_reference_policies() {
        let labels: Vec<String> = BenchConfig::default()
            .policies
            .iter()
            .map(Schedule::label)
            .collect();
        assert_eq!(
            labels,
            ["Static", "Static, 2", "Dynamic", "Dynamic, 2", "Guided"]
        );
    }

    #[test]
    fn workload_names_are_lowercase() {
        let kind: WorkloadKind = serde_json::from_str(r#""mandelbrot""#).unwrap();
        assert_eq!(kind, WorkloadKind::Mandelbrot);
        assert_eq!(serde_json::to_string(&WorkloadKind::Jacobi).unwrap(), r#""jacobi""#);
    }
}
