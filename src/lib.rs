//! Core crate exports for schedplot.
//!
//! Timing tables hold execution time per thread count for each scheduling
//! policy. Speedup tables, charts and reports are derived from them. The
//! `schedule`, `jacobi` and `mandelbrot` modules provide the workloads the
//! benchmark harness measures to produce such tables.

pub mod chart;
pub mod config;
pub mod jacobi;
pub mod mandelbrot;
pub mod report;
pub mod schedule;
pub mod table;
pub mod types;

pub use chart::{ChartError, RenderedCharts, render_all};
pub use config::{BenchConfig, ChartConfig, ChartLabels, ConfigError, WorkloadKind};
pub use jacobi::{JacobiOutcome, JacobiParams, JacobiSystem};
pub use mandelbrot::{MandelbrotOutcome, MandelbrotParams};
pub use schedule::{Schedule, ScheduleError, ScheduleKind, parallel_map};
pub use table::{PolicySeries, SpeedupTable, TableError, TimingTable};
pub use types::{BASELINE_THREADS, Seconds, ThreadCount};
