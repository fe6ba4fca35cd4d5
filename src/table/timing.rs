use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{BASELINE_THREADS, Seconds, ThreadCount, is_valid_timing};

use super::error::TableError;
use super::speedup::{SpeedupTable, compute_speedup};

/// One named column of a benchmark table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicySeries {
    pub name: String,
    pub times: Vec<Seconds>,
}

impl PolicySeries {
    pub fn new(name: impl Into<String>, times: Vec<Seconds>) -> Self {
        Self {
            name: name.into(),
            times,
        }
    }
}

/// Execution time per thread count for every scheduling policy.
///
/// Rows are keyed by thread count. Construction validates the table shape, so
/// a `TimingTable` always has equal-length columns, strictly increasing thread
/// counts, a single-thread baseline row, and positive finite timings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawTimingTable")]
pub struct TimingTable {
    threads: Vec<ThreadCount>,
    series: Vec<PolicySeries>,
}

#[derive(Deserialize)]
struct RawTimingTable {
    threads: Vec<ThreadCount>,
    series: Vec<PolicySeries>,
}

impl TryFrom<RawTimingTable> for TimingTable {
    type Error = TableError;

    fn try_from(raw: RawTimingTable) -> Result<Self, Self::Error> {
        TimingTable::new(raw.threads, raw.series)
    }
}

impl TimingTable {
    pub fn new(threads: Vec<ThreadCount>, series: Vec<PolicySeries>) -> Result<Self, TableError> {
        if threads.is_empty() || series.is_empty() {
            return Err(TableError::Empty);
        }

        for pair in threads.windows(2) {
            if pair[0] >= pair[1] {
                return Err(TableError::Unordered {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }

        // Counts are increasing, so only the first row can hold zero.
        if threads[0] == 0 {
            return Err(TableError::ZeroThreads);
        }

        // Ordering already rules out duplicates, so a single match is enough.
        if !threads.contains(&BASELINE_THREADS) {
            return Err(TableError::MissingBaseline);
        }

        let mut seen = HashSet::new();
        for column in &series {
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicatePolicy(column.name.clone()));
            }
            if column.times.len() != threads.len() {
                return Err(TableError::RaggedSeries {
                    policy: column.name.clone(),
                    expected: threads.len(),
                    actual: column.times.len(),
                });
            }
            if let Some((idx, value)) = column
                .times
                .iter()
                .enumerate()
                .find(|(_, value)| !is_valid_timing(**value))
            {
                return Err(TableError::InvalidTiming {
                    policy: column.name.clone(),
                    threads: threads[idx],
                    value: *value,
                });
            }
        }

        Ok(Self { threads, series })
    }

    /// Jacobi solver timings collected for five scheduling policies.
    pub fn reference() -> Self {
        let threads = vec![1, 2, 4, 6, 8];
        let series = vec![
            PolicySeries::new("Static", vec![18.23, 8.62, 5.39, 6.45, 4.47]),
            PolicySeries::new("Static, 2", vec![17.26, 8.64, 5.25, 6.48, 4.48]),
            PolicySeries::new("Dynamic", vec![17.18, 8.62, 4.83, 4.92, 4.54]),
            PolicySeries::new("Dynamic, 2", vec![16.25, 8.59, 5.34, 4.53, 4.35]),
            PolicySeries::new("Guided", vec![16.48, 8.71, 5.77, 5.08, 4.69]),
        ];
        Self { threads, series }
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, TableError> {
        let raw: RawTimingTable = serde_json::from_slice(bytes)?;
        Self::try_from(raw)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, TableError> {
        let bytes = std::fs::read(path)?;
        let table = Self::from_json_slice(&bytes)?;
        debug!(
            path = %path.display(),
            rows = table.row_count(),
            policies = table.series.len(),
            "loaded timing table"
        );
        Ok(table)
    }

    pub fn to_json_vec(&self) -> Result<Vec<u8>, TableError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn threads(&self) -> &[ThreadCount] {
        &self.threads
    }

    pub fn series(&self) -> &[PolicySeries] {
        &self.series
    }

    pub fn policy(&self, name: &str) -> Result<&PolicySeries, TableError> {
        self.series
            .iter()
            .find(|column| column.name == name)
            .ok_or_else(|| TableError::UnknownPolicy(name.to_string()))
    }

    pub fn row_count(&self) -> usize {
        self.threads.len()
    }

    /// Index of the single-thread row.
    pub fn baseline_row(&self) -> Result<usize, TableError> {
        self.threads
            .iter()
            .position(|threads| *threads == BASELINE_THREADS)
            .ok_or(TableError::MissingBaseline)
    }

    /// Time for `policy` at exactly `threads`, if that row exists.
    pub fn time_at(&self, policy: &str, threads: ThreadCount) -> Result<Option<Seconds>, TableError> {
        let column = self.policy(policy)?;
        Ok(self
            .threads
            .iter()
            .position(|t| *t == threads)
            .map(|idx| column.times[idx]))
    }

    pub fn speedup(&self) -> Result<SpeedupTable, TableError> {
        let series = compute_speedup(&self.threads, &self.series)?;
        Ok(SpeedupTable::new(self.threads.clone(), series))
    }

    /// Largest timing across every policy, used to size chart axes.
    pub fn max_time(&self) -> Seconds {
        self.series
            .iter()
            .flat_map(|column| column.times.iter().copied())
            .fold(0.0, f64::max)
    }
}
