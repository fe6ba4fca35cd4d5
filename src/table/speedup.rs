use serde::Serialize;

use crate::types::{BASELINE_THREADS, ThreadCount, is_valid_timing};

use super::error::TableError;
use super::timing::PolicySeries;

/// Speedup of every policy relative to its own single-thread time.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpeedupTable {
    threads: Vec<ThreadCount>,
    series: Vec<PolicySeries>,
}

/// Divides each column's single-thread time by every time in that column.
///
/// Works on unvalidated columns: the baseline row is looked up by value and
/// each divisor is checked before use.
pub fn compute_speedup(
    threads: &[ThreadCount],
    series: &[PolicySeries],
) -> Result<Vec<PolicySeries>, TableError> {
    let baseline = threads
        .iter()
        .position(|t| *t == BASELINE_THREADS)
        .ok_or(TableError::MissingBaseline)?;

    series
        .iter()
        .map(|column| {
            if column.times.len() != threads.len() {
                return Err(TableError::RaggedSeries {
                    policy: column.name.clone(),
                    expected: threads.len(),
                    actual: column.times.len(),
                });
            }

            let invalid = |idx: usize| TableError::InvalidTiming {
                policy: column.name.clone(),
                threads: threads[idx],
                value: column.times[idx],
            };

            let t1 = column.times[baseline];
            if !is_valid_timing(t1) {
                return Err(invalid(baseline));
            }

            let ratios = column
                .times
                .iter()
                .enumerate()
                .map(|(idx, time)| {
                    if is_valid_timing(*time) {
                        Ok(t1 / time)
                    } else {
                        Err(invalid(idx))
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok(PolicySeries::new(column.name.clone(), ratios))
        })
        .collect()
}

impl SpeedupTable {
    pub(crate) fn new(threads: Vec<ThreadCount>, series: Vec<PolicySeries>) -> Self {
        Self { threads, series }
    }

    pub fn threads(&self) -> &[ThreadCount] {
        &self.threads
    }

    /// Speedup columns, in the same order as the timing table. The `times`
    /// field of each series holds unitless ratios.
    pub fn series(&self) -> &[PolicySeries] {
        &self.series
    }

    pub fn row_count(&self) -> usize {
        self.threads.len()
    }

    pub fn column_count(&self) -> usize {
        self.series.len()
    }

    pub fn policy(&self, name: &str) -> Result<&[f64], TableError> {
        self.series
            .iter()
            .find(|column| column.name == name)
            .map(|column| column.times.as_slice())
            .ok_or_else(|| TableError::UnknownPolicy(name.to_string()))
    }

    pub fn speedup_at(&self, name: &str, threads: ThreadCount) -> Result<Option<f64>, TableError> {
        let column = self.policy(name)?;
        Ok(self
            .threads
            .iter()
            .position(|t| *t == threads)
            .map(|idx| column[idx]))
    }

    /// Linear scaling reference: speedup equal to the thread count.
    pub fn ideal(&self) -> Vec<f64> {
        self.threads.iter().map(|t| *t as f64).collect()
    }

    /// Speedup divided by thread count for one policy.
    pub fn efficiency(&self, name: &str) -> Result<Vec<f64>, TableError> {
        let column = self.policy(name)?;
        Ok(column
            .iter()
            .zip(&self.threads)
            .map(|(speedup, threads)| speedup / *threads as f64)
            .collect())
    }

    pub fn max_speedup(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|column| column.times.iter().copied())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_row_is_found_by_value_not_position() {
        let threads = [4, 1, 2];
        let series = [PolicySeries::new("Guided", vec![2.0, 8.0, 4.0])];
        let speedup = compute_speedup(&threads, &series).unwrap();
        assert_eq!(speedup[0].times, vec![4.0, 1.0, 2.0]);
    }

    #[test]
    fn missing_baseline_is_an_error() {
        let series = [PolicySeries::new("Static", vec![2.0, 1.0])];
        let err = compute_speedup(&[2, 4], &series).unwrap_err();
        assert!(matches!(err, TableError::MissingBaseline));
    }

    #[test]
    fn zero_timing_is_an_error() {
        let series = [PolicySeries::new("Static", vec![2.0, 0.0])];
        let err = compute_speedup(&[1, 2], &series).unwrap_err();
        assert!(matches!(
            err,
            TableError::InvalidTiming { threads: 2, value, .. } if value == 0.0
        ));

        let series = [PolicySeries::new("Static", vec![0.0, 1.0])];
        let err = compute_speedup(&[1, 2], &series).unwrap_err();
        assert!(matches!(err, TableError::InvalidTiming { threads: 1, .. }));
    }

    #[test]
    fn ragged_column_is_an_error() {
        let series = [PolicySeries::new("Static", vec![2.0])];
        let err = compute_speedup(&[1, 2], &series).unwrap_err();
        assert!(matches!(err, TableError::RaggedSeries { .. }));
    }

    #[test]
    fn efficiency_divides_by_threads() {
        let table = SpeedupTable::new(
            vec![1, 2, 4],
            vec![PolicySeries::new("Dynamic", vec![1.0, 1.5, 3.0])],
        );
        assert_eq!(table.efficiency("Dynamic").unwrap(), vec![1.0, 0.75, 0.75]);
        assert_eq!(table.ideal(), vec![1.0, 2.0, 4.0]);
        assert_eq!(table.max_speedup(), 3.0);
    }
}
