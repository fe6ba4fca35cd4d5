/// Number of worker threads a measurement was taken with.
pub type ThreadCount = usize;
/// Wall-clock duration in seconds.
pub type Seconds = f64;

/// Thread count whose row normalizes every speedup column.
pub const BASELINE_THREADS: ThreadCount = 1;

/// Returns true for a timing value that can take part in a speedup ratio.
pub fn is_valid_timing(value: Seconds) -> bool {
    value.is_finite() && value > 0.0
}
