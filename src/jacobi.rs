//! Jacobi iteration used as the measured workload.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::schedule::{Schedule, ScheduleError, parallel_map};
use crate::types::ThreadCount;

/// Dense system `A x = b` stored row-major.
#[derive(Debug, Clone)]
pub struct JacobiSystem {
    n: usize,
    a: Vec<f64>,
    b: Vec<f64>,
}

impl JacobiSystem {
    /// `A[i][i] = n + 1`, every other entry 1, and `b[i] = 2i + 1`.
    ///
    /// Strict diagonal dominance guarantees convergence.
    pub fn diagonally_dominant(n: usize) -> Self {
        let mut a = vec![1.0; n * n];
        for i in 0..n {
            a[i * n + i] = (n + 1) as f64;
        }
        let b = (0..n).map(|i| 2.0 * i as f64 + 1.0).collect();
        Self { n, a, b }
    }

    pub fn size(&self) -> usize {
        self.n
    }

    fn row(&self, i: usize) -> &[f64] {
        &self.a[i * self.n..(i + 1) * self.n]
    }

    /// `max_i |(A x - b)_i|`.
    pub fn residual(&self, x: &[f64]) -> f64 {
        (0..self.n)
            .map(|i| {
                let ax: f64 = self.row(i).iter().zip(x).map(|(a, x)| a * x).sum();
                (ax - self.b[i]).abs()
            })
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JacobiParams {
    pub eps: f64,
    pub max_iter: usize,
}

impl Default for JacobiParams {
    fn default() -> Self {
        Self {
            eps: 1e-6,
            max_iter: 1000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JacobiOutcome {
    pub iterations: usize,
    /// Max-norm of the final update.
    pub norm: f64,
    pub elapsed: Duration,
    pub solution: Vec<f64>,
}

/// Runs Jacobi sweeps until the update norm drops to `eps` or `max_iter`
/// sweeps have run. Each sweep is one parallel loop over the rows.
pub fn solve(
    system: &JacobiSystem,
    params: JacobiParams,
    threads: ThreadCount,
    schedule: Schedule,
) -> Result<JacobiOutcome, ScheduleError> {
    let n = system.n;
    let mut x_old = vec![0.0; n];
    let mut iterations = 0;
    let mut norm;

    let started = Instant::now();
    loop {
        let sweep = parallel_map(n, threads, schedule, |i| {
            let row = system.row(i);
            let off_diagonal: f64 = row
                .iter()
                .zip(&x_old)
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, (a, x))| a * x)
                .sum();
            let next = (system.b[i] - off_diagonal) / row[i];
            (next, (next - x_old[i]).abs())
        })?;

        norm = sweep.iter().map(|(_, diff)| *diff).fold(0.0, f64::max);
        x_old = sweep.into_iter().map(|(next, _)| next).collect();
        iterations += 1;

        if norm <= params.eps || iterations >= params.max_iter {
            break;
        }
    }
    let elapsed = started.elapsed();

    debug!(
        n,
        threads,
        %schedule,
        iterations,
        norm,
        elapsed_ms = elapsed.as_millis() as u64,
        "jacobi solve finished"
    );

    Ok(JacobiOutcome {
        iterations,
        norm,
        elapsed,
        solution: x_old,
    })
}
