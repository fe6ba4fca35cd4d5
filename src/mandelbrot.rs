//! Mandelbrot escape-time rendering, a second measured workload.
//!
//! Rows cost very different amounts of work, which makes the gap between
//! static and dynamic schedules visible.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::schedule::{Schedule, ScheduleError, parallel_map};
use crate::types::ThreadCount;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MandelbrotParams {
    pub width: usize,
    pub height: usize,
    pub max_iter: u32,
}

impl Default for MandelbrotParams {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            max_iter: 1000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MandelbrotOutcome {
    /// Escape iteration per pixel, row-major.
    pub image: Vec<u32>,
    /// Sum of escape iterations over all pixels.
    pub work: u64,
    pub elapsed: Duration,
}

/// Iterations of `z = z^2 + c` before `|z| >= 2`, capped at `max_iter`.
pub fn escape_time(re: f64, im: f64, max_iter: u32) -> u32 {
    let (mut zr, mut zi) = (0.0f64, 0.0f64);
    let mut iter = 0;
    while zr * zr + zi * zi < 4.0 && iter < max_iter {
        let next_r = zr * zr - zi * zi + re;
        zi = 2.0 * zr * zi + im;
        zr = next_r;
        iter += 1;
    }
    iter
}

/// Renders the region `[-2, 1] x [-1.5, 1.5]`, one parallel loop over rows.
pub fn render(
    params: MandelbrotParams,
    threads: ThreadCount,
    schedule: Schedule,
) -> Result<MandelbrotOutcome, ScheduleError> {
    let MandelbrotParams {
        width,
        height,
        max_iter,
    } = params;

    let started = Instant::now();
    let rows = parallel_map(height, threads, schedule, |y| {
        let imag = -1.5 + (y as f64 * 3.0) / height as f64;
        (0..width)
            .map(|x| {
                let real = -2.0 + (x as f64 * 3.0) / width as f64;
                escape_time(real, imag, max_iter)
            })
            .collect::<Vec<_>>()
    })?;
    let elapsed = started.elapsed();

    let image: Vec<u32> = rows.into_iter().flatten().collect();
    let work = image.iter().map(|i| u64::from(*i)).sum();
    debug!(
        width,
        height,
        threads,
        %schedule,
        work,
        elapsed_ms = elapsed.as_millis() as u64,
        "mandelbrot render finished"
    );

    Ok(MandelbrotOutcome {
        image,
        work,
        elapsed,
    })
}

/// Writes the image as an ASCII PGM (`P2`) with levels `iter % 255`.
pub fn write_pgm<W: Write>(writer: &mut W, image: &[u32], width: usize) -> io::Result<()> {
    let height = if width == 0 { 0 } else { image.len() / width };
    writeln!(writer, "P2")?;
    writeln!(writer, "{width} {height}")?;
    writeln!(writer, "255")?;
    for row in image.chunks(width.max(1)) {
        let line = row
            .iter()
            .map(|i| (i % 255).to_string())
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{line}")?;
    }
    Ok(())
}
