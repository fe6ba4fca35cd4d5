//! OpenMP-style loop scheduling over a scoped thread pool.
//!
//! A [`Schedule`] decides how the iterations `0..len` of a parallel loop are
//! cut into chunks and handed to workers. Static schedules fix the assignment
//! up front; dynamic and guided schedules claim chunks from a shared cursor as
//! workers become free.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::types::ThreadCount;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("thread count must be greater than zero")]
    NoThreads,
    #[error("chunk size must be greater than zero")]
    ZeroChunk,
    #[error("unknown schedule kind {0:?} (expected static, dynamic or guided)")]
    UnknownKind(String),
    #[error("invalid chunk size {0:?}")]
    InvalidChunk(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleKind {
    Static,
    Dynamic,
    Guided,
}

impl ScheduleKind {
    fn name(self) -> &'static str {
        match self {
            ScheduleKind::Static => "Static",
            ScheduleKind::Dynamic => "Dynamic",
            ScheduleKind::Guided => "Guided",
        }
    }
}

/// A scheduling policy plus optional chunk size, e.g. `dynamic, 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Schedule {
    kind: ScheduleKind,
    chunk: Option<usize>,
}

impl Schedule {
    pub fn new(kind: ScheduleKind, chunk: Option<usize>) -> Result<Self, ScheduleError> {
        if chunk == Some(0) {
            return Err(ScheduleError::ZeroChunk);
        }
        Ok(Self { kind, chunk })
    }

    /// One contiguous block per thread.
    pub fn static_blocks() -> Self {
        Self {
            kind: ScheduleKind::Static,
            chunk: None,
        }
    }

    /// Fixed-size chunks dealt round-robin. A zero chunk is treated as one.
    pub fn static_chunks(chunk: usize) -> Self {
        Self {
            kind: ScheduleKind::Static,
            chunk: Some(chunk.max(1)),
        }
    }

    pub fn dynamic(chunk: Option<usize>) -> Self {
        Self {
            kind: ScheduleKind::Dynamic,
            chunk: chunk.map(|c| c.max(1)),
        }
    }

    pub fn guided(chunk: Option<usize>) -> Self {
        Self {
            kind: ScheduleKind::Guided,
            chunk: chunk.map(|c| c.max(1)),
        }
    }

    pub fn kind(&self) -> ScheduleKind {
        self.kind
    }

    pub fn chunk(&self) -> Option<usize> {
        self.chunk
    }

    /// Column label used in timing tables: `Static`, `Static, 2`, ...
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chunk {
            Some(chunk) => write!(f, "{}, {}", self.kind.name(), chunk),
            None => f.write_str(self.kind.name()),
        }
    }
}

impl FromStr for Schedule {
    type Err = ScheduleError;

    /// Accepts `static`, `dynamic,2`, `guided:4` and `Static, 2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, chunk) = match s.split_once([',', ':']) {
            Some((kind, chunk)) => (kind.trim(), Some(chunk.trim())),
            None => (s.trim(), None),
        };

        let kind = match kind.to_ascii_lowercase().as_str() {
            "static" => ScheduleKind::Static,
            "dynamic" => ScheduleKind::Dynamic,
            "guided" => ScheduleKind::Guided,
            _ => return Err(ScheduleError::UnknownKind(kind.to_string())),
        };

        let chunk = chunk
            .map(|raw| {
                raw.parse::<usize>()
                    .map_err(|_| ScheduleError::InvalidChunk(raw.to_string()))
            })
            .transpose()?;

        Schedule::new(kind, chunk)
    }
}

impl From<Schedule> for String {
    fn from(schedule: Schedule) -> Self {
        schedule.to_string()
    }
}

impl TryFrom<String> for Schedule {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Hands out iteration ranges to workers according to a schedule.
pub(crate) struct Dispatcher {
    len: usize,
    threads: ThreadCount,
    schedule: Schedule,
    cursor: AtomicUsize,
}

impl Dispatcher {
    pub(crate) fn new(len: usize, threads: ThreadCount, schedule: Schedule) -> Self {
        Self {
            len,
            threads,
            schedule,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Next range for `worker`; `step` counts how many ranges it has claimed.
    pub(crate) fn claim(&self, worker: usize, step: usize) -> Option<Range<usize>> {
        let range = match (self.schedule.kind, self.schedule.chunk) {
            (ScheduleKind::Static, None) => {
                if step > 0 {
                    return None;
                }
                let base = self.len / self.threads;
                let extra = self.len % self.threads;
                let start = worker * base + worker.min(extra);
                let size = base + usize::from(worker < extra);
                start..start + size
            }
            (ScheduleKind::Static, Some(chunk)) => {
                let start = (step * self.threads + worker).checked_mul(chunk)?;
                start..(start + chunk).min(self.len)
            }
            (ScheduleKind::Dynamic, chunk) => {
                let chunk = chunk.unwrap_or(1);
                let start = self.cursor.fetch_add(chunk, Ordering::Relaxed);
                start..start.saturating_add(chunk).min(self.len)
            }
            (ScheduleKind::Guided, chunk) => {
                let min_chunk = chunk.unwrap_or(1);
                let mut start = self.cursor.load(Ordering::Relaxed);
                loop {
                    let remaining = self.len.saturating_sub(start);
                    if remaining == 0 {
                        return None;
                    }
                    let size = remaining
                        .div_ceil(self.threads)
                        .max(min_chunk)
                        .min(remaining);
                    match self.cursor.compare_exchange_weak(
                        start,
                        start + size,
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    ) {
                        Ok(_) => break start..start + size,
                        Err(current) => start = current,
                    }
                }
            }
        };

        (range.start < range.end).then_some(range)
    }
}

/// Evaluates `f` for every index in `0..len` on `threads` workers.
///
/// Each index is evaluated exactly once and results come back in index order
/// regardless of which worker produced them.
pub fn parallel_map<T, F>(
    len: usize,
    threads: ThreadCount,
    schedule: Schedule,
    f: F,
) -> Result<Vec<T>, ScheduleError>
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    if threads == 0 {
        return Err(ScheduleError::NoThreads);
    }
    if len == 0 {
        return Ok(Vec::new());
    }

    let dispatcher = Dispatcher::new(len, threads, schedule);
    let mut chunks: Vec<(usize, Vec<T>)> = thread::scope(|scope| {
        let handles = (0..threads)
            .map(|worker| {
                let dispatcher = &dispatcher;
                let f = &f;
                scope.spawn(move || {
                    let mut produced = Vec::new();
                    let mut step = 0;
                    while let Some(range) = dispatcher.claim(worker, step) {
                        produced.push((range.start, range.map(f).collect::<Vec<_>>()));
                        step += 1;
                    }
                    trace!(worker, chunks = step, "worker finished");
                    produced
                })
            })
            .collect::<Vec<_>>();

        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(produced) => produced,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    chunks.sort_by_key(|(start, _)| *start);
    Ok(chunks.into_iter().flat_map(|(_, values)| values).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(dispatcher: &Dispatcher, worker: usize) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        while let Some(range) = dispatcher.claim(worker, ranges.len()) {
            ranges.push(range);
        }
        ranges
    }

    #[test]
    fn parses_labels_and_shorthand() {
        assert_eq!("static".parse::<Schedule>().unwrap(), Schedule::static_blocks());
        assert_eq!("Static, 2".parse::<Schedule>().unwrap(), Schedule::static_chunks(2));
        assert_eq!("dynamic:2".parse::<Schedule>().unwrap(), Schedule::dynamic(Some(2)));
        assert_eq!("GUIDED".parse::<Schedule>().unwrap(), Schedule::guided(None));
        assert_eq!(
            "auto".parse::<Schedule>().unwrap_err(),
            ScheduleError::UnknownKind("auto".into())
        );
        assert_eq!(
            "dynamic,x".parse::<Schedule>().unwrap_err(),
            ScheduleError::InvalidChunk("x".into())
        );
        assert_eq!("guided,0".parse::<Schedule>().unwrap_err(), ScheduleError::ZeroChunk);
    }

    #[test]
    fn label_round_trips_through_serde() {
        let json = serde_json::to_string(&Schedule::dynamic(Some(2))).unwrap();
        assert_eq!(json, "\"Dynamic, 2\"");
        let back: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Schedule::dynamic(Some(2)));
    }

    #[test]
    fn static_blocks_split_evenly() {
        let dispatcher = Dispatcher::new(10, 4, Schedule::static_blocks());
        let ranges: Vec<_> = (0..4).map(|w| drain(&dispatcher, w)).collect();
        assert_eq!(ranges, vec![vec![0..3], vec![3..6], vec![6..8], vec![8..10]]);
    }

    #[test]
    fn static_blocks_leave_surplus_workers_idle() {
        let dispatcher = Dispatcher::new(2, 4, Schedule::static_blocks());
        assert_eq!(drain(&dispatcher, 1), vec![1..2]);
        assert!(drain(&dispatcher, 3).is_empty());
    }

    #[test]
    fn static_chunks_are_round_robin() {
        let dispatcher = Dispatcher::new(9, 2, Schedule::static_chunks(2));
        assert_eq!(drain(&dispatcher, 0), vec![0..2, 4..6, 8..9]);
        assert_eq!(drain(&dispatcher, 1), vec![2..4, 6..8]);
    }

    #[test]
    fn guided_chunks_shrink_towards_minimum() {
        let dispatcher = Dispatcher::new(100, 4, Schedule::guided(Some(5)));
        let sizes: Vec<usize> = drain(&dispatcher, 0).iter().map(|r| r.len()).collect();
        assert_eq!(sizes.iter().sum::<usize>(), 100);
        assert_eq!(sizes[0], 25);
        assert!(sizes.windows(2).all(|pair| pair[0] >= pair[1]));
        assert!(sizes[..sizes.len() - 1].iter().all(|size| *size >= 5));
    }

    #[test]
    fn dynamic_claims_share_one_cursor() {
        let dispatcher = Dispatcher::new(5, 2, Schedule::dynamic(Some(2)));
        assert_eq!(dispatcher.claim(0, 0), Some(0..2));
        assert_eq!(dispatcher.claim(1, 0), Some(2..4));
        assert_eq!(dispatcher.claim(0, 1), Some(4..5));
        assert_eq!(dispatcher.claim(1, 1), None);
    }

    #[test]
    fn every_schedule_visits_each_index_once() {
        let schedules = [
            Schedule::static_blocks(),
            Schedule::static_chunks(3),
            Schedule::dynamic(None),
            Schedule::dynamic(Some(4)),
            Schedule::guided(None),
            Schedule::guided(Some(2)),
        ];
        for schedule in schedules {
            for threads in [1, 2, 3, 8] {
                let values = parallel_map(37, threads, schedule, |i| i * i).unwrap();
                let expected: Vec<usize> = (0..37).map(|i| i * i).collect();
                assert_eq!(values, expected, "{schedule} with {threads} threads");
            }
        }
    }

    #[test]
    fn zero_threads_is_rejected() {
        let err = parallel_map(4, 0, Schedule::static_blocks(), |i| i).unwrap_err();
        assert_eq!(err, ScheduleError::NoThreads);
    }
}
