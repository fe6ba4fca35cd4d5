use std::sync::atomic::{AtomicUsize, Ordering};

use schedplot::jacobi::{self, JacobiParams, JacobiSystem};
use schedplot::{BenchConfig, Schedule, parallel_map};

#[test]
fn each_index_runs_exactly_once_under_every_default_policy() {
    for policy in BenchConfig::default().policies {
        let calls = AtomicUsize::new(0);
        let values = parallel_map(101, 4, policy, |i| {
            calls.fetch_add(1, Ordering::Relaxed);
            i as u64 * 3
        })
        .unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 101, "{policy}");
        assert!(values.iter().enumerate().all(|(i, v)| *v == i as u64 * 3));
    }
}

#[test]
fn more_threads_than_iterations_is_fine() {
    let values = parallel_map(3, 8, Schedule::static_chunks(2), |i| i).unwrap();
    assert_eq!(values, vec![0, 1, 2]);
}

#[test]
fn jacobi_result_is_independent_of_schedule() {
    let system = JacobiSystem::diagonally_dominant(40);
    let params = JacobiParams::default();
    let baseline = jacobi::solve(&system, params, 1, Schedule::static_blocks()).unwrap();

    for policy in BenchConfig::default().policies {
        for threads in [2, 3, 6] {
            let outcome = jacobi::solve(&system, params, threads, policy).unwrap();
            assert_eq!(outcome.iterations, baseline.iterations, "{policy} T={threads}");
            assert_eq!(outcome.solution, baseline.solution, "{policy} T={threads}");
        }
    }
}
