#[path = "common.rs"]
mod common;

use std::fs;

use common::{ChartDir, POLICIES, reference};
use schedplot::chart::{render_speedup_chart, render_time_chart};
use schedplot::{ChartConfig, ChartError, PolicySeries, TimingTable, render_all};

/// Text of every `<text>` element that is a bare integer. Axis values on the
/// y side carry a decimal point, so these are the x tick labels.
fn integer_labels(svg: &str) -> Vec<String> {
    svg.split("<text")
        .skip(1)
        .filter_map(|chunk| {
            let body = &chunk[chunk.find('>')? + 1..];
            let text = body[..body.find("</text>")?].trim();
            text.parse::<u64>().ok().map(|_| text.to_string())
        })
        .collect()
}

#[test]
fn render_all_writes_both_svgs() {
    let out = ChartDir::new();
    let table = reference();
    let charts = render_all(&table, &table.speedup().unwrap(), out.config()).unwrap();

    assert_eq!(charts.time, out.path().join("execution_time.svg"));
    assert_eq!(charts.speedup, out.path().join("speedup.svg"));
    for path in [&charts.time, &charts.speedup] {
        let svg = fs::read_to_string(path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Scheduling policy"));
    }
}

#[test]
fn time_chart_labels_every_policy() {
    let out = ChartDir::new();
    fs::create_dir_all(out.path()).unwrap();
    let path = out.path().join("time.svg");
    render_time_chart(&reference(), out.config(), &path).unwrap();

    let svg = fs::read_to_string(path).unwrap();
    assert!(svg.contains("Execution time (s)"));
    assert!(svg.contains("Threads"));
    for policy in POLICIES {
        assert!(svg.contains(policy), "missing legend entry {policy}");
    }
    assert!(!svg.contains("Ideal speedup"));
}

#[test]
fn speedup_chart_includes_ideal_line() {
    let out = ChartDir::new();
    fs::create_dir_all(out.path()).unwrap();
    let path = out.path().join("speedup.svg");
    let speedup = reference().speedup().unwrap();
    render_speedup_chart(&speedup, out.config(), &path).unwrap();

    let svg = fs::read_to_string(path).unwrap();
    assert!(svg.contains("Ideal speedup"));
    assert!(svg.contains("Speedup vs. thread count"));
}

#[test]
fn custom_labels_and_file_names_are_used() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ChartConfig::default().with_output_dir(dir.path());
    config.speedup_file = "scaling.svg".into();
    config.labels.ideal = "Linear".into();
    config.labels.legend_title = "Policy".into();

    let table = reference();
    let charts = render_all(&table, &table.speedup().unwrap(), &config).unwrap();
    assert!(charts.speedup.ends_with("scaling.svg"));

    let svg = fs::read_to_string(&charts.speedup).unwrap();
    assert!(svg.contains("Linear"));
    assert!(svg.contains("Policy"));
}

#[test]
fn x_ticks_sit_on_measured_thread_counts() {
    let out = ChartDir::new();
    let table = reference();
    let charts = render_all(&table, &table.speedup().unwrap(), out.config()).unwrap();

    for path in [&charts.time, &charts.speedup] {
        let svg = fs::read_to_string(path).unwrap();
        assert_eq!(integer_labels(&svg), ["1", "2", "4", "6", "8"]);
    }
}

#[test]
fn sparse_thread_counts_get_only_their_own_ticks() {
    let out = ChartDir::new();
    let table = TimingTable::new(
        vec![1, 16],
        vec![PolicySeries::new("Dynamic", vec![32.0, 2.5])],
    )
    .unwrap();
    let charts = render_all(&table, &table.speedup().unwrap(), out.config()).unwrap();

    let svg = fs::read_to_string(&charts.time).unwrap();
    assert_eq!(integer_labels(&svg), ["1", "16"]);
}

#[test]
fn speedup_from_another_table_is_rejected() {
    let out = ChartDir::new();
    let other = TimingTable::new(
        vec![1, 2],
        vec![PolicySeries::new("Static", vec![2.0, 1.0])],
    )
    .unwrap();
    let err = render_all(&reference(), &other.speedup().unwrap(), out.config()).unwrap_err();
    assert!(matches!(err, ChartError::Mismatch));
    assert!(!out.path().join("execution_time.svg").exists());
}
