use std::path::Path;

use schedplot::{ChartConfig, TimingTable};
use tempfile::TempDir;

pub const POLICIES: [&str; 5] = ["Static", "Static, 2", "Dynamic", "Dynamic, 2", "Guided"];

/// Output directory that lives as long as the test holds it.
#[allow(dead_code)]
pub struct ChartDir {
    config: ChartConfig,
    _guard: TempDir,
}

#[allow(dead_code)]
impl ChartDir {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir for charts");
        let config = ChartConfig::default().with_output_dir(dir.path().join("charts"));
        Self {
            config,
            _guard: dir,
        }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.config.output_dir
    }
}

#[allow(dead_code)]
pub fn reference() -> TimingTable {
    TimingTable::reference()
}

#[allow(dead_code)]
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}
