use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use schedplot::report::{render_summary, write_speedup_csv};
use schedplot::{ChartConfig, TimingTable, render_all};

/// Plot execution time and speedup per scheduling policy.
#[derive(Parser, Debug)]
#[command(name = "schedplot")]
struct Args {
    /// Timing table JSON (as written by schedplot-benchmark). Uses the
    /// embedded Jacobi measurements when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Chart configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the chart files; overrides the config value.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Also write the speedup table as CSV next to the charts.
    #[arg(long, default_value_t = false)]
    csv: bool,

    /// Skip the summary table on stdout.
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_tracing();

    let mut config = match &args.config {
        Some(path) => ChartConfig::from_json_file(path)
            .with_context(|| format!("load chart config {}", path.display()))?,
        None => ChartConfig::default(),
    };
    if let Some(dir) = args.out_dir {
        config = config.with_output_dir(dir);
    }

    let table = match &args.input {
        Some(path) => TimingTable::from_json_file(path)
            .with_context(|| format!("load timing table {}", path.display()))?,
        None => TimingTable::reference(),
    };
    info!(
        rows = table.row_count(),
        policies = table.series().len(),
        "timing table ready"
    );

    let speedup = table.speedup().context("compute speedup")?;
    let charts = render_all(&table, &speedup, &config).context("render charts")?;

    if !args.quiet {
        render_summary(&mut io::stdout().lock(), &table, &speedup)?;
        println!();
    }
    println!("wrote {}", charts.time.display());
    println!("wrote {}", charts.speedup.display());

    if args.csv {
        let path = write_speedup_csv(&config.output_dir, "speedup", &table, &speedup)
            .context("write speedup csv")?;
        println!("wrote {}", path.display());
    }

    Ok(())
}

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
