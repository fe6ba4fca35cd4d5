use std::fs::{File, create_dir_all};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::table::{SpeedupTable, TimingTable};

/// Writes `<name>.csv` with one row per thread count: the raw time of every
/// policy followed by its speedup.
pub fn write_speedup_csv(
    dir: &Path,
    name: &str,
    table: &TimingTable,
    speedup: &SpeedupTable,
) -> io::Result<PathBuf> {
    create_dir_all(dir)?;
    let path = dir.join(format!("{name}.csv"));
    let mut file = File::create(&path)?;

    let mut header = vec!["threads".to_string()];
    header.extend(table.series().iter().map(|c| csv_field(&format!("{}_time", c.name))));
    header.extend(
        speedup
            .series()
            .iter()
            .map(|c| csv_field(&format!("{}_speedup", c.name))),
    );
    writeln!(file, "{}", header.join(","))?;

    for (row, threads) in table.threads().iter().enumerate() {
        let mut fields = vec![threads.to_string()];
        fields.extend(table.series().iter().map(|c| format!("{:.2}", c.times[row])));
        fields.extend(speedup.series().iter().map(|c| format!("{:.4}", c.times[row])));
        writeln!(file, "{}", fields.join(","))?;
    }

    info!(path = %path.display(), "wrote speedup csv");
    Ok(path)
}

/// Quotes a field when it contains a separator, as policy names like
/// `Static, 2` do.
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

/// Prints time and speedup side by side, one block per policy.
///
/// Column widths follow the longest cell, so every line has the length of
/// the `-` rule under the header.
pub fn render_summary<W: Write>(
    writer: &mut W,
    table: &TimingTable,
    speedup: &SpeedupTable,
) -> io::Result<()> {
    let headers: Vec<String> = table.threads().iter().map(|t| format!("T={t}")).collect();
    let rows: Vec<(&str, Vec<String>)> = table
        .series()
        .iter()
        .zip(speedup.series())
        .map(|(timing, ratio)| {
            let cells = timing
                .times
                .iter()
                .zip(&ratio.times)
                .map(|(time, s)| format!("{time:.2}s {s:.2}x"))
                .collect::<Vec<_>>();
            (timing.name.as_str(), cells)
        })
        .collect();

    let name_width = rows
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0)
        .max("Policy".len());
    let cell_width = rows
        .iter()
        .flat_map(|(_, cells)| cells.iter())
        .chain(&headers)
        .map(String::len)
        .max()
        .unwrap_or(0);

    write!(writer, "{:<name_width$}", "Policy")?;
    for header in &headers {
        write!(writer, " | {header:>cell_width$}")?;
    }
    writeln!(writer)?;

    let rule = name_width + headers.len() * (cell_width + 3);
    writeln!(writer, "{}", "-".repeat(rule))?;

    for (name, cells) in &rows {
        write!(writer, "{name:<name_width$}")?;
        for cell in cells {
            write!(writer, " | {cell:>cell_width$}")?;
        }
        writeln!(writer)?;
    }

    Ok(())
}
