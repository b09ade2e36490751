//! CSV export for recorded episode traces.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::market::min_max;
use crate::sim::trace::TraceRow;

/// Column header for trace export. Fleet columns are aggregated.
const HEADER: &str = "episode,time_step,absolute_time,reward,sale_price,total_load,\
                       tcl_level_min,tcl_level_mean,tcl_level_max,tcl_consumption,\
                       dispatch_command,battery_fraction,generation,energy_sold,\
                       energy_bought,grid_price";

/// Exports recorded episodes to a CSV file at the given path.
///
/// Each episode is a slice of trace rows; its index becomes the `episode`
/// column. Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(episodes: &[Vec<TraceRow>], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(episodes, buf)
}

/// Writes recorded episodes as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(episodes: &[Vec<TraceRow>], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for (episode, rows) in episodes.iter().enumerate() {
        for r in rows {
            let (lo, hi) = level_range(&r.tcl_levels);
            wtr.write_record(&[
                episode.to_string(),
                r.time_step.to_string(),
                r.absolute_time.to_string(),
                format!("{:.6}", r.reward),
                format!("{:.2}", r.sale_price),
                format!("{:.4}", r.total_load()),
                format!("{lo:.4}"),
                format!("{:.4}", r.mean_tcl_level()),
                format!("{hi:.4}"),
                format!("{:.4}", r.tcl_consumption),
                format!("{:.4}", r.dispatch_command),
                format!("{:.6}", r.battery_fraction),
                format!("{:.4}", r.generation),
                format!("{:.4}", r.energy_sold),
                format!("{:.4}", r.energy_bought),
                format!("{:.4}", r.grid_price),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

fn level_range(levels: &[f64]) -> (f64, f64) {
    if levels.is_empty() { (0.0, 0.0) } else { min_max(levels) }
}
