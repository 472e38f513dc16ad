//! Schedule export: CSV serialization and the terminal table.

use anyhow::{Context, Result};

use crate::types::ScheduleRow;

pub const HEADERS: [&str; 5] = ["Route", "Loc #", "Address", "Arrival Time", "Delivery Window"];

/// Default export filename for a route.
pub fn default_filename(route_name: &str) -> String {
    format!("{route_name}_schedule.csv")
}

/// Serialize schedule rows into CSV bytes.
pub fn schedule_to_csv(rows: &[ScheduleRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(HEADERS)
        .context("Failed to write CSV header")?;

    for row in rows {
        writer
            .write_record([
                row.route.as_str(),
                row.loc_id.as_str(),
                row.address.as_str(),
                &row.arrival_label(),
                &row.window_label(),
            ])
            .context("Failed to write CSV row")?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {e}"))
}

/// Render the schedule as an aligned plain-text table for the terminal.
pub fn render_table(rows: &[ScheduleRow]) -> String {
    let cells: Vec<[String; 5]> = rows
        .iter()
        .map(|row| {
            [
                row.route.clone(),
                row.loc_id.clone(),
                row.address.clone(),
                row.arrival_label(),
                row.window_label(),
            ]
        })
        .collect();

    let mut widths: [usize; 5] = std::array::from_fn(|i| HEADERS[i].chars().count());
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let format_line = |cols: [&str; 5]| -> String {
        cols.iter()
            .zip(widths.iter())
            .map(|(cell, w)| format!("{cell:<width$}", width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    out.push_str(&format_line(HEADERS));
    out.push('\n');
    for row in &cells {
        out.push_str(&format_line(std::array::from_fn(|i| row[i].as_str())));
        out.push('\n');
    }

    out
}
