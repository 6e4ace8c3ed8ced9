use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::pitch_mix::PitchMixRow;
use crate::state::{BasicStats, PlayerIdentity, format_stat};

pub struct ExportSummary {
    pub stat_rows: usize,
    pub mix_rows: usize,
}

/// Write the scouting report (basic stats + pitch mix) as an xlsx workbook.
pub fn export_report(
    path: &Path,
    identity: &PlayerIdentity,
    season: u16,
    stats: &BasicStats,
    mix: &[PitchMixRow],
) -> Result<ExportSummary> {
    let mut stat_rows = vec![vec!["Metric".to_string(), "Value".to_string()]];
    for (label, value) in stats.grid_cells() {
        stat_rows.push(vec![
            label.to_string(),
            value.unwrap_or_else(|| "—".to_string()),
        ]);
    }

    let mut mix_rows = vec![vec![
        "Pitch".to_string(),
        "Count".to_string(),
        "Usage %".to_string(),
    ]];
    for row in mix {
        mix_rows.push(vec![
            row.label.clone(),
            row.count.to_string(),
            format_stat(row.usage_pct),
        ]);
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Basic Stats")?;
        sheet.write_string(0, 0, format!("{} ({season})", identity.name))?;
        write_rows_from(sheet, 2, &stat_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Pitch Mix")?;
        write_rows_from(sheet, 0, &mix_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportSummary {
        stat_rows: stat_rows.len().saturating_sub(1),
        mix_rows: mix_rows.len().saturating_sub(1),
    })
}

fn write_rows_from(worksheet: &mut Worksheet, start: u32, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(start + row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
