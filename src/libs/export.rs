//! Export of attendance reports to CSV and JSON files.
//!
//! Without an explicit path the file is written to the working directory as
//! `attend_<kind>_<YYYYMMDD_HHMMSS>.<ext>`.

use crate::db::attendance::{total_minutes, DayReport, MonthlySummary};
use crate::libs::formatter::format_minutes;
use anyhow::Result;
use chrono::Local;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// JSON shape of an employee report.
#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    days: &'a [DayReport],
    total_minutes: f64,
    total: String,
}

pub struct Exporter {
    format: ExportFormat,
    output_path: Option<PathBuf>,
}

impl Exporter {
    pub fn new(format: ExportFormat, output_path: Option<PathBuf>) -> Self {
        Self { format, output_path }
    }

    fn path_for(&self, kind: &str) -> PathBuf {
        self.output_path.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "attend_{}_{}.{}",
                kind,
                Local::now().format("%Y%m%d_%H%M%S"),
                self.format.extension()
            ))
        })
    }

    /// Writes one employee's per-day report and returns the file path.
    pub fn export_report(&self, days: &[DayReport]) -> Result<PathBuf> {
        let path = self.path_for("report");
        let total = total_minutes(days);
        match self.format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_path(&path)?;
                for day in days {
                    wtr.serialize(day)?;
                }
                if days.is_empty() {
                    wtr.write_record(["employee_id", "attendance_date", "check_in_time", "check_out_time", "minutes_worked"])?;
                }
                wtr.write_record(["", "TOTAL", "", format_minutes(total).as_str(), total.to_string().as_str()])?;
                wtr.flush()?;
            }
            ExportFormat::Json => write_json(
                &path,
                &ReportDocument {
                    days,
                    total_minutes: total,
                    total: format_minutes(total),
                },
            )?,
        }
        tracing::debug!(path = %path.display(), rows = days.len(), "report exported");
        Ok(path)
    }

    /// Writes the monthly present/absent summary and returns the file path.
    pub fn export_summary(&self, rows: &[MonthlySummary]) -> Result<PathBuf> {
        let path = self.path_for("summary");
        match self.format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_path(&path)?;
                if rows.is_empty() {
                    wtr.write_record(["employee_id", "employee_name", "days_present", "days_absent"])?;
                }
                for row in rows {
                    wtr.serialize(row)?;
                }
                wtr.flush()?;
            }
            ExportFormat::Json => write_json(&path, &rows)?,
        }
        tracing::debug!(path = %path.display(), rows = rows.len(), "summary exported");
        Ok(path)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}
