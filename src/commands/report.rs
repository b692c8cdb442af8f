use super::App;
use crate::db::attendance::total_minutes;
use crate::libs::export::{ExportFormat, Exporter};
use crate::libs::formatter::format_minutes;
use crate::libs::messages::Message;
use crate::libs::view::View;
use crate::{msg_bail_anyhow, msg_info, msg_print, msg_success};
use anyhow::Result;
use chrono::{Datelike, Local};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Per-day report for one employee; all employees are summarized otherwise
    #[arg(short, long)]
    employee: Option<i64>,
    /// Year; defaults to the current one
    #[arg(short, long)]
    year: Option<i32>,
    /// Month (1-12); defaults to the current one
    #[arg(short, long)]
    month: Option<u32>,
    /// Also write the report to a file
    #[arg(long, value_enum)]
    export: Option<ExportFormat>,
    /// Output file for --export
    #[arg(short, long, requires = "export")]
    output: Option<PathBuf>,
}

pub async fn cmd(app: &App, args: ReportArgs) -> Result<()> {
    let today = Local::now().date_naive();
    let year = args.year.unwrap_or(today.year());
    let month = args.month.unwrap_or(today.month());
    if !(1..=12).contains(&month) {
        msg_bail_anyhow!(Message::InvalidMonth(month));
    }
    let label = format!("{:04}-{:02}", year, month);
    let attendance = app.attendance();

    match args.employee {
        Some(employee_id) => {
            let employee = app.employees().get_by_id(employee_id).await?;
            let days = attendance.employee_report(employee_id, year, month).await?;
            if days.is_empty() {
                msg_info!(Message::AttendanceNotFound(label));
                return Ok(());
            }

            msg_print!(Message::ReportHeader(employee.name, label), true);
            View::report(&days)?;
            msg_print!(Message::TotalWorked(format_minutes(total_minutes(&days))));

            if let Some(format) = args.export {
                let path = Exporter::new(format, args.output).export_report(&days)?;
                msg_success!(Message::ReportExported(path.display().to_string()));
            }
        }
        None => {
            let rows = attendance.monthly_summary(year, month).await?;
            if rows.is_empty() {
                msg_info!(Message::EmployeesNotFound);
                return Ok(());
            }

            msg_print!(Message::SummaryHeader(label), true);
            View::summary(&rows)?;

            if let Some(format) = args.export {
                let path = Exporter::new(format, args.output).export_summary(&rows)?;
                msg_success!(Message::ReportExported(path.display().to_string()));
            }
        }
    }
    Ok(())
}
