//! Check-in, check-out and raw event maintenance.

use super::App;
use crate::db::attendance::EventKind;
use crate::libs::messages::Message;
use crate::libs::view::View;
use crate::{msg_info, msg_success};
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use clap::Args;

#[derive(Debug, Args)]
pub struct AttendArgs {
    /// Employee ID
    employee_id: i64,
    /// Record the event at this local time (YYYY-MM-DD HH:MM:SS) instead of now
    #[arg(long, value_parser = parse_timestamp)]
    at: Option<NaiveDateTime>,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Employee ID
    employee_id: i64,
}

#[derive(Debug, Args)]
pub struct PurgeArgs {
    /// Events recorded before this date (YYYY-MM-DD) are removed
    #[arg(long)]
    before: NaiveDate,
}

pub async fn check_in(app: &App, args: AttendArgs) -> Result<()> {
    record(app, args, EventKind::CheckIn).await
}

pub async fn check_out(app: &App, args: AttendArgs) -> Result<()> {
    record(app, args, EventKind::CheckOut).await
}

async fn record(app: &App, args: AttendArgs, kind: EventKind) -> Result<()> {
    let attendance = app.attendance();
    match args.at {
        Some(at) => attendance.attend_at(args.employee_id, kind, at).await?,
        None => attendance.attend(args.employee_id, kind).await?,
    };

    let name = app.employees().get_by_id(args.employee_id).await?.name;
    match kind {
        EventKind::CheckIn => msg_success!(Message::CheckedIn(name)),
        EventKind::CheckOut => msg_success!(Message::CheckedOut(name)),
    }
    Ok(())
}

pub async fn history(app: &App, args: HistoryArgs) -> Result<()> {
    app.employees().get_by_id(args.employee_id).await?;
    View::events(&app.attendance().events(args.employee_id).await?)
}

pub async fn purge(app: &App, args: PurgeArgs) -> Result<()> {
    let removed = app.attendance().purge_before(args.before).await?;
    if removed == 0 {
        msg_info!(Message::AttendancePurged(0));
    } else {
        msg_success!(Message::AttendancePurged(removed));
    }
    Ok(())
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, crate::db::attendance::TIMESTAMP_FORMAT)
}
