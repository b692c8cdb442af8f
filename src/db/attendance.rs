//! Check-in / check-out events and the monthly reports built from them.
//!
//! Events are plain rows keyed by a Snowflake id. Reports are parameterized
//! SQL run through [`Db::get_all_rows`]: the engine treats them as opaque
//! statements and only binds their values.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use attend::db::attendance::{Attendance, EventKind};
//! # async fn run(attendance: Attendance) -> anyhow::Result<()> {
//! attendance.attend(42, EventKind::CheckIn).await?;
//! let days = attendance.employee_report(42, 2024, 3).await?;
//! # Ok(())
//! # }
//! ```

use super::db::Db;
use super::employees::Employees;
use super::query::{Combinator, Criteria, Filter, Select};
use super::repo::{decode_all, next_id};
use super::value::to_record;
use crate::libs::snowflake::Snowflake;
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::sync::Arc;

pub const ATTENDANCE_TABLE: &str = "attendance";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Per-day first check-in and last check-out of one employee in one month.
const SELECT_EMPLOYEE_REPORT: &str = "
WITH check_in AS (
    SELECT employee_id, DATE(created_at) AS attendance_date, MIN(created_at) AS check_in_time
    FROM attendance
    WHERE type = 1 AND employee_id = ?1
        AND strftime('%Y', created_at) = ?2 AND strftime('%m', created_at) = ?3
    GROUP BY employee_id, DATE(created_at)
),
check_out AS (
    SELECT employee_id, DATE(created_at) AS attendance_date, MAX(created_at) AS check_out_time
    FROM attendance
    WHERE type = 0 AND employee_id = ?1
        AND strftime('%Y', created_at) = ?2 AND strftime('%m', created_at) = ?3
    GROUP BY employee_id, DATE(created_at)
)
SELECT
    check_in.employee_id,
    check_in.attendance_date,
    check_in.check_in_time,
    check_out.check_out_time,
    ROUND((julianday(check_out.check_out_time) - julianday(check_in.check_in_time)) * 24 * 60, 2) AS minutes_worked
FROM check_in
JOIN check_out
    ON check_in.employee_id = check_out.employee_id
    AND check_in.attendance_date = check_out.attendance_date
ORDER BY check_in.attendance_date ASC";

/// Days present (a check-in and a check-out on the same date) per employee.
const SELECT_MONTHLY_SUMMARY: &str = "
WITH present AS (
    SELECT DISTINCT i.employee_id, DATE(i.created_at) AS attendance_date
    FROM attendance i
    JOIN attendance o
        ON o.employee_id = i.employee_id
        AND DATE(o.created_at) = DATE(i.created_at)
        AND o.type = 0
    WHERE i.type = 1
        AND strftime('%Y', i.created_at) = ?1 AND strftime('%m', i.created_at) = ?2
)
SELECT
    e.id AS employee_id,
    e.name AS employee_name,
    COUNT(p.attendance_date) AS days_present,
    ?3 - COUNT(p.attendance_date) AS days_absent
FROM employees e
LEFT JOIN present p ON p.employee_id = e.id
GROUP BY e.id
ORDER BY e.name";

/// Direction of an attendance event, stored as `1` (in) or `0` (out).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum EventKind {
    CheckIn,
    CheckOut,
}

impl From<EventKind> for i64 {
    fn from(kind: EventKind) -> i64 {
        match kind {
            EventKind::CheckIn => 1,
            EventKind::CheckOut => 0,
        }
    }
}

impl TryFrom<i64> for EventKind {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(EventKind::CheckIn),
            0 => Ok(EventKind::CheckOut),
            other => Err(format!("unknown attendance type {}", other)),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::CheckIn => write!(f, "check in"),
            EventKind::CheckOut => write!(f, "check out"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    pub id: i64,
    pub employee_id: i64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayReport {
    pub employee_id: i64,
    pub attendance_date: String,
    pub check_in_time: String,
    pub check_out_time: String,
    pub minutes_worked: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub employee_id: i64,
    pub employee_name: String,
    pub days_present: i64,
    pub days_absent: i64,
}

pub struct Attendance {
    db: Db,
    ids: Arc<Snowflake>,
}

impl Attendance {
    pub fn new(db: Db, ids: Arc<Snowflake>) -> Self {
        Self { db, ids }
    }

    /// Records an event stamped with the database's local time.
    pub async fn attend(&self, employee_id: i64, kind: EventKind) -> Result<i64> {
        self.record(employee_id, kind, None).await
    }

    /// Records an event at an explicit local time.
    pub async fn attend_at(&self, employee_id: i64, kind: EventKind, at: NaiveDateTime) -> Result<i64> {
        self.record(employee_id, kind, Some(at.format(TIMESTAMP_FORMAT).to_string())).await
    }

    async fn record(&self, employee_id: i64, kind: EventKind, created_at: Option<String>) -> Result<i64> {
        // Fails with EmployeeNotFound before minting an id.
        Employees::new(self.db.clone(), self.ids.clone(), 1).get_by_id(employee_id).await?;

        let event = AttendanceEvent {
            id: next_id(&self.ids)?,
            employee_id,
            kind,
            created_at,
        };
        self.db.create(to_record(&event)?, ATTENDANCE_TABLE).await?;
        tracing::info!(id = event.id, employee_id, %kind, "attendance recorded");
        Ok(event.id)
    }

    /// All events of one employee, oldest first.
    pub async fn events(&self, employee_id: i64) -> Result<Vec<AttendanceEvent>> {
        let rows = self
            .db
            .search(
                Criteria::new().eq("employee_id", employee_id),
                Select::from(ATTENDANCE_TABLE).order_by("created_at, id"),
                Combinator::And,
            )
            .await?;
        decode_all(rows)
    }

    /// Removes events recorded before `date`; returns how many were removed.
    pub async fn purge_before(&self, date: NaiveDate) -> Result<usize> {
        let filter = Filter::new("DATE(created_at) < ?", vec![json!(date.format("%Y-%m-%d").to_string())]);
        Ok(self.db.delete_complex(ATTENDANCE_TABLE, filter).await?)
    }

    pub async fn employee_report(&self, employee_id: i64, year: i32, month: u32) -> Result<Vec<DayReport>> {
        let rows = self
            .db
            .get_all_rows(
                SELECT_EMPLOYEE_REPORT,
                vec![json!(employee_id), json!(format!("{:04}", year)), json!(format!("{:02}", month))],
            )
            .await?;
        decode_all(rows)
    }

    /// Present and absent day counts for every employee.
    pub async fn monthly_summary(&self, year: i32, month: u32) -> Result<Vec<MonthlySummary>> {
        let rows = self
            .db
            .get_all_rows(
                SELECT_MONTHLY_SUMMARY,
                vec![
                    json!(format!("{:04}", year)),
                    json!(format!("{:02}", month)),
                    json!(days_in_month(year, month)),
                ],
            )
            .await?;
        decode_all(rows)
    }
}

pub fn total_minutes(days: &[DayReport]) -> f64 {
    days.iter().map(|day| day.minutes_worked).sum()
}

/// Calendar days in `month` of `year`; 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.map_or(31, |next| next.signed_duration_since(first).num_days() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 13), 0);
    }

    #[test]
    fn test_event_kind_is_stored_as_integer() {
        assert_eq!(serde_json::to_value(EventKind::CheckIn).unwrap(), json!(1));
        assert_eq!(serde_json::from_value::<EventKind>(json!(0)).unwrap(), EventKind::CheckOut);
        assert!(serde_json::from_value::<EventKind>(json!(2)).is_err());
    }
}
