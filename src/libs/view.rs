use crate::db::attendance::{AttendanceEvent, DayReport, MonthlySummary};
use crate::db::employees::Employee;
use crate::db::users::User;
use crate::libs::formatter::format_minutes;
use anyhow::Result;
use prettytable::{row, Table};

pub struct View {}

impl View {
    pub fn users(users: &[User]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "USERNAME"]);
        for user in users {
            table.add_row(row![user.id, user.username]);
        }
        table.printstd();

        Ok(())
    }

    pub fn employees(employees: &[Employee]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "NAME", "PHONE", "EMAIL", "ADDRESS"]);
        for employee in employees {
            table.add_row(row![
                employee.id,
                employee.name,
                employee.phone.as_deref().unwrap_or("-"),
                employee.email.as_deref().unwrap_or("-"),
                employee.address.as_deref().unwrap_or("-")
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn events(events: &[AttendanceEvent]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "TYPE", "TIME"]);
        for event in events {
            table.add_row(row![event.id, event.kind, event.created_at.as_deref().unwrap_or("-")]);
        }
        table.printstd();

        Ok(())
    }

    pub fn report(days: &[DayReport]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["DATE", "CHECK IN", "CHECK OUT", "WORKED"]);
        for day in days {
            table.add_row(row![
                day.attendance_date,
                day.check_in_time,
                day.check_out_time,
                format_minutes(day.minutes_worked)
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn summary(rows: &[MonthlySummary]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "EMPLOYEE", "PRESENT", "ABSENT"]);
        for row in rows {
            table.add_row(row![row.employee_id, row.employee_name, row.days_present, row.days_absent]);
        }
        table.printstd();

        Ok(())
    }
}
