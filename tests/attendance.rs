#[cfg(test)]
mod tests {
    use attend::commands::App;
    use attend::db::attendance::{total_minutes, EventKind};
    use attend::db::db::Db;
    use attend::db::employees::EmployeeDetails;
    use attend::db::error::DbError;
    use attend::libs::snowflake::Snowflake;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::sync::Arc;
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};

    struct AttendanceContext {
        _temp_dir: TempDir,
        app: App,
    }

    impl AsyncTestContext for AttendanceContext {
        async fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join("attend.db")).unwrap();
            let ids = Arc::new(Snowflake::new(3, 1).unwrap());
            AttendanceContext {
                _temp_dir: temp_dir,
                app: App::new(db, ids, 20),
            }
        }

        async fn teardown(self) {
            self.app.db.close().unwrap();
        }
    }

    impl AttendanceContext {
        async fn employee(&self, name: &str) -> i64 {
            self.app
                .employees()
                .create(EmployeeDetails {
                    name: name.to_string(),
                    ..Default::default()
                })
                .await
                .unwrap()
        }

        async fn shift(&self, employee_id: i64, day: &str, from: &str, to: &str) {
            let attendance = self.app.attendance();
            attendance
                .attend_at(employee_id, EventKind::CheckIn, at(day, from))
                .await
                .unwrap();
            attendance
                .attend_at(employee_id, EventKind::CheckOut, at(day, to))
                .await
                .unwrap();
        }
    }

    fn at(day: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", day, time), "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test_context(AttendanceContext)]
    #[tokio::test]
    async fn test_attend_requires_existing_employee(ctx: &mut AttendanceContext) {
        let err = ctx.app.attendance().attend(404, EventKind::CheckIn).await.unwrap_err();
        assert!(err.downcast_ref::<DbError>().is_some_and(DbError::is_not_found));
        assert_eq!(ctx.app.db.count("attendance", None).await.unwrap(), 0);
    }

    #[test_context(AttendanceContext)]
    #[tokio::test]
    async fn test_attend_records_event_with_timestamp(ctx: &mut AttendanceContext) {
        let alice = ctx.employee("Alice").await;
        let attendance = ctx.app.attendance();

        let first = attendance.attend(alice, EventKind::CheckIn).await.unwrap();
        let second = attendance.attend(alice, EventKind::CheckOut).await.unwrap();
        assert!(second > first);

        let events = attendance.events(alice).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, first);
        assert_eq!(events[0].kind, EventKind::CheckIn);
        assert_eq!(events[1].kind, EventKind::CheckOut);
        assert!(events[0].created_at.as_deref().is_some_and(|ts| ts.len() == 19));
    }

    #[test_context(AttendanceContext)]
    #[tokio::test]
    async fn test_employee_report(ctx: &mut AttendanceContext) {
        let alice = ctx.employee("Alice").await;
        ctx.shift(alice, "2024-03-01", "09:00:00", "17:00:00").await;
        ctx.shift(alice, "2024-03-04", "08:30:00", "12:00:00").await;
        // only a check-in: not a reportable day
        ctx.app
            .attendance()
            .attend_at(alice, EventKind::CheckIn, at("2024-03-05", "09:00:00"))
            .await
            .unwrap();
        // other month
        ctx.shift(alice, "2024-04-01", "09:00:00", "10:00:00").await;

        let days = ctx.app.attendance().employee_report(alice, 2024, 3).await.unwrap();

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].attendance_date, "2024-03-01");
        assert_eq!(days[0].check_in_time, "2024-03-01 09:00:00");
        assert_eq!(days[0].check_out_time, "2024-03-01 17:00:00");
        assert!((days[0].minutes_worked - 480.0).abs() < 0.01);
        assert!((days[1].minutes_worked - 210.0).abs() < 0.01);
        assert!((total_minutes(&days) - 690.0).abs() < 0.02);
    }

    #[test_context(AttendanceContext)]
    #[tokio::test]
    async fn test_employee_report_uses_first_in_and_last_out(ctx: &mut AttendanceContext) {
        let alice = ctx.employee("Alice").await;
        ctx.shift(alice, "2024-03-01", "09:00:00", "12:00:00").await;
        ctx.shift(alice, "2024-03-01", "13:00:00", "17:30:00").await;

        let days = ctx.app.attendance().employee_report(alice, 2024, 3).await.unwrap();

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].check_in_time, "2024-03-01 09:00:00");
        assert_eq!(days[0].check_out_time, "2024-03-01 17:30:00");
        assert!((days[0].minutes_worked - 510.0).abs() < 0.01);
    }

    #[test_context(AttendanceContext)]
    #[tokio::test]
    async fn test_monthly_summary(ctx: &mut AttendanceContext) {
        let alice = ctx.employee("Alice").await;
        let bob = ctx.employee("Bob").await;
        ctx.employee("Carol").await;
        for day in ["2024-02-01", "2024-02-02", "2024-02-05"] {
            ctx.shift(alice, day, "09:00:00", "17:00:00").await;
        }
        ctx.shift(bob, "2024-02-01", "10:00:00", "18:00:00").await;
        ctx.shift(bob, "2024-03-01", "10:00:00", "18:00:00").await;

        let rows = ctx.app.attendance().monthly_summary(2024, 2).await.unwrap();

        let summary: Vec<(&str, i64, i64)> = rows
            .iter()
            .map(|row| (row.employee_name.as_str(), row.days_present, row.days_absent))
            .collect();
        assert_eq!(summary, vec![("Alice", 3, 26), ("Bob", 1, 28), ("Carol", 0, 29)]);
    }

    #[test_context(AttendanceContext)]
    #[tokio::test]
    async fn test_purge_before(ctx: &mut AttendanceContext) {
        let alice = ctx.employee("Alice").await;
        ctx.shift(alice, "2024-01-15", "09:00:00", "17:00:00").await;
        ctx.shift(alice, "2024-02-15", "09:00:00", "17:00:00").await;
        let attendance = ctx.app.attendance();

        let removed = attendance
            .purge_before(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(attendance.events(alice).await.unwrap().len(), 2);

        let removed = attendance
            .purge_before(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
            .await
            .unwrap();
        assert_eq!(removed, 0);
    }
}
