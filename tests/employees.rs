#[cfg(test)]
mod tests {
    use attend::commands::App;
    use attend::db::attendance::EventKind;
    use attend::db::db::Db;
    use attend::db::employees::EmployeeDetails;
    use attend::db::error::DbError;
    use attend::libs::snowflake::Snowflake;
    use std::sync::Arc;
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};

    struct EmployeesContext {
        _temp_dir: TempDir,
        app: App,
    }

    impl AsyncTestContext for EmployeesContext {
        async fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join("attend.db")).unwrap();
            let ids = Arc::new(Snowflake::new(2, 1).unwrap());
            EmployeesContext {
                _temp_dir: temp_dir,
                app: App::new(db, ids, 20),
            }
        }

        async fn teardown(self) {
            self.app.db.close().unwrap();
        }
    }

    fn details(name: &str) -> EmployeeDetails {
        EmployeeDetails {
            name: name.to_string(),
            phone: Some("555-0100".to_string()),
            email: None,
            address: None,
        }
    }

    #[test_context(EmployeesContext)]
    #[tokio::test]
    async fn test_create_get_update(ctx: &mut EmployeesContext) {
        let employees = ctx.app.employees();
        let id = employees.create(details("Alice")).await.unwrap();

        let alice = employees.get_by_id(id).await.unwrap();
        assert_eq!(alice.name, "Alice");
        assert_eq!(alice.phone.as_deref(), Some("555-0100"));
        assert_eq!(alice.email, None);

        let mut changed = details("Alice Smith");
        changed.email = Some("alice@example.com".to_string());
        changed.phone = None;
        employees.update(id, changed).await.unwrap();

        let alice = employees.get_by_id(id).await.unwrap();
        assert_eq!(alice.name, "Alice Smith");
        assert_eq!(alice.phone, None);
        assert_eq!(alice.email.as_deref(), Some("alice@example.com"));
    }

    #[test_context(EmployeesContext)]
    #[tokio::test]
    async fn test_names_are_unique(ctx: &mut EmployeesContext) {
        let employees = ctx.app.employees();
        employees.create(details("Alice")).await.unwrap();
        let bob = employees.create(details("Bob")).await.unwrap();

        let err = employees.create(details("Alice")).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
        let err = employees.update(bob, details("Alice")).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test_context(EmployeesContext)]
    #[tokio::test]
    async fn test_missing_employee_is_not_found(ctx: &mut EmployeesContext) {
        let employees = ctx.app.employees();

        let err = employees.get_by_id(404).await.unwrap_err();
        assert!(err.downcast_ref::<DbError>().is_some_and(DbError::is_not_found));
        assert!(err.to_string().contains("404"));
        assert!(employees.delete(404).await.is_err());
        assert!(employees.update(404, details("Ghost")).await.is_err());
    }

    #[test_context(EmployeesContext)]
    #[tokio::test]
    async fn test_search_and_list(ctx: &mut EmployeesContext) {
        let employees = ctx.app.employees();
        for name in ["Alice", "Bob", "Natalie"] {
            employees.create(details(name)).await.unwrap();
        }

        let found: Vec<String> = employees
            .search("ali")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(found.len(), 2);
        assert!(found.contains(&"Alice".to_string()));
        assert!(found.contains(&"Natalie".to_string()));

        let page = employees.list(1).await.unwrap();
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.pages, 1);
    }

    #[test_context(EmployeesContext)]
    #[tokio::test]
    async fn test_delete_removes_attendance(ctx: &mut EmployeesContext) {
        let employees = ctx.app.employees();
        let attendance = ctx.app.attendance();
        let id = employees.create(details("Alice")).await.unwrap();
        attendance.attend(id, EventKind::CheckIn).await.unwrap();
        assert_eq!(attendance.events(id).await.unwrap().len(), 1);

        employees.delete(id).await.unwrap();

        assert!(attendance.events(id).await.unwrap().is_empty());
    }

    #[test_context(EmployeesContext)]
    #[tokio::test]
    async fn test_import(ctx: &mut EmployeesContext) {
        let employees = ctx.app.employees();
        employees.create(details("Existing")).await.unwrap();

        let count = employees
            .import(vec![details("Alice"), details("Bob"), details("Carol")])
            .await
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(employees.list(1).await.unwrap().items.len(), 4);

        let err = employees
            .import(vec![details("Dave"), details("Dave")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Dave"));
        let err = employees
            .import(vec![details("Erin"), details("Existing")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Existing"));

        // rejected batches write nothing
        assert_eq!(employees.list(1).await.unwrap().items.len(), 4);
    }
}
