#[cfg(test)]
mod tests {
    use attend::commands::App;
    use attend::db::db::Db;
    use attend::db::error::DbError;
    use attend::libs::snowflake::Snowflake;
    use std::sync::Arc;
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};

    struct UsersContext {
        _temp_dir: TempDir,
        app: App,
    }

    impl AsyncTestContext for UsersContext {
        async fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join("attend.db")).unwrap();
            let ids = Arc::new(Snowflake::new(1, 1).unwrap());
            UsersContext {
                _temp_dir: temp_dir,
                app: App::new(db, ids, 2),
            }
        }

        async fn teardown(self) {
            self.app.db.close().unwrap();
        }
    }

    fn is_not_found(err: &anyhow::Error) -> bool {
        err.downcast_ref::<DbError>().is_some_and(DbError::is_not_found)
    }

    #[test_context(UsersContext)]
    #[tokio::test]
    async fn test_create_and_get(ctx: &mut UsersContext) {
        let users = ctx.app.users();
        let id = users.create("alice", "secret").await.unwrap();

        let user = users.get_by_id(id).await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.password, "secret");
        assert!(id > 0);
    }

    #[test_context(UsersContext)]
    #[tokio::test]
    async fn test_usernames_are_unique(ctx: &mut UsersContext) {
        let users = ctx.app.users();
        users.create("alice", "one").await.unwrap();

        let err = users.create("alice", "two").await.unwrap_err();
        assert!(err.to_string().contains("already taken"));
        assert_eq!(users.get_by_username("alice").await.unwrap().len(), 1);
    }

    #[test_context(UsersContext)]
    #[tokio::test]
    async fn test_update(ctx: &mut UsersContext) {
        let users = ctx.app.users();
        let alice = users.create("alice", "one").await.unwrap();
        users.create("bob", "two").await.unwrap();

        let err = users.update(alice, "bob", "three").await.unwrap_err();
        assert!(err.to_string().contains("already taken"));

        users.update(alice, "alice", "changed").await.unwrap();
        assert_eq!(users.get_by_id(alice).await.unwrap().password, "changed");

        users.update(alice, "carol", "changed").await.unwrap();
        assert_eq!(users.get_by_id(alice).await.unwrap().username, "carol");

        let err = users.update(12345, "dave", "x").await.unwrap_err();
        assert!(is_not_found(&err));
    }

    #[test_context(UsersContext)]
    #[tokio::test]
    async fn test_login_session_lifecycle(ctx: &mut UsersContext) {
        let users = ctx.app.users();
        let id = users.create("alice", "secret").await.unwrap();

        let err = users.login("alice", "wrong").await.unwrap_err();
        assert!(err.to_string().contains("Incorrect password"));
        let err = users.login("nobody", "secret").await.unwrap_err();
        assert!(err.to_string().contains("not found"));

        let session = users.login("alice", "secret").await.unwrap();
        assert_eq!(session.user.id, id);
        assert_eq!(users.get_by_token(session.token).await.unwrap().username, "alice");

        users.logout(session.token).await.unwrap();
        let err = users.get_by_token(session.token).await.unwrap_err();
        assert!(is_not_found(&err));
        assert!(is_not_found(&users.logout(session.token).await.unwrap_err()));
    }

    #[test_context(UsersContext)]
    #[tokio::test]
    async fn test_list_and_search(ctx: &mut UsersContext) {
        let users = ctx.app.users();
        for name in ["alice", "bob", "carol", "malina", "dave"] {
            users.create(name, "pw").await.unwrap();
        }

        let first = users.list(1).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.pages, 3);
        assert_eq!(users.list(3).await.unwrap().items.len(), 1);

        let found: Vec<String> = users
            .search("li")
            .await
            .unwrap()
            .into_iter()
            .map(|user| user.username)
            .collect();
        assert_eq!(found.len(), 2);
        assert!(found.contains(&"alice".to_string()));
        assert!(found.contains(&"malina".to_string()));
    }

    #[test_context(UsersContext)]
    #[tokio::test]
    async fn test_delete(ctx: &mut UsersContext) {
        let users = ctx.app.users();
        let id = users.create("alice", "pw").await.unwrap();
        let session = users.login("alice", "pw").await.unwrap();

        users.delete(id).await.unwrap();
        assert!(is_not_found(&users.get_by_id(id).await.unwrap_err()));
        assert!(is_not_found(&users.delete(id).await.unwrap_err()));
        // tokens go with their user
        assert!(is_not_found(&users.get_by_token(session.token).await.unwrap_err()));
    }
}
