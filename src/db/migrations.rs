//! Database schema migrations.
//!
//! The application owns four tables (`users`, `employees`, `attendance`,
//! `tokens`). Their schema is created and evolved here, one numbered
//! migration at a time, the first time a database file is opened by a newer
//! build.
//!
//! ## Usage
//!
//! ```rust
//! use attend::db::migrations::{get_db_version, init_with_migrations};
//! use rusqlite::Connection;
//!
//! let mut conn = Connection::open_in_memory()?;
//! init_with_migrations(&mut conn)?;
//! assert!(get_db_version(&conn)? >= 1);
//! # Ok::<(), rusqlite::Error>(())
//! ```

use crate::libs::messages::Message;
use crate::msg_debug;
use rusqlite::{params, Connection, Result, Transaction};

/// Tracking table recording every applied migration.
const MIGRATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS migrations (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

#[derive(Debug, Clone)]
struct Migration {
    version: u32,
    name: &'static str,
    up: fn(&Transaction) -> Result<()>,
}

/// Ordered registry of schema migrations.
///
/// Pending migrations are applied inside one transaction, so a failure in any
/// of them leaves the schema at its previous version.
pub struct MigrationManager {
    migrations: Vec<Migration>,
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationManager {
    pub fn new() -> Self {
        let mut manager = Self { migrations: Vec::new() };
        manager.register_migrations();
        manager
    }

    fn register_migrations(&mut self) {
        // Version 1: users, employees and attendance events
        self.add_migration(1, "create_core_tables", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY,
                    username TEXT NOT NULL,
                    password TEXT NOT NULL
                )",
                [],
            )?;
            tx.execute(
                "CREATE TABLE IF NOT EXISTS employees (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    phone TEXT,
                    email TEXT,
                    address TEXT
                )",
                [],
            )?;
            tx.execute(
                "CREATE TABLE IF NOT EXISTS attendance (
                    id INTEGER PRIMARY KEY,
                    employee_id INTEGER NOT NULL,
                    type INTEGER NOT NULL,
                    created_at TIMESTAMP NOT NULL DEFAULT (datetime('now', 'localtime')),
                    FOREIGN KEY (employee_id) REFERENCES employees(id) ON DELETE CASCADE
                )",
                [],
            )?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_users_username ON users(username)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_employees_name ON employees(name)", [])?;
            tx.execute(
                "CREATE INDEX IF NOT EXISTS idx_attendance_employee ON attendance(employee_id, created_at)",
                [],
            )?;
            Ok(())
        });

        // Version 2: login tokens
        self.add_migration(2, "add_tokens", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS tokens (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    token INTEGER NOT NULL UNIQUE,
                    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
                )",
                [],
            )?;
            Ok(())
        });
    }

    fn add_migration(&mut self, version: u32, name: &'static str, up: fn(&Transaction) -> Result<()>) {
        self.migrations.push(Migration { version, name, up });
    }

    /// Applies every migration newer than the database's current version.
    pub fn run_migrations(&self, conn: &mut Connection) -> Result<()> {
        conn.execute(MIGRATIONS_TABLE, [])?;

        let current_version = get_db_version(conn)?;
        let pending: Vec<&Migration> = self.migrations.iter().filter(|m| m.version > current_version).collect();

        if pending.is_empty() {
            msg_debug!(Message::DatabaseUpToDate);
            return Ok(());
        }

        let tx = conn.transaction()?;
        for migration in pending {
            msg_debug!(Message::RunningMigration(migration.version, migration.name.to_string()));
            if let Err(e) = (migration.up)(&tx) {
                tracing::error!(version = migration.version, error = %e, "migration failed");
                return Err(e);
            }
            tx.execute(
                "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
                params![migration.version, migration.name],
            )?;
        }
        tx.commit()?;

        tracing::info!(version = self.latest_version(), "database migrated");
        Ok(())
    }

    pub fn latest_version(&self) -> u32 {
        self.migrations.iter().map(|m| m.version).max().unwrap_or(0)
    }

    /// Applied migrations as `(version, name, applied_at)`, oldest first.
    pub fn get_migration_history(&self, conn: &Connection) -> Result<Vec<(u32, String, String)>> {
        let mut stmt = conn.prepare("SELECT version, name, applied_at FROM migrations ORDER BY version")?;
        let history = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<Result<Vec<_>>>()?;
        Ok(history)
    }
}

/// Highest applied migration version, or 0 for a fresh database.
pub fn get_db_version(conn: &Connection) -> Result<u32> {
    let version: Option<u32> = conn.query_row("SELECT MAX(version) FROM migrations", [], |row| row.get(0))?;
    Ok(version.unwrap_or(0))
}

/// Creates the tracking table and applies all pending migrations.
pub fn init_with_migrations(conn: &mut Connection) -> Result<()> {
    MigrationManager::new().run_migrations(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        init_with_migrations(&mut conn).unwrap();
        init_with_migrations(&mut conn).unwrap();

        let manager = MigrationManager::new();
        assert_eq!(get_db_version(&conn).unwrap(), manager.latest_version());

        let history = manager.get_migration_history(&conn).unwrap();
        let names: Vec<_> = history.iter().map(|(_, name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["create_core_tables", "add_tokens"]);
    }

    #[test]
    fn test_creates_application_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        init_with_migrations(&mut conn).unwrap();

        for table in ["users", "employees", "attendance", "tokens"] {
            let exists: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(exists, 1, "missing table {}", table);
        }
    }
}
