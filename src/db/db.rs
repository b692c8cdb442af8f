//! Table-agnostic persistence engine.
//!
//! [`Db`] owns the single SQLite connection of the process and exposes typed
//! CRUD, search, pagination, counting and transactional mutation over any
//! table with an `id` primary key. Statements are built with
//! [`crate::db::query`]; values are always bound as parameters.
//!
//! Every operation is `async` and runs its statement on tokio's blocking
//! pool. The connection lives behind one mutex, so statements and
//! transactions issued through clones of the same handle are serialized.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use attend::db::db::Db;
//! use attend::db::query::{Combinator, Criteria, Select};
//!
//! # async fn run() -> Result<(), attend::db::error::DbError> {
//! let db = Db::open("attend.db")?;
//! let rows = db
//!     .search(Criteria::new().like("name", "ali"), Select::from("employees"), Combinator::And)
//!     .await?;
//! println!("{} matches", rows.len());
//! db.close()?;
//! # Ok(())
//! # }
//! ```

use super::error::{DbError, DbResult};
use super::migrations::init_with_migrations;
use super::query::{self, Combinator, Criteria, Filter, Select, Statement};
use super::value::{read_row, to_sql_params, Record};
use crate::libs::config::Config;
use parking_lot::Mutex;
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinSet;

pub const DB_FILE_NAME: &str = "attend.db";

/// Name of the primary key column every keyed operation assumes.
pub const ID_COLUMN: &str = "id";

/// One row of a [`Db::bulk_update`] batch.
#[derive(Debug, Clone)]
pub struct RowUpdate {
    pub id: Value,
    pub data: Record,
}

impl RowUpdate {
    pub fn new(id: impl Into<Value>, data: Record) -> Self {
        Self { id: id.into(), data }
    }
}

/// Shared handle to the application database.
///
/// Cloning is cheap; all clones use the same connection.
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl Db {
    /// Opens the database at the configured location.
    pub fn new() -> anyhow::Result<Db> {
        let db_file_path = Config::read()?.db_path()?;
        Ok(Self::open(db_file_path)?)
    }

    /// Opens or creates the database file at `path` and migrates it.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Db> {
        let conn = Connection::open(path.as_ref())?;
        // WAL keeps readers in other processes off the writer's back.
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
        tracing::debug!(path = %path.as_ref().display(), "database opened");
        Self::from_connection(conn)
    }

    /// Opens a private in-memory database; used by tests.
    pub fn open_in_memory() -> DbResult<Db> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> DbResult<Db> {
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        init_with_migrations(&mut conn)?;
        Ok(Db {
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    /// Closes the connection.
    ///
    /// Waits for the statement currently holding the connection, then closes
    /// it. Later calls are no-ops; later operations fail with
    /// [`DbError::Closed`].
    pub fn close(&self) -> DbResult<()> {
        let conn = self.conn.lock().take();
        if let Some(conn) = conn {
            conn.close().map_err(|(_, e)| DbError::Query(e))?;
            tracing::debug!("database closed");
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.conn.lock().is_none()
    }

    /// Runs `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> DbResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> DbResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            let conn = guard.as_mut().ok_or(DbError::Closed)?;
            f(conn)
        })
        .await?
    }

    /// Returns the single row produced by `sql`.
    ///
    /// # Errors
    ///
    /// [`DbError::NotFound`] when the query yields no row.
    pub async fn get(&self, sql: impl Into<String>, params: Vec<Value>) -> DbResult<Record> {
        let statement = Statement::new(sql, params);
        self.with_conn(move |conn| query_one(conn, &statement)).await
    }

    /// Returns every row produced by `sql`, in result order.
    pub async fn get_all_rows(&self, sql: impl Into<String>, params: Vec<Value>) -> DbResult<Vec<Record>> {
        let statement = Statement::new(sql, params);
        self.with_conn(move |conn| query_all(conn, &statement)).await
    }

    /// Runs a `SELECT` built from clause objects.
    pub async fn get_all(&self, select: Select) -> DbResult<Vec<Record>> {
        let statement = select.build();
        self.with_conn(move |conn| query_all(conn, &statement)).await
    }

    pub async fn get_by_id(&self, id: impl Into<Value>, select: Select) -> DbResult<Record> {
        self.get_by_column(id, ID_COLUMN, select).await
    }

    pub async fn get_by_column(&self, value: impl Into<Value>, column: &str, select: Select) -> DbResult<Record> {
        let statement = select.filter(Filter::eq(column, value)).build();
        self.with_conn(move |conn| query_one(conn, &statement)).await
    }

    /// Inserts `record` into `table` in its own transaction.
    ///
    /// Columns are the record's keys and values its values, in order.
    pub async fn create(&self, record: Record, table: &str) -> DbResult<()> {
        if record.is_empty() {
            return Err(DbError::EmptyRecord);
        }
        let statement = query::insert(table, &record);
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            execute(&tx, &statement)?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    /// Updates the row whose `id` equals `id`.
    ///
    /// Commits only if a row was affected; otherwise the transaction is
    /// rolled back and [`DbError::NotFound`] is returned.
    pub async fn update(&self, id: impl Into<Value>, record: Record, table: &str) -> DbResult<()> {
        self.update_by_column(id, ID_COLUMN, record, table).await.map(|_| ())
    }

    /// Updates every row whose `column` equals `value` and returns how many
    /// were changed. Zero matches roll back and fail with
    /// [`DbError::NotFound`].
    pub async fn update_by_column(
        &self,
        value: impl Into<Value>,
        column: &str,
        record: Record,
        table: &str,
    ) -> DbResult<usize> {
        if record.is_empty() {
            return Err(DbError::EmptyRecord);
        }
        let statement = query::update(table, &record, column, value.into());
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let affected = execute(&tx, &statement)?;
            if affected == 0 {
                tx.rollback()?;
                tracing::warn!(sql = %statement.sql, "update matched no rows, rolled back");
                return Err(DbError::NotFound);
            }
            tx.commit()?;
            Ok(affected)
        })
        .await
    }

    /// Deletes the row with the given id; fails with [`DbError::NotFound`]
    /// if there is none.
    pub async fn delete_by_id(&self, id: impl Into<Value>, table: &str) -> DbResult<()> {
        self.delete_by_column(id, ID_COLUMN, table).await.map(|_| ())
    }

    pub async fn delete_by_column(&self, value: impl Into<Value>, column: &str, table: &str) -> DbResult<usize> {
        let statement = query::delete(table, Filter::eq(column, value));
        self.with_conn(move |conn| match execute(conn, &statement)? {
            0 => Err(DbError::NotFound),
            affected => Ok(affected),
        })
        .await
    }

    /// Deletes rows matching an arbitrary predicate fragment and returns the
    /// number removed, which may be zero.
    pub async fn delete_complex(&self, table: &str, filter: Filter) -> DbResult<usize> {
        let statement = query::delete(table, filter);
        self.with_conn(move |conn| execute(conn, &statement)).await
    }

    /// Returns the rows matching `criteria`, combined with `combinator`.
    ///
    /// `Like` criteria match substrings. Empty criteria match every row.
    pub async fn search(&self, criteria: Criteria, select: Select, combinator: Combinator) -> DbResult<Vec<Record>> {
        let select = if criteria.is_empty() {
            select
        } else {
            select.filter(criteria.to_filter(combinator))
        };
        self.get_all(select).await
    }

    /// Returns page `page` (1-indexed) of `page_size` rows.
    ///
    /// Page 0 is treated as page 1.
    pub async fn paginate(&self, page: u64, page_size: u64, select: Select) -> DbResult<Vec<Record>> {
        // SQLite binds LIMIT and OFFSET as i64; a page that starts past that is empty.
        let max = i64::MAX as u64;
        let offset = match (page.max(1) - 1).checked_mul(page_size) {
            Some(offset) if offset <= max => offset,
            _ => return Ok(Vec::new()),
        };
        self.get_all(select.paginated(page_size.min(max), offset)).await
    }

    /// Counts the rows of `table` matching the optional filter.
    pub async fn count(&self, table: &str, filter: Option<Filter>) -> DbResult<u64> {
        let statement = query::count(table, filter);
        self.with_conn(move |conn| {
            let count: i64 = conn.query_row(&statement.sql, params_from_iter(to_sql_params(&statement.params)?), |row| {
                row.get(0)
            })?;
            Ok(u64::try_from(count).unwrap_or_default())
        })
        .await
    }

    /// Sums `column` over `table`. `None` when there is nothing to sum.
    pub async fn sum(&self, column: &str, table: &str) -> DbResult<Option<f64>> {
        let statement = query::sum(column, table);
        self.with_conn(move |conn| {
            let total = conn.query_row(&statement.sql, [], |row| {
                Ok(match row.get_ref(0)? {
                    ValueRef::Integer(i) => Some(i as f64),
                    ValueRef::Real(f) => Some(f),
                    _ => None,
                })
            })?;
            Ok(total)
        })
        .await
    }

    /// Inserts all records concurrently.
    ///
    /// The first failure is returned and tasks that have not started are
    /// cancelled; records already committed stay committed.
    pub async fn bulk_insert(&self, records: Vec<Record>, table: &str) -> DbResult<()> {
        let mut set = JoinSet::new();
        for record in records {
            let db = self.clone();
            let table = table.to_string();
            set.spawn(async move { db.create(record, &table).await });
        }
        join_all(set).await
    }

    /// Updates all rows concurrently, with the same failure semantics as
    /// [`Db::bulk_insert`].
    pub async fn bulk_update(&self, updates: Vec<RowUpdate>, table: &str) -> DbResult<()> {
        let mut set = JoinSet::new();
        for RowUpdate { id, data } in updates {
            let db = self.clone();
            let table = table.to_string();
            set.spawn(async move { db.update(id, data, &table).await });
        }
        join_all(set).await
    }
}

/// Number of pages needed to show `count` rows, `page_size` at a time.
pub fn pages(count: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        0
    } else {
        count.div_ceil(page_size)
    }
}

async fn join_all(mut set: JoinSet<DbResult<()>>) -> DbResult<()> {
    while let Some(result) = set.join_next().await {
        if let Err(e) = result.map_err(DbError::from).and_then(|r| r) {
            set.abort_all();
            return Err(e);
        }
    }
    Ok(())
}

fn execute(conn: &Connection, statement: &Statement) -> DbResult<usize> {
    tracing::debug!(sql = %statement.sql, "execute");
    let params = to_sql_params(&statement.params)?;
    Ok(conn.execute(&statement.sql, params_from_iter(params))?)
}

fn query_all(conn: &Connection, statement: &Statement) -> DbResult<Vec<Record>> {
    tracing::debug!(sql = %statement.sql, "query");
    let params = to_sql_params(&statement.params)?;
    let mut stmt = conn.prepare(&statement.sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let rows = stmt
        .query_map(params_from_iter(params), |row| read_row(row, &columns))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn query_one(conn: &Connection, statement: &Statement) -> DbResult<Record> {
    tracing::debug!(sql = %statement.sql, "query one");
    let params = to_sql_params(&statement.params)?;
    let mut stmt = conn.prepare(&statement.sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    stmt.query_row(params_from_iter(params), |row| read_row(row, &columns))
        .optional()?
        .ok_or(DbError::NotFound)
}
