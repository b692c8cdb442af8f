//! Error taxonomy of the persistence engine.

use thiserror::Error;

/// Failures surfaced by [`Db`](crate::db::db::Db) operations.
///
/// Callers branch on the variant: `NotFound` is an expected outcome of a
/// lookup or keyed mutation, `Query` carries the driver error untouched.
#[derive(Debug, Error)]
pub enum DbError {
    /// Zero rows where exactly one was required, or an update/delete that
    /// matched nothing.
    #[error("no matching row found")]
    NotFound,

    /// SQL or driver failure, including constraint violations.
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// A value that cannot be bound as an SQLite parameter.
    #[error("unsupported value: {0}")]
    Value(String),

    /// `create`/`update` called without any column.
    #[error("record has no columns")]
    EmptyRecord,

    /// A row that could not be decoded into the requested type.
    #[error("failed to decode row: {0}")]
    Decode(#[from] serde_json::Error),

    /// The connection has already been closed.
    #[error("database connection is closed")]
    Closed,

    /// The blocking task running the statement panicked or was cancelled.
    #[error("database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl DbError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound)
    }
}

pub type DbResult<T> = Result<T, DbError>;
