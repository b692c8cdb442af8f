//! Persistence layer.
//!
//! [`db::Db`] is a table-agnostic async engine over one SQLite connection;
//! [`query`] builds the parameterized statements it runs. The entity
//! repositories ([`users`], [`employees`], [`attendance`]) sit on top of it,
//! minting primary keys with the process Snowflake generator.

/// Connection handle and the generic CRUD, search and bulk operations.
pub mod db;

/// Engine error type.
pub mod error;

/// Versioned schema migrations.
pub mod migrations;

/// Statement builders.
pub mod query;

/// Conversion between records and SQLite values.
pub mod value;

pub mod repo;

pub mod attendance;
pub mod employees;
pub mod users;
