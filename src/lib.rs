//! # Attend - employee attendance tracking
//!
//! A command-line tracker that records employee check-ins and check-outs in
//! SQLite and turns them into monthly reports.
//!
//! ## Features
//!
//! - **Snowflake ids**: every row is keyed by a 64-bit, time-ordered id
//!   minted in-process ([`libs::snowflake`])
//! - **Generic persistence engine**: async CRUD, search, pagination and bulk
//!   operations over any table ([`db::db::Db`])
//! - **Users and sessions**: login tokens stored alongside the users
//! - **Reports**: per-employee daily hours and a monthly present/absent
//!   summary, exportable to CSV or JSON
//!
//! ## Usage
//!
//! ```rust,no_run
//! use attend::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
