pub mod attend;
pub mod employee;
pub mod init;
pub mod report;
pub mod user;

use crate::db::attendance::Attendance;
use crate::db::db::Db;
use crate::db::employees::Employees;
use crate::db::users::Users;
use crate::libs::config::Config;
use crate::libs::snowflake::Snowflake;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Manage application users and sessions")]
    User(user::UserArgs),
    #[command(about = "Manage employees")]
    Employee(employee::EmployeeArgs),
    #[command(about = "Record a check-in")]
    In(attend::AttendArgs),
    #[command(about = "Record a check-out")]
    Out(attend::AttendArgs),
    #[command(about = "Show an employee's recorded events")]
    History(attend::HistoryArgs),
    #[command(about = "Remove attendance events older than a date")]
    Purge(attend::PurgeArgs),
    #[command(about = "Monthly attendance report")]
    Report(report::ReportArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            command => {
                let app = App::open()?;
                let result = app.run(command).await;
                app.finish(result)
            }
        }
    }
}

/// Everything a command needs: the database, the id generator and the
/// configured page size.
#[derive(Clone)]
pub struct App {
    pub db: Db,
    pub ids: Arc<Snowflake>,
    pub page_size: u64,
}

impl App {
    /// Opens the configured database and builds the process id generator.
    pub fn open() -> Result<Self> {
        let config = Config::read()?;
        let ids = Arc::new(config.snowflake.generator()?);
        let db = Db::open(config.db_path()?)?;
        Ok(Self::new(db, ids, config.page_size))
    }

    pub fn new(db: Db, ids: Arc<Snowflake>, page_size: u64) -> Self {
        Self { db, ids, page_size }
    }

    async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Init(args) => init::cmd(args),
            Commands::User(args) => user::cmd(self, args).await,
            Commands::Employee(args) => employee::cmd(self, args).await,
            Commands::In(args) => attend::check_in(self, args).await,
            Commands::Out(args) => attend::check_out(self, args).await,
            Commands::History(args) => attend::history(self, args).await,
            Commands::Purge(args) => attend::purge(self, args).await,
            Commands::Report(args) => report::cmd(self, args).await,
        }
    }

    /// Closes the database and returns the command's result. A close
    /// failure is only reported when the command itself succeeded.
    pub fn finish(&self, result: Result<()>) -> Result<()> {
        match (result, self.db.close()) {
            (Err(e), Err(close)) => {
                tracing::warn!(error = %close, "database close failed");
                Err(e)
            }
            (result, closed) => result.and(closed.map_err(Into::into)),
        }
    }

    pub fn users(&self) -> Users {
        Users::new(self.db.clone(), self.ids.clone(), self.page_size)
    }

    pub fn employees(&self) -> Employees {
        Employees::new(self.db.clone(), self.ids.clone(), self.page_size)
    }

    pub fn attendance(&self) -> Attendance {
        Attendance::new(self.db.clone(), self.ids.clone())
    }
}
