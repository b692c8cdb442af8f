//! Application configuration.
//!
//! Settings live in `config.json` inside the platform data directory
//! (see [`DataStorage`]). A missing file means defaults, so the application
//! runs without any setup:
//!
//! ```json
//! {
//!   "snowflake": { "worker_id": 1, "datacenter_id": 1 },
//!   "page_size": 20,
//!   "database": null
//! }
//! ```
//!
//! The database location can also be overridden with the `ATTEND_DB`
//! environment variable, which takes precedence over the file.

use super::data_storage::DataStorage;
use crate::db::db::DB_FILE_NAME;
use crate::libs::snowflake::{Snowflake, SnowflakeError, MAX_DATACENTER_ID, MAX_WORKER_ID};
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DB_PATH_ENV: &str = "ATTEND_DB";
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Identity of this process for id generation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SnowflakeConfig {
    pub worker_id: u64,
    pub datacenter_id: u64,
}

impl Default for SnowflakeConfig {
    fn default() -> Self {
        Self {
            worker_id: 1,
            datacenter_id: 1,
        }
    }
}

impl SnowflakeConfig {
    /// Builds the process-wide generator, validating both ids.
    pub fn generator(&self) -> Result<Snowflake, SnowflakeError> {
        Snowflake::new(self.worker_id, self.datacenter_id)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub snowflake: SnowflakeConfig,

    /// Rows per page for `list` commands.
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Explicit database file; the data directory is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Config {
            snowflake: SnowflakeConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
            database: None,
        }
    }
}

impl Config {
    /// Reads the configuration from the data directory, falling back to
    /// defaults when no file exists.
    pub fn read() -> Result<Config> {
        Self::read_from(&DataStorage::new())
    }

    pub fn read_from(storage: &DataStorage) -> Result<Config> {
        let config_file_path = storage.get_path(CONFIG_FILE_NAME)?;
        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&DataStorage::new())
    }

    pub fn save_to(&self, storage: &DataStorage) -> Result<()> {
        let config_file_path = storage.get_path(CONFIG_FILE_NAME)?;
        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Database file to open: `ATTEND_DB`, then `database`, then the data
    /// directory default.
    pub fn db_path(&self) -> Result<PathBuf> {
        if let Ok(path) = std::env::var(DB_PATH_ENV) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => DataStorage::new().get_path(DB_FILE_NAME),
        }
    }

    /// Interactive setup, pre-filled with the current values.
    pub fn init() -> Result<Self> {
        let current = Self::read().unwrap_or_default();
        let theme = ColorfulTheme::default();

        let worker_id: u64 = Input::with_theme(&theme)
            .with_prompt(format!("Worker id (0-{})", MAX_WORKER_ID))
            .default(current.snowflake.worker_id)
            .validate_with(|v: &u64| range_check(*v, MAX_WORKER_ID))
            .interact_text()?;
        let datacenter_id: u64 = Input::with_theme(&theme)
            .with_prompt(format!("Datacenter id (0-{})", MAX_DATACENTER_ID))
            .default(current.snowflake.datacenter_id)
            .validate_with(|v: &u64| range_check(*v, MAX_DATACENTER_ID))
            .interact_text()?;
        let page_size: u64 = Input::with_theme(&theme)
            .with_prompt("Rows per page")
            .default(current.page_size)
            .validate_with(|v: &u64| if *v > 0 { Ok(()) } else { Err("must be positive") })
            .interact_text()?;
        let database: String = Input::with_theme(&theme)
            .with_prompt("Database file (empty for default)")
            .default(
                current
                    .database
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            )
            .allow_empty(true)
            .interact_text()?;

        Ok(Config {
            snowflake: SnowflakeConfig {
                worker_id,
                datacenter_id,
            },
            page_size,
            database: if database.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(database.trim()))
            },
        })
    }
}

fn range_check(value: u64, max: u64) -> Result<(), String> {
    if value <= max {
        Ok(())
    } else {
        Err(format!("must be between 0 and {}", max))
    }
}
