//! Interactive configuration setup.

use crate::libs::config::{Config, CONFIG_FILE_NAME};
use crate::libs::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::{msg_info, msg_success};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Print the configuration and database locations without prompting
    #[arg(short, long)]
    show: bool,
}

pub fn cmd(init_args: InitArgs) -> Result<()> {
    if init_args.show {
        let config = Config::read()?;
        msg_info!(Message::ConfigLocation(DataStorage::new().get_path(CONFIG_FILE_NAME)?.display().to_string()));
        msg_info!(Message::DatabaseLocation(config.db_path()?.display().to_string()));
        return Ok(());
    }

    Config::init()?.save()?;
    msg_success!(Message::ConfigSaved);
    Ok(())
}
