//! Application support: configuration, storage paths, id generation,
//! messages and terminal output.

pub mod config;
pub mod data_storage;
pub mod export;
pub mod formatter;
pub mod messages;
pub mod snowflake;
pub mod view;
