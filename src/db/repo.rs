//! Helpers shared by the entity repositories.

use super::error::DbError;
use super::value::{from_record, Record};
use crate::libs::messages::Message;
use crate::libs::snowflake::Snowflake;
use anyhow::Result;
use serde::de::DeserializeOwned;

/// A page of rows plus the total number of pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pages: u64,
}

/// Mints an id that fits the signed `INTEGER` primary keys.
pub fn next_id(ids: &Snowflake) -> Result<i64> {
    Ok(i64::try_from(ids.next_id()?)?)
}

pub fn decode_all<T: DeserializeOwned>(rows: Vec<Record>) -> Result<Vec<T>> {
    rows.into_iter().map(|row| Ok(from_record(row)?)).collect()
}

/// Attaches a user-facing message to an engine `NotFound`.
///
/// The [`DbError`] stays reachable through `downcast_ref`.
pub fn not_found_as(error: DbError, message: Message) -> anyhow::Error {
    if error.is_not_found() {
        anyhow::Error::new(error).context(format!("❌ {}", message))
    } else {
        error.into()
    }
}
