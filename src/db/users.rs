//! Application users and their login tokens.
//!
//! Usernames are unique by convention: `create` and `update` check for an
//! existing owner before writing. The check and the write are separate
//! engine calls, so two racing writers could both pass it; the CLI runs one
//! command per process, which keeps that window closed in practice.

use super::db::{pages, Db};
use super::query::{Filter, Select};
use super::repo::{decode_all, next_id, not_found_as, Page};
use super::value::{from_record, to_record};
use crate::libs::messages::Message;
use crate::libs::snowflake::Snowflake;
use crate::{msg_bail_anyhow, msg_error_anyhow};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

pub const USER_TABLE: &str = "users";
pub const TOKEN_TABLE: &str = "tokens";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Token {
    id: i64,
    user_id: i64,
    token: i64,
}

/// Outcome of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: i64,
    pub user: User,
}

pub struct Users {
    db: Db,
    ids: Arc<Snowflake>,
    page_size: u64,
}

impl Users {
    pub fn new(db: Db, ids: Arc<Snowflake>, page_size: u64) -> Self {
        Self { db, ids, page_size }
    }

    /// Creates a user and returns its id.
    pub async fn create(&self, username: &str, password: &str) -> Result<i64> {
        let taken = self.db.count(USER_TABLE, Some(Filter::eq("username", username))).await?;
        if taken > 0 {
            msg_bail_anyhow!(Message::UsernameTaken(username.to_string()));
        }

        let user = User {
            id: next_id(&self.ids)?,
            username: username.to_string(),
            password: password.to_string(),
        };
        self.db.create(to_record(&user)?, USER_TABLE).await?;
        tracing::info!(id = user.id, "user created");
        Ok(user.id)
    }

    /// Changes a user's name and password.
    ///
    /// The new name must not belong to any other user.
    pub async fn update(&self, id: i64, username: &str, password: &str) -> Result<()> {
        let user = self.get_by_id(id).await?;
        let owners = self.get_by_username(username).await?;
        if owners.iter().any(|owner| owner.id != user.id) {
            msg_bail_anyhow!(Message::UsernameTaken(username.to_string()));
        }

        let changes = to_record(&json!({ "username": username, "password": password }))?;
        self.db.update(id, changes, USER_TABLE).await?;
        Ok(())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<User> {
        let record = self
            .db
            .get_by_id(id, Select::from(USER_TABLE))
            .await
            .map_err(|e| not_found_as(e, Message::UserNotFound(id)))?;
        Ok(from_record(record)?)
    }

    /// Every user registered under `username`.
    pub async fn get_by_username(&self, username: &str) -> Result<Vec<User>> {
        let select = Select::from(USER_TABLE).filter(Filter::eq("username", username));
        decode_all(self.db.get_all(select).await?)
    }

    /// Users whose name or id contains `keyword`.
    pub async fn search(&self, keyword: &str) -> Result<Vec<User>> {
        let pattern = format!("%{}%", keyword);
        let select = Select::from(USER_TABLE)
            .filter(Filter::new("username LIKE ? OR id LIKE ?", vec![json!(pattern), json!(pattern)]))
            .order_by("id");
        decode_all(self.db.get_all(select).await?)
    }

    pub async fn list(&self, page: u64) -> Result<Page<User>> {
        let rows = self
            .db
            .paginate(page, self.page_size, Select::from(USER_TABLE).order_by("id"))
            .await?;
        let count = self.db.count(USER_TABLE, None).await?;
        Ok(Page {
            items: decode_all(rows)?,
            pages: pages(count, self.page_size),
        })
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.db
            .delete_by_id(id, USER_TABLE)
            .await
            .map_err(|e| not_found_as(e, Message::UserNotFound(id)))
    }

    /// Checks credentials and issues a new session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let user = self
            .get_by_username(username)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| msg_error_anyhow!(Message::UsernameNotFound(username.to_string())))?;
        if user.password != password {
            msg_bail_anyhow!(Message::IncorrectPassword);
        }

        let token = Token {
            id: next_id(&self.ids)?,
            user_id: user.id,
            token: next_id(&self.ids)?,
        };
        self.db.create(to_record(&token)?, TOKEN_TABLE).await?;
        tracing::info!(user_id = user.id, "session opened");
        Ok(Session { token: token.token, user })
    }

    /// The user owning `token`.
    pub async fn get_by_token(&self, token: i64) -> Result<User> {
        let select = Select::from("tokens t")
            .columns("u.*")
            .join(&format!("JOIN {} u ON u.id = t.user_id", USER_TABLE));
        let record = self
            .db
            .get_by_column(token, "t.token", select)
            .await
            .map_err(|e| not_found_as(e, Message::SessionNotFound))?;
        Ok(from_record(record)?)
    }

    pub async fn logout(&self, token: i64) -> Result<()> {
        self.db
            .delete_by_column(token, "token", TOKEN_TABLE)
            .await
            .map_err(|e| not_found_as(e, Message::SessionNotFound))?;
        Ok(())
    }
}

