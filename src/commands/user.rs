use super::App;
use crate::libs::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::libs::view::View;
use crate::{msg_bail_anyhow, msg_info, msg_print, msg_success};
use anyhow::Result;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password};
use std::fs;

/// File in the data directory holding the token of the logged-in user.
const SESSION_FILE_NAME: &str = "session";

#[derive(Debug, Args)]
pub struct UserArgs {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Debug, Subcommand)]
enum UserCommand {
    /// Create a user
    Create {
        /// Username; prompted for when omitted
        username: Option<String>,
    },
    /// Change a user's name and password
    Update {
        /// User ID
        id: i64,
    },
    /// Delete a user
    Delete {
        /// User ID
        id: i64,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// List users page by page
    List {
        #[arg(short, long, default_value_t = 1)]
        page: u64,
    },
    /// Find users by name or id fragment
    Search { keyword: String },
    /// Log in and remember the session
    Login { username: Option<String> },
    /// End the current session
    Logout,
    /// Show the logged-in user
    Whoami,
}

pub async fn cmd(app: &App, args: UserArgs) -> Result<()> {
    match args.command {
        UserCommand::Create { username } => handle_create(app, username).await,
        UserCommand::Update { id } => handle_update(app, id).await,
        UserCommand::Delete { id, yes } => handle_delete(app, id, yes).await,
        UserCommand::List { page } => handle_list(app, page).await,
        UserCommand::Search { keyword } => handle_search(app, &keyword).await,
        UserCommand::Login { username } => handle_login(app, username).await,
        UserCommand::Logout => handle_logout(app).await,
        UserCommand::Whoami => handle_whoami(app).await,
    }
}

async fn handle_create(app: &App, username: Option<String>) -> Result<()> {
    let username = match username {
        Some(name) => name,
        None => prompt_username(None)?,
    };
    let password = prompt_new_password()?;

    let id = app.users().create(&username, &password).await?;
    msg_success!(Message::UserCreated(id));
    Ok(())
}

async fn handle_update(app: &App, id: i64) -> Result<()> {
    let users = app.users();
    let user = users.get_by_id(id).await?;

    let username = prompt_username(Some(user.username))?;
    let password = prompt_new_password()?;
    users.update(id, &username, &password).await?;
    msg_success!(Message::UserUpdated(id));
    Ok(())
}

async fn handle_delete(app: &App, id: i64, yes: bool) -> Result<()> {
    let users = app.users();
    users.get_by_id(id).await?;

    let confirmed = yes
        || Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::ConfirmDeleteUser(id).to_string())
            .default(false)
            .interact()?;
    if !confirmed {
        msg_info!(Message::OperationCancelled);
        return Ok(());
    }

    users.delete(id).await?;
    msg_success!(Message::UserDeleted(id));
    Ok(())
}

async fn handle_list(app: &App, page: u64) -> Result<()> {
    let result = app.users().list(page).await?;
    if result.items.is_empty() {
        msg_info!(Message::UsersNotFound);
        return Ok(());
    }
    View::users(&result.items)?;
    msg_print!(Message::PageOf(page.max(1), result.pages));
    Ok(())
}

async fn handle_search(app: &App, keyword: &str) -> Result<()> {
    let users = app.users().search(keyword).await?;
    if users.is_empty() {
        msg_info!(Message::UsersNotFound);
        return Ok(());
    }
    View::users(&users)
}

async fn handle_login(app: &App, username: Option<String>) -> Result<()> {
    let username = match username {
        Some(name) => name,
        None => prompt_username(None)?,
    };
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptPassword.to_string())
        .interact()?;

    let session = app.users().login(&username, &password).await?;
    fs::write(session_path()?, session.token.to_string())?;
    msg_success!(Message::LoggedIn(session.user.username));
    Ok(())
}

async fn handle_logout(app: &App) -> Result<()> {
    let Some(token) = read_session()? else {
        msg_bail_anyhow!(Message::NotLoggedIn);
    };
    let result = app.users().logout(token).await;
    fs::remove_file(session_path()?)?;
    result?;
    msg_success!(Message::LoggedOut);
    Ok(())
}

async fn handle_whoami(app: &App) -> Result<()> {
    let Some(token) = read_session()? else {
        msg_bail_anyhow!(Message::NotLoggedIn);
    };
    let user = app.users().get_by_token(token).await?;
    msg_print!(Message::LoggedInAs(user.username, user.id));
    Ok(())
}

fn prompt_username(current: Option<String>) -> Result<String> {
    let theme = ColorfulTheme::default();
    let input = Input::<String>::with_theme(&theme).with_prompt(Message::PromptUsername.to_string());
    let input = match current {
        Some(current) => input.default(current),
        None => input,
    };
    Ok(input
        .validate_with(|name: &String| if name.trim().is_empty() { Err("must not be empty") } else { Ok(()) })
        .interact_text()?
        .trim()
        .to_string())
}

fn prompt_new_password() -> Result<String> {
    Ok(Password::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptPassword.to_string())
        .with_confirmation(Message::PromptConfirmPassword.to_string(), Message::PasswordsDoNotMatch.to_string())
        .interact()?)
}

fn session_path() -> Result<std::path::PathBuf> {
    DataStorage::new().get_path(SESSION_FILE_NAME)
}

/// Token saved by the last login, if any.
fn read_session() -> Result<Option<i64>> {
    let path = session_path()?;
    if !path.exists() {
        return Ok(None);
    }
    Ok(fs::read_to_string(path)?.trim().parse().ok())
}
