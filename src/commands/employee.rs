use super::App;
use crate::db::employees::EmployeeDetails;
use crate::libs::messages::Message;
use crate::libs::view::View;
use crate::{msg_info, msg_print, msg_success};
use anyhow::Result;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct EmployeeArgs {
    #[command(subcommand)]
    command: EmployeeCommand,
}

#[derive(Debug, Subcommand)]
enum EmployeeCommand {
    /// Register an employee; missing fields are prompted for
    Create {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        phone: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        address: Option<String>,
    },
    /// Edit an employee's details
    Update {
        /// Employee ID
        id: i64,
    },
    /// Delete an employee and their attendance
    Delete {
        /// Employee ID
        id: i64,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show one employee
    Show { id: i64 },
    /// List employees page by page
    List {
        #[arg(short, long, default_value_t = 1)]
        page: u64,
    },
    /// Find employees by name or id fragment
    Search { keyword: String },
    /// Import employees from a CSV file with a name,phone,email,address header
    Import { file: PathBuf },
}

pub async fn cmd(app: &App, args: EmployeeArgs) -> Result<()> {
    match args.command {
        EmployeeCommand::Create {
            name,
            phone,
            email,
            address,
        } => {
            let details = match name {
                Some(name) => EmployeeDetails {
                    name,
                    phone,
                    email,
                    address,
                },
                None => prompt_details(EmployeeDetails::default())?,
            };
            let id = app.employees().create(details).await?;
            msg_success!(Message::EmployeeCreated(id));
            Ok(())
        }
        EmployeeCommand::Update { id } => handle_update(app, id).await,
        EmployeeCommand::Delete { id, yes } => handle_delete(app, id, yes).await,
        EmployeeCommand::Show { id } => View::employees(&[app.employees().get_by_id(id).await?]),
        EmployeeCommand::List { page } => {
            let result = app.employees().list(page).await?;
            if result.items.is_empty() {
                msg_info!(Message::EmployeesNotFound);
                return Ok(());
            }
            View::employees(&result.items)?;
            msg_print!(Message::PageOf(page.max(1), result.pages));
            Ok(())
        }
        EmployeeCommand::Search { keyword } => {
            let employees = app.employees().search(&keyword).await?;
            if employees.is_empty() {
                msg_info!(Message::EmployeesNotFound);
                return Ok(());
            }
            View::employees(&employees)
        }
        EmployeeCommand::Import { file } => {
            let count = app.employees().import(read_csv(&file)?).await?;
            msg_success!(Message::EmployeesImported(count));
            Ok(())
        }
    }
}

async fn handle_update(app: &App, id: i64) -> Result<()> {
    let employees = app.employees();
    let current = employees.get_by_id(id).await?;
    let details = prompt_details(EmployeeDetails {
        name: current.name,
        phone: current.phone,
        email: current.email,
        address: current.address,
    })?;

    employees.update(id, details).await?;
    msg_success!(Message::EmployeeUpdated(id));
    Ok(())
}

async fn handle_delete(app: &App, id: i64, yes: bool) -> Result<()> {
    let employees = app.employees();
    employees.get_by_id(id).await?;

    let confirmed = yes
        || Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::ConfirmDeleteEmployee(id).to_string())
            .default(false)
            .interact()?;
    if !confirmed {
        msg_info!(Message::OperationCancelled);
        return Ok(());
    }

    employees.delete(id).await?;
    msg_success!(Message::EmployeeDeleted(id));
    Ok(())
}

/// Prompts for every field, pre-filled with `current`.
fn prompt_details(current: EmployeeDetails) -> Result<EmployeeDetails> {
    let theme = ColorfulTheme::default();
    let name: String = Input::with_theme(&theme)
        .with_prompt(Message::PromptEmployeeName.to_string())
        .with_initial_text(current.name)
        .validate_with(|name: &String| if name.trim().is_empty() { Err("must not be empty") } else { Ok(()) })
        .interact_text()?;

    let optional = |prompt: Message, value: Option<String>| -> Result<Option<String>> {
        let answer: String = Input::with_theme(&theme)
            .with_prompt(prompt.to_string())
            .with_initial_text(value.unwrap_or_default())
            .allow_empty(true)
            .interact_text()?;
        let answer = answer.trim();
        Ok((!answer.is_empty()).then(|| answer.to_string()))
    };

    Ok(EmployeeDetails {
        name: name.trim().to_string(),
        phone: optional(Message::PromptPhone, current.phone)?,
        email: optional(Message::PromptEmail, current.email)?,
        address: optional(Message::PromptAddress, current.address)?,
    })
}

fn read_csv(path: &Path) -> Result<Vec<EmployeeDetails>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut batch = Vec::new();
    for row in reader.deserialize() {
        batch.push(row?);
    }
    Ok(batch)
}
