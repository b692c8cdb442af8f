use super::db::{pages, Db};
use super::query::{Filter, Select};
use super::repo::{decode_all, next_id, not_found_as, Page};
use super::value::{from_record, to_record};
use crate::libs::messages::Message;
use crate::libs::snowflake::Snowflake;
use crate::msg_bail_anyhow;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

pub const EMPLOYEE_TABLE: &str = "employees";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Contact details set when creating or editing an employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDetails {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

pub struct Employees {
    db: Db,
    ids: Arc<Snowflake>,
    page_size: u64,
}

impl Employees {
    pub fn new(db: Db, ids: Arc<Snowflake>, page_size: u64) -> Self {
        Self { db, ids, page_size }
    }

    /// Registers an employee; names must be unique.
    pub async fn create(&self, details: EmployeeDetails) -> Result<i64> {
        let taken = self
            .db
            .count(EMPLOYEE_TABLE, Some(Filter::eq("name", details.name.as_str())))
            .await?;
        if taken > 0 {
            msg_bail_anyhow!(Message::EmployeeNameTaken(details.name));
        }

        let employee = Employee {
            id: next_id(&self.ids)?,
            name: details.name,
            phone: details.phone,
            email: details.email,
            address: details.address,
        };
        self.db.create(to_record(&employee)?, EMPLOYEE_TABLE).await?;
        tracing::info!(id = employee.id, "employee created");
        Ok(employee.id)
    }

    /// Registers a batch of employees concurrently and returns how many were
    /// added.
    ///
    /// Every name is checked against the table and the rest of the batch
    /// before anything is written.
    pub async fn import(&self, batch: Vec<EmployeeDetails>) -> Result<usize> {
        let mut seen = HashSet::new();
        for details in &batch {
            let taken = self
                .db
                .count(EMPLOYEE_TABLE, Some(Filter::eq("name", details.name.as_str())))
                .await?;
            if taken > 0 || !seen.insert(details.name.as_str()) {
                msg_bail_anyhow!(Message::EmployeeNameTaken(details.name.clone()));
            }
        }

        let mut records = Vec::with_capacity(batch.len());
        for details in batch {
            let employee = Employee {
                id: next_id(&self.ids)?,
                name: details.name,
                phone: details.phone,
                email: details.email,
                address: details.address,
            };
            records.push(to_record(&employee)?);
        }
        let count = records.len();
        self.db.bulk_insert(records, EMPLOYEE_TABLE).await?;
        tracing::info!(count, "employees imported");
        Ok(count)
    }

    pub async fn update(&self, id: i64, details: EmployeeDetails) -> Result<()> {
        let current = self.get_by_id(id).await?;
        if current.name != details.name {
            let taken = self
                .db
                .count(EMPLOYEE_TABLE, Some(Filter::eq("name", details.name.as_str())))
                .await?;
            if taken > 0 {
                msg_bail_anyhow!(Message::EmployeeNameTaken(details.name));
            }
        }

        self.db
            .update(id, to_record(&details)?, EMPLOYEE_TABLE)
            .await
            .map_err(|e| not_found_as(e, Message::EmployeeNotFound(id)))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Employee> {
        let record = self
            .db
            .get_by_id(id, Select::from(EMPLOYEE_TABLE))
            .await
            .map_err(|e| not_found_as(e, Message::EmployeeNotFound(id)))?;
        Ok(from_record(record)?)
    }

    /// Employees whose name or id contains `keyword`.
    pub async fn search(&self, keyword: &str) -> Result<Vec<Employee>> {
        let pattern = format!("%{}%", keyword);
        let select = Select::from(EMPLOYEE_TABLE)
            .filter(Filter::new("name LIKE ? OR id LIKE ?", vec![json!(pattern), json!(pattern)]))
            .order_by("id");
        decode_all(self.db.get_all(select).await?)
    }

    pub async fn list(&self, page: u64) -> Result<Page<Employee>> {
        let rows = self
            .db
            .paginate(page, self.page_size, Select::from(EMPLOYEE_TABLE).order_by("id"))
            .await?;
        let count = self.db.count(EMPLOYEE_TABLE, None).await?;
        Ok(Page {
            items: decode_all(rows)?,
            pages: pages(count, self.page_size),
        })
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.db
            .delete_by_id(id, EMPLOYEE_TABLE)
            .await
            .map_err(|e| not_found_as(e, Message::EmployeeNotFound(id)))
    }
}
