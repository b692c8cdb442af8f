//! Structured SQL statement builder.
//!
//! Statements are assembled from clause objects. Table names, column names,
//! join clauses and predicate fragments are structural and come from trusted
//! call sites inside the crate; every value travels separately as a bound
//! parameter and is never written into the SQL text.
//!
//! ## Usage
//!
//! ```rust
//! use attend::db::query::{Combinator, Criteria, Select};
//!
//! let statement = Select::from("employees")
//!     .filter(Criteria::new().like("name", "ali").eq("phone", "555").to_filter(Combinator::Or))
//!     .order_by("id")
//!     .build();
//!
//! assert_eq!(statement.sql, "SELECT * FROM employees WHERE name LIKE ? OR phone = ? ORDER BY id");
//! ```

use super::value::Record;
use serde_json::Value;
use std::fmt;

/// SQL text together with the values bound to its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self { sql: sql.into(), params }
    }
}

/// A predicate fragment (without the `WHERE` keyword) and its bound values.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub clause: String,
    pub params: Vec<Value>,
}

impl Filter {
    pub fn new(clause: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            clause: clause.into(),
            params,
        }
    }

    /// `column = ?`
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Self::new(format!("{} = ?", column), vec![value.into()])
    }

    /// Both predicates must hold.
    pub fn and(mut self, other: Filter) -> Self {
        self.clause = format!("({}) AND ({})", self.clause, other.clause);
        self.params.extend(other.params);
        self
    }

    fn is_empty(&self) -> bool {
        self.clause.trim().is_empty()
    }
}

/// How a search compares a column with its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    /// Substring match; the value is wrapped in `%` on both sides.
    Like,
}

/// Logical connective applied uniformly across all criteria of one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::And => write!(f, "AND"),
            Combinator::Or => write!(f, "OR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub column: String,
    pub value: Value,
    pub operator: Operator,
}

/// Ordered column match specifications for [`Db::search`](crate::db::db::Db::search).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    entries: Vec<Criterion>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: impl Into<Value>, operator: Operator) -> Self {
        self.entries.push(Criterion {
            column: column.to_string(),
            value: value.into(),
            operator,
        });
        self
    }

    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.with(column, value, Operator::Eq)
    }

    pub fn like(self, column: &str, value: impl Into<Value>) -> Self {
        self.with(column, value, Operator::Like)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the criteria as one predicate joined by `combinator`.
    pub fn to_filter(&self, combinator: Combinator) -> Filter {
        let mut conditions = Vec::with_capacity(self.entries.len());
        let mut params = Vec::with_capacity(self.entries.len());

        for criterion in &self.entries {
            match criterion.operator {
                Operator::Eq => {
                    conditions.push(format!("{} = ?", criterion.column));
                    params.push(criterion.value.clone());
                }
                Operator::Like => {
                    conditions.push(format!("{} LIKE ?", criterion.column));
                    params.push(Value::String(format!("%{}%", like_text(&criterion.value))));
                }
            }
        }

        Filter::new(conditions.join(&format!(" {} ", combinator)), params)
    }
}

fn like_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `SELECT <columns> FROM <table> <joins> [WHERE ..] [ORDER BY ..] [LIMIT ? OFFSET ?]`
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    table: String,
    columns: String,
    joins: Vec<String>,
    filter: Option<Filter>,
    order_by: Option<String>,
    page: Option<(u64, u64)>,
}

impl Select {
    pub fn from(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: "*".to_string(),
            joins: Vec::new(),
            filter: None,
            order_by: None,
            page: None,
        }
    }

    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = columns.to_string();
        self
    }

    pub fn join(mut self, join: &str) -> Self {
        self.joins.push(join.to_string());
        self
    }

    /// Adds a predicate; repeated calls are combined with `AND`.
    pub fn filter(mut self, filter: Filter) -> Self {
        if filter.is_empty() {
            return self;
        }
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        self
    }

    fn filter_opt(self, filter: Option<Filter>) -> Self {
        match filter {
            Some(filter) => self.filter(filter),
            None => self,
        }
    }

    pub fn order_by(mut self, order_by: &str) -> Self {
        self.order_by = Some(order_by.to_string());
        self
    }

    /// Appends `LIMIT ? OFFSET ?` with both values bound.
    pub fn paginated(mut self, limit: u64, offset: u64) -> Self {
        self.page = Some((limit, offset));
        self
    }

    pub fn build(self) -> Statement {
        let mut sql = format!("SELECT {} FROM {}", self.columns, self.table);
        let mut params = Vec::new();

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        if let Some(filter) = self.filter {
            sql.push_str(" WHERE ");
            sql.push_str(&filter.clause);
            params.extend(filter.params);
        }
        if let Some(order_by) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }
        if let Some((limit, offset)) = self.page {
            sql.push_str(" LIMIT ? OFFSET ?");
            params.push(Value::from(limit));
            params.push(Value::from(offset));
        }

        Statement { sql, params }
    }
}

/// `INSERT INTO <table> (<cols>) VALUES (?, ..)` over a record's own fields.
pub fn insert(table: &str, record: &Record) -> Statement {
    let columns: Vec<&str> = record.keys().map(String::as_str).collect();
    let placeholders = vec!["?"; columns.len()].join(", ");

    Statement {
        sql: format!("INSERT INTO {} ({}) VALUES ({})", table, columns.join(", "), placeholders),
        params: record.values().cloned().collect(),
    }
}

/// `UPDATE <table> SET <col> = ?, .. WHERE <key> = ?`
pub fn update(table: &str, record: &Record, key: &str, key_value: Value) -> Statement {
    let assignments: Vec<String> = record.keys().map(|column| format!("{} = ?", column)).collect();
    let mut params: Vec<Value> = record.values().cloned().collect();
    params.push(key_value);

    Statement {
        sql: format!("UPDATE {} SET {} WHERE {} = ?", table, assignments.join(", "), key),
        params,
    }
}

/// `DELETE FROM <table> WHERE <filter>`
pub fn delete(table: &str, filter: Filter) -> Statement {
    let sql = if filter.is_empty() {
        format!("DELETE FROM {}", table)
    } else {
        format!("DELETE FROM {} WHERE {}", table, filter.clause)
    };
    Statement { sql, params: filter.params }
}

/// `SELECT COUNT(*) AS count FROM <table> [WHERE ..]`
pub fn count(table: &str, filter: Option<Filter>) -> Statement {
    Select::from(table).columns("COUNT(*) AS count").filter_opt(filter).build()
}

/// `SELECT SUM(<column>) AS total FROM <table>`
pub fn sum(column: &str, table: &str) -> Statement {
    Select::from(table).columns(&format!("SUM({}) AS total", column)).build()
}
