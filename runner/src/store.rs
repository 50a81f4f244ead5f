#[cfg(test)]
pub mod memory;
pub mod postgres;

use itertools::Itertools;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to connect to the database")]
    Connect(#[source] ::postgres::Error),
    #[error("Conflicting database object: {0}")]
    Conflict(String),
    #[error("Undefined database object: {0}")]
    UndefinedObject(String),
    #[error("Database query failed")]
    Postgres(#[from] ::postgres::Error),
}

/// A single column value of a synthetic row
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Json(serde_json::Value),
    TextArray(Vec<String>),
}

/// Rows for one table that are inserted and committed together
#[derive(Debug, Clone, PartialEq)]
pub struct InsertBatch {
    pub table: &'static str,
    pub columns: &'static [&'static str],
    pub rows: Vec<Vec<Value>>,
}

impl InsertBatch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// multi row insert with one positional parameter per value, in row major order
    pub fn statement(&self) -> String {
        let width = self.columns.len();
        let values = (0..self.rows.len())
            .map(|row| {
                format!(
                    "({})",
                    (1..=width)
                        .map(|column| format!("${}", row * width + column))
                        .join(", ")
                )
            })
            .join(", ");

        format!(
            "insert into {} ({}) values {values}",
            self.table,
            self.columns.join(", ")
        )
    }
}

/// The session the harness threads through every component.
///
/// Implementations are expected to be strictly sequential, every call runs to completion
/// before it returns.
pub trait Store {
    /// run one or more statements outside of an explicit transaction
    fn execute(&mut self, sql: &str) -> Result<(), StoreError>;

    /// first column of every returned row, as text
    fn query_text(&mut self, sql: &str) -> Result<Vec<String>, StoreError>;

    /// a single nullable bigint, `None` for a SQL `NULL` or an empty result
    fn query_scalar(&mut self, sql: &str, params: &[&str]) -> Result<Option<i64>, StoreError>;

    /// insert all rows of `batch` in one transaction and commit it, returns the inserted rows
    fn commit_batch(&mut self, batch: &InsertBatch) -> Result<u64, StoreError>;

    fn close(self) -> Result<(), StoreError>
    where
        Self: Sized;
}

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;
