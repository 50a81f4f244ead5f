use crate::store::{Store, StoreError};
use std::fmt::{Display, Formatter};
use tracing::{error, info, instrument};

/// The three fixed benchmark tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Table {
    Users,
    Articles,
    Documents,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Users, Table::Articles, Table::Documents];

    pub fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Articles => "articles",
            Self::Documents => "documents",
        }
    }

    /// columns filled by the bulk loader, `id` is left to its sequence
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Users => &["name", "profile"],
            Self::Articles => &["title", "tags"],
            Self::Documents => &["content"],
        }
    }

    pub fn definition(self) -> &'static str {
        SQL_SCHEMA[self as usize]
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub const SQL_DROP_TABLES: &str = "drop table if exists users, articles, documents;";

// ref: https://www.postgresql.org/docs/current/datatype-json.html
//      https://www.postgresql.org/docs/current/arrays.html
pub const SQL_SCHEMA: [&str; 3] = [
    "create table users (
    id serial primary key,
    name text,
    profile jsonb
);",
    "create table articles (
    id serial primary key,
    title text,
    tags text[]
);",
    "create table documents (
    id serial primary key,
    content text
);",
];
pub const SQL_SCHEMA_NUMBER: usize = SQL_SCHEMA.len();

/// Drop the benchmark tables, together with every index on them, and create them again
#[instrument(skip(store), level = "info")]
pub fn reset<S: Store>(store: &mut S) -> Result<(), StoreError> {
    store.execute(SQL_DROP_TABLES)?;

    for (counter, table) in Table::ALL.iter().enumerate() {
        match store.execute(table.definition()) {
            Ok(()) => info!(
                "Applied SQL schema ({}/{SQL_SCHEMA_NUMBER}) for {table}",
                counter + 1
            ),
            Err(error) => {
                error!(
                    error = ?error,
                    table = %table,
                    "Failed to apply SQL schema ({}/{SQL_SCHEMA_NUMBER}): {error}",
                    counter + 1
                );

                return Err(error);
            }
        }
    }

    info!("Tables created");

    Ok(())
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod schema_test;
