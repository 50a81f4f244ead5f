use crate::{
    schema::Table,
    store::{Store, StoreError},
};
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use thiserror::Error;
use tracing::{debug, error, info, instrument};

/// Indexing strategy under test, each maps to one index per table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexFamily {
    BTree,
    Gin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDefinition {
    pub name: &'static str,
    pub table: Table,
    pub family: IndexFamily,
    method: &'static str,
    expression: &'static str,
}

pub const BTREE_INDEXES: [IndexDefinition; 3] = [
    IndexDefinition {
        name: "idx_profile_btree",
        table: Table::Users,
        family: IndexFamily::BTree,
        method: "btree",
        expression: "profile",
    },
    IndexDefinition {
        name: "idx_tags_btree",
        table: Table::Articles,
        family: IndexFamily::BTree,
        method: "btree",
        expression: "tags",
    },
    IndexDefinition {
        name: "idx_content_btree",
        table: Table::Documents,
        family: IndexFamily::BTree,
        method: "btree",
        expression: "content",
    },
];

pub const GIN_INDEXES: [IndexDefinition; 3] = [
    IndexDefinition {
        name: "idx_profile_gin",
        table: Table::Users,
        family: IndexFamily::Gin,
        method: "gin",
        expression: "profile jsonb_path_ops",
    },
    IndexDefinition {
        name: "idx_tags_gin",
        table: Table::Articles,
        family: IndexFamily::Gin,
        method: "gin",
        expression: "tags",
    },
    IndexDefinition {
        name: "idx_content_gin",
        table: Table::Documents,
        family: IndexFamily::Gin,
        method: "gin",
        expression: "to_tsvector('english', content)",
    },
];

const SQL_INDEX_EXISTS: &str =
    "select count(*) from pg_indexes where schemaname = current_schema() and indexname = $1";

impl IndexFamily {
    /// order in which a run measures the families
    pub const ORDER: [IndexFamily; 2] = [IndexFamily::BTree, IndexFamily::Gin];

    pub fn indexes(self) -> &'static [IndexDefinition; 3] {
        match self {
            Self::BTree => &BTREE_INDEXES,
            Self::Gin => &GIN_INDEXES,
        }
    }

    pub fn index_on(self, table: Table) -> &'static IndexDefinition {
        &self.indexes()[table as usize]
    }

    pub fn drop_sql(self) -> String {
        format!(
            "drop index if exists {};",
            self.indexes().iter().map(|index| index.name).join(", ")
        )
    }

    fn next(self) -> Option<IndexFamily> {
        Self::ORDER
            .iter()
            .skip_while(|family| **family != self)
            .nth(1)
            .copied()
    }
}

impl Display for IndexFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::BTree => "B-tree",
            Self::Gin => "GIN",
        })
    }
}

impl IndexDefinition {
    pub fn create_sql(&self) -> String {
        format!(
            "create index {} on {} using {} ({});",
            self.name, self.table, self.method, self.expression
        )
    }
}

/// Where a run stands in `Pending -> Active(B-tree) -> Measured(B-tree) -> Active(GIN) -> Measured(GIN)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Pending,
    Active(IndexFamily),
    Measured(IndexFamily),
}

impl Display for LifecycleState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str("no index family was created yet"),
            Self::Active(family) => write!(f, "{family} indexes are active"),
            Self::Measured(family) => write!(f, "{family} indexes were measured and dropped"),
        }
    }
}

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Cannot create {family} indexes, {state}")]
    IllegalTransition {
        family: IndexFamily,
        state: LifecycleState,
    },
    #[error("Index {0} already exists")]
    AlreadyExists(&'static str),
    #[error("Database query failed")]
    Store(#[from] StoreError),
}

/// Guards that at most one index family exists on the tables at any time
#[derive(Debug)]
pub struct IndexLifecycle {
    state: LifecycleState,
}

impl Default for IndexLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexLifecycle {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Pending,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// family that may be created next, `None` while one is active or all were measured
    pub fn expected(&self) -> Option<IndexFamily> {
        match self.state {
            LifecycleState::Pending => IndexFamily::ORDER.first().copied(),
            LifecycleState::Active(_) => None,
            LifecycleState::Measured(family) => family.next(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == LifecycleState::Measured(IndexFamily::ORDER[IndexFamily::ORDER.len() - 1])
    }

    /// Create all three indexes of `family`.
    ///
    /// Fails without touching the store if `family` is not the next one in the run, and
    /// fails before creating anything if an index of any family is already present. When one
    /// of the statements fails, the indexes of `family` created before it are dropped again.
    #[instrument(skip(self, store), level = "info")]
    pub fn create_family<S: Store>(
        &mut self,
        store: &mut S,
        family: IndexFamily,
    ) -> Result<(), LifecycleError> {
        if self.expected() != Some(family) {
            error!(state = %self.state, "Refusing to create {family} indexes");

            return Err(LifecycleError::IllegalTransition {
                family,
                state: self.state,
            });
        }

        for index in IndexFamily::ORDER
            .iter()
            .flat_map(|family| family.indexes().iter())
        {
            if store.query_scalar(SQL_INDEX_EXISTS, &[index.name])?.unwrap_or(0) > 0 {
                error!(index = index.name, "Index is already present, aborting");

                return Err(LifecycleError::AlreadyExists(index.name));
            }
        }

        info!("Creating {family} indexes...");
        for index in family.indexes() {
            if let Err(error) = store.execute(&index.create_sql()) {
                error!(error = ?error, index = index.name, "Failed to create index: {error}");
                // the family is created completely or not at all
                if let Err(cleanup) = store.execute(&family.drop_sql()) {
                    error!(error = ?cleanup, "Failed to drop partially created {family} indexes");
                }

                return Err(error.into());
            }
            debug!(index = index.name, table = %index.table, "Created index");
        }
        self.state = LifecycleState::Active(family);
        info!("{family} indexes created");

        Ok(())
    }

    /// Drop all three indexes of `family`, absent indexes are skipped
    #[instrument(skip(self, store), level = "info")]
    pub fn drop_family<S: Store>(
        &mut self,
        store: &mut S,
        family: IndexFamily,
    ) -> Result<(), LifecycleError> {
        store.execute(&family.drop_sql())?;

        if self.state == LifecycleState::Active(family) {
            self.state = LifecycleState::Measured(family);
        }
        info!("{family} indexes dropped");

        Ok(())
    }
}

#[cfg(test)]
#[path = "index_test.rs"]
mod index_test;
