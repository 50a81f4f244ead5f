use crate::{
    data::{BatchPlan, Generator},
    schema::Table,
    store::{Store, StoreError},
};
use kdam::BarExt;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to commit batch {batch} into {table}")]
    Batch {
        table: Table,
        batch: u64,
        #[source]
        source: StoreError,
    },
    #[error("Expected {expected} rows in {table} but found {found}")]
    RowCount {
        table: Table,
        expected: u64,
        found: i64,
    },
    #[error("Failed to count rows")]
    Count(#[from] StoreError),
    #[error("Failed to draw progress bar")]
    Progress(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub table: Table,
    pub batches: u64,
    pub rows: u64,
}

/// Generate and insert `plan.total` rows into `table`, committing once per batch.
///
/// Only one batch is materialized at a time. The first failing batch aborts the load, every
/// batch before it stays committed and nothing of the failing one is kept.
#[instrument(skip(store, generator, plan), fields(rows = plan.total), level = "info")]
pub fn load<S: Store>(
    store: &mut S,
    generator: &mut Generator,
    table: Table,
    plan: BatchPlan,
    progress: bool,
) -> Result<LoadReport, LoadError> {
    info!("Inserting {} {table}...", plan.total);

    let mut bar = progress.then(|| kdam::Bar::new(plan.batches() as usize));
    let mut report = LoadReport {
        table,
        batches: 0,
        rows: 0,
    };

    for rows in plan.iter() {
        let batch = generator.batch(table, rows);

        match store.commit_batch(&batch) {
            Ok(inserted) => {
                report.batches += 1;
                report.rows += inserted;
                debug!(batch = report.batches, rows = inserted, "Committed batch");
            }
            Err(source) => {
                error!(
                    error = ?source,
                    table = %table,
                    batch = report.batches + 1,
                    "Failed to commit batch, aborting: {source}"
                );

                return Err(LoadError::Batch {
                    table,
                    batch: report.batches + 1,
                    source,
                });
            }
        }

        if let Some(bar) = bar.as_mut() {
            bar.update(1)?;
        }
    }

    if let Some(mut bar) = bar {
        bar.clear()?;
    }

    info!(
        batches = report.batches,
        rows = report.rows,
        "Inserted {table}"
    );

    Ok(report)
}

/// Check that `table` holds exactly `expected` rows
pub fn verify<S: Store>(store: &mut S, table: Table, expected: u64) -> Result<(), LoadError> {
    let found = store
        .query_scalar(&format!("select count(*) from {table}"), &[])?
        .unwrap_or(0);

    if u64::try_from(found).ok() == Some(expected) {
        debug!(table = %table, rows = found, "Verified row count");

        Ok(())
    } else {
        error!(table = %table, expected, found, "Row count does not match the workload");

        Err(LoadError::RowCount {
            table,
            expected,
            found,
        })
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod loader_test;
