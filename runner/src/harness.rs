use crate::{
    config::BenchConfig,
    data::{BatchPlan, Generator},
    index::{IndexFamily, IndexLifecycle, LifecycleError, LifecycleState},
    loader::{self, LoadError, LoadReport},
    metrics::{self, AggregationError, Metrics},
    query::{self, timing::TimingExtractor, QueryTiming, QUERIES},
    schema::{self, Table},
    size::{self, IndexSizeReport, SizeError},
    store::{Store, StoreError},
};
use thiserror::Error;
use tracing::{error, info, instrument};

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Database operation failed")]
    Store(#[from] StoreError),
    #[error("Bulk load failed")]
    Load(#[from] LoadError),
    #[error("Index lifecycle violated")]
    Lifecycle(#[from] LifecycleError),
    #[error("Index size lookup failed")]
    Size(#[from] SizeError),
    #[error("Measurements could not be merged")]
    Aggregation(#[from] AggregationError),
    #[error("Run ended while {0}")]
    Incomplete(LifecycleState),
}

/// Everything measured while one index family was active
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyMeasurement {
    pub timings: QueryTiming,
    pub sizes: IndexSizeReport,
}

/// Recreate the tables and fill each of them with the configured workload
#[instrument(skip_all, level = "info")]
pub fn prepare<S: Store>(
    store: &mut S,
    config: &BenchConfig,
) -> Result<Vec<LoadReport>, HarnessError> {
    let workload = &config.workload;
    let plan = BatchPlan::new(workload.row_count, workload.batch_size);
    let mut generator = Generator::new(workload.seed);

    schema::reset(store)?;

    let mut reports = Vec::with_capacity(Table::ALL.len());
    for table in Table::ALL {
        reports.push(loader::load(
            store,
            &mut generator,
            table,
            plan,
            config.report.progress,
        )?);

        if workload.verify_counts {
            loader::verify(store, table, plan.total)?;
        }
    }

    Ok(reports)
}

/// Create `family`, run the query set, read the index sizes and drop `family` again
#[instrument(skip(store, lifecycle, extractor), level = "info")]
pub fn measure<S: Store>(
    store: &mut S,
    lifecycle: &mut IndexLifecycle,
    family: IndexFamily,
    extractor: &dyn TimingExtractor,
) -> Result<FamilyMeasurement, HarnessError> {
    lifecycle.create_family(store, family)?;

    let timings = query::run(store, extractor)?;
    // sizes have to be read before the drop below
    let sizes = size::family_sizes(store, family, &QUERIES)?;

    lifecycle.drop_family(store, family)?;

    Ok(FamilyMeasurement {
        timings,
        sizes,
    })
}

/// Run the full benchmark on `store`: load data, measure every index family in turn, merge
#[instrument(skip_all, level = "info")]
pub fn run<S: Store>(
    store: &mut S,
    config: &BenchConfig,
    extractor: &dyn TimingExtractor,
) -> Result<Metrics, HarnessError> {
    prepare(store, config)?;

    let mut lifecycle = IndexLifecycle::new();
    let mut measurements = Vec::with_capacity(IndexFamily::ORDER.len());
    for family in IndexFamily::ORDER {
        measurements.push(measure(store, &mut lifecycle, family, extractor)?);
    }

    if !lifecycle.is_complete() {
        error!(state = %lifecycle.state(), "Index lifecycle did not complete");

        return Err(HarnessError::Incomplete(lifecycle.state()));
    }

    let (btree, gin) = match measurements.as_slice() {
        [btree, gin] => (btree, gin),
        _ => return Err(HarnessError::Incomplete(lifecycle.state())),
    };
    let metrics = metrics::merge(&btree.timings, &gin.timings, &btree.sizes, &gin.sizes)?;

    info!(queries = metrics.len(), "Benchmark finished");

    Ok(metrics)
}

#[cfg(test)]
#[path = "harness_test.rs"]
mod harness_test;
