use crate::{query::QueryTiming, size::IndexSizeReport};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};
use thiserror::Error;
use tracing::{debug, error};

/// Timing and index size of one query under one index family
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// execution time in ms, `None` when it could not be extracted
    pub time: Option<f64>,
    /// index size in MB
    pub size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsEntry {
    pub btree: Measurement,
    pub gin: Measurement,
    #[serde(default)]
    pub speedup: Option<f64>,
}

/// map of query name -> paired measurements in query set order, the content of the metrics file
pub type Metrics = IndexMap<String, MetricsEntry>;

#[derive(Error, Debug)]
pub enum AggregationError {
    #[error("Query {query} is missing from the {set}")]
    MissingQuery { query: String, set: &'static str },
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Failed to access metrics file")]
    Io(#[from] std::io::Error),
    #[error("Failed to (de)serialize metrics")]
    Json(#[from] serde_json::Error),
}

/// B-tree time over GIN time, 0 for a GIN time of 0
pub fn speedup(btree_time: f64, gin_time: f64) -> f64 {
    if gin_time == 0.0 {
        0.0
    } else {
        btree_time / gin_time
    }
}

fn lookup<T: Copy>(
    set: &'static str,
    map: &IndexMap<String, T>,
    query: &str,
) -> Result<T, AggregationError> {
    map.get(query).copied().ok_or_else(|| {
        error!(query, set, "Measurement sets do not cover the same queries");

        AggregationError::MissingQuery {
            query: query.to_owned(),
            set,
        }
    })
}

/// Pair the per family measurements of every query.
///
/// All four inputs have to name the same queries, a query missing from any of them is an
/// error rather than a zero. Entries keep the order of the B-tree timings.
pub fn merge(
    btree_timings: &QueryTiming,
    gin_timings: &QueryTiming,
    btree_sizes: &IndexSizeReport,
    gin_sizes: &IndexSizeReport,
) -> Result<Metrics, AggregationError> {
    btree_timings
        .keys()
        .chain(gin_timings.keys())
        .chain(btree_sizes.keys())
        .chain(gin_sizes.keys())
        .unique()
        .map(|query| -> Result<(String, MetricsEntry), AggregationError> {
            let btree = Measurement {
                time: lookup("B-tree timings", btree_timings, query)?,
                size: lookup("B-tree sizes", btree_sizes, query)?,
            };
            let gin = Measurement {
                time: lookup("GIN timings", gin_timings, query)?,
                size: lookup("GIN sizes", gin_sizes, query)?,
            };
            let ratio = btree
                .time
                .zip(gin.time)
                .map(|(btree_time, gin_time)| speedup(btree_time, gin_time));

            debug!(query = %query, speedup = ?ratio, "Merged measurements");

            Ok((
                query.clone(),
                MetricsEntry {
                    btree,
                    gin,
                    speedup: ratio,
                },
            ))
        })
        .collect()
}

/// Write `metrics` as JSON indented by four spaces
pub fn save(path: &Path, metrics: &Metrics) -> Result<(), PersistError> {
    let writer = BufWriter::new(File::create(path)?);
    let mut serializer =
        serde_json::Serializer::with_formatter(writer, PrettyFormatter::with_indent(b"    "));
    metrics.serialize(&mut serializer)?;

    let mut writer = serializer.into_inner();
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}

pub fn load(path: &Path) -> Result<Metrics, PersistError> {
    let reader = BufReader::new(File::open(path)?);

    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
#[path = "metrics_test.rs"]
mod metrics_test;
