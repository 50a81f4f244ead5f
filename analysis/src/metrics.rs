//! Read side of the metrics file written by `ginbench`.
//!
//! Only the fields the chart needs are modelled, anything else in the file is ignored.

use indexmap::IndexMap;
use serde::Deserialize;
use std::{
    fs::File,
    io::{BufReader, ErrorKind},
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Metrics file {0:?} does not exist")]
    NotFound(PathBuf),
    #[error("Failed to read metrics file")]
    Io(#[from] std::io::Error),
    #[error("Metrics file is not valid")]
    Decode(#[from] serde_json::Error),
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub time: Option<f64>,
    pub size: f64,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MetricsEntry {
    pub btree: Measurement,
    pub gin: Measurement,
    #[serde(default)]
    pub speedup: Option<f64>,
}

/// query name -> measurements, in the order of the file
pub type Metrics = IndexMap<String, MetricsEntry>;

pub fn load(path: &Path) -> Result<Metrics, LoadError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            return Err(LoadError::NotFound(path.to_path_buf()))
        }
        Err(error) => return Err(error.into()),
    };

    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// largest execution time of either family, `None` if no query carries a timing
pub fn max_time(metrics: &Metrics) -> Option<f64> {
    metrics
        .values()
        .flat_map(|entry| [entry.btree.time, entry.gin.time])
        .flatten()
        .reduce(f64::max)
}

#[cfg(test)]
#[path = "metrics_test.rs"]
mod metrics_test;
