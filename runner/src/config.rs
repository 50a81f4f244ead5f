use crate::schema::Table;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::{fs::File, io::Error, num::NonZeroU64, path::Path, path::PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

/// upper bound of bind parameters in a single statement of the PostgreSQL wire protocol
pub const MAX_BIND_PARAMETERS: u64 = u16::MAX as u64;

pub const DEFAULT_ROW_COUNT: u64 = 1_000_000;
pub const DEFAULT_BATCH_SIZE: NonZeroU64 = match NonZeroU64::new(10_000) {
    Some(size) => size,
    None => panic!("default batch size must not be zero"),
};

#[derive(Error, Debug)]
pub enum ConfigErrors {
    #[error("Failed to read configuration file")]
    FileNotReadable(#[from] Error),
    #[error("Configuration is not valid")]
    InvalidConfig(#[from] serde_yaml::Error),
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct BenchConfig {
    #[serde(alias = "db", default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub workload: WorkloadConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(alias = "dbname", default = "default_database")]
    pub database: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_application_name")]
    pub application_name: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct WorkloadConfig {
    // total synthetic rows per table
    #[serde(alias = "rowCount", default = "default_row_count")]
    pub row_count: u64,
    // rows per insert and commit
    #[serde(alias = "batchSize", default = "default_batch_size")]
    pub batch_size: NonZeroU64,
    // fixed seed for reproducible data, entropy otherwise
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_true")]
    pub verify_counts: bool,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_true")]
    pub save: bool,
    #[serde(default)]
    pub plan_format: PlanFormat,
    #[serde(default = "default_true")]
    pub progress: bool,
}

/// Output format requested from `EXPLAIN ANALYZE`
#[derive(Deserialize, Serialize, ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlanFormat {
    #[default]
    Text,
    Json,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: default_database(),
            user: default_user(),
            password: None,
            application_name: default_application_name(),
        }
    }
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            row_count: default_row_count(),
            batch_size: default_batch_size(),
            seed: None,
            verify_counts: true,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            save: true,
            plan_format: PlanFormat::default(),
            progress: true,
        }
    }
}

impl BenchConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigErrors> {
        let file = File::open(path)?;

        Ok(serde_yaml::from_reader(file)?)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigErrors> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Report all configuration problems at once, returns true if any of them is fatal
    pub fn preflight_checks(&self) -> bool {
        // attempt to catch all errors instead of piece-by-piece to make debugging easier for users
        let mut contains_error = false;
        let workload = &self.workload;

        let widest = Table::ALL
            .iter()
            .map(|table| table.columns().len() as u64)
            .max()
            .unwrap_or(1);
        if workload.batch_size.get().saturating_mul(widest) > MAX_BIND_PARAMETERS {
            error!(
                "workload.batch_size ({}) needs {} bind parameters per insert, PostgreSQL accepts at most {MAX_BIND_PARAMETERS}",
                workload.batch_size,
                workload.batch_size.get().saturating_mul(widest)
            );
            contains_error = true;
        }

        if workload.row_count == 0 {
            warn!("workload.row_count is 0, all tables will stay empty");
        } else if workload.row_count % workload.batch_size.get() != 0 {
            info!(
                "workload.row_count ({}) is not a multiple of workload.batch_size ({}), the last batch holds {} rows",
                workload.row_count,
                workload.batch_size,
                workload.row_count % workload.batch_size.get()
            );
        }

        if self.database.host.is_empty() {
            error!("database.host must not be empty");
            contains_error = true;
        }

        if self.database.database.is_empty() {
            error!("database.database must not be empty");
            contains_error = true;
        }

        if self.report.save && self.report.output.as_os_str().is_empty() {
            error!("report.output must be a path when report.save is set");
            contains_error = true;
        }

        contains_error
    }
}

fn default_host() -> String {
    "localhost".to_owned()
}

fn default_port() -> u16 {
    5432
}

fn default_database() -> String {
    "test".to_owned()
}

fn default_user() -> String {
    std::env::var("USER").unwrap_or_else(|_| "postgres".to_owned())
}

fn default_application_name() -> Option<String> {
    Some("ginbench".to_owned())
}

fn default_row_count() -> u64 {
    DEFAULT_ROW_COUNT
}

fn default_batch_size() -> NonZeroU64 {
    DEFAULT_BATCH_SIZE
}

fn default_output() -> PathBuf {
    PathBuf::from("metrics.json")
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
