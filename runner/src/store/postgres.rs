use super::{InsertBatch, Store, StoreError, Value};
use crate::config::DatabaseConfig;
use postgres::{
    error::SqlState,
    types::ToSql,
    Client, NoTls, SimpleQueryMessage,
};
use tracing::{debug, error, info, trace};

/// Store backed by a single synchronous PostgreSQL session
pub struct PostgresStore {
    client: Client,
}

fn describe(error: &postgres::Error) -> String {
    error
        .as_db_error()
        .map(|db_error| db_error.message().to_owned())
        .unwrap_or_else(|| error.to_string())
}

/// sort driver errors into the conflict and missing object classes the harness reacts to
fn classify(error: postgres::Error) -> StoreError {
    match error.code().cloned() {
        Some(code)
            if code == SqlState::DUPLICATE_TABLE
                || code == SqlState::DUPLICATE_OBJECT
                || code == SqlState::UNIQUE_VIOLATION =>
        {
            StoreError::Conflict(describe(&error))
        }
        Some(code) if code == SqlState::UNDEFINED_TABLE || code == SqlState::UNDEFINED_OBJECT => {
            StoreError::UndefinedObject(describe(&error))
        }
        _ => StoreError::Postgres(error),
    }
}

fn as_sql(value: &Value) -> &(dyn ToSql + Sync) {
    match value {
        Value::Text(text) => text,
        Value::Json(document) => document,
        Value::TextArray(array) => array,
    }
}

impl PostgresStore {
    pub fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let mut pg_config = postgres::Config::new();
        pg_config
            .host(&config.host)
            .port(config.port)
            .dbname(&config.database)
            .user(&config.user);

        if let Some(password) = &config.password {
            pg_config.password(password);
        }
        if let Some(application_name) = &config.application_name {
            pg_config.application_name(application_name);
        }

        match pg_config.connect(NoTls) {
            Ok(client) => {
                info!(
                    host = %config.host,
                    port = config.port,
                    database = %config.database,
                    "Connected to PostgreSQL"
                );

                Ok(Self { client })
            }
            Err(error) => {
                error!(
                    error = ?error,
                    host = %config.host,
                    database = %config.database,
                    "Failed to connect to PostgreSQL: {error}"
                );

                Err(StoreError::Connect(error))
            }
        }
    }
}

impl Store for PostgresStore {
    fn execute(&mut self, sql: &str) -> Result<(), StoreError> {
        debug!("Executing {sql}");

        self.client.batch_execute(sql).map_err(classify)
    }

    fn query_text(&mut self, sql: &str) -> Result<Vec<String>, StoreError> {
        trace!("Querying {sql}");

        // the simple query protocol hands every column back as text, json plans included
        let messages = self.client.simple_query(sql).map_err(classify)?;

        Ok(messages
            .iter()
            .filter_map(|message| match message {
                SimpleQueryMessage::Row(row) => Some(row.get(0).unwrap_or_default().to_owned()),
                _ => None,
            })
            .collect())
    }

    fn query_scalar(&mut self, sql: &str, params: &[&str]) -> Result<Option<i64>, StoreError> {
        let params = params
            .iter()
            .map(|param| param as &(dyn ToSql + Sync))
            .collect::<Vec<_>>();

        match self.client.query_opt(sql, &params).map_err(classify)? {
            Some(row) => row.try_get::<_, Option<i64>>(0).map_err(classify),
            None => Ok(None),
        }
    }

    fn commit_batch(&mut self, batch: &InsertBatch) -> Result<u64, StoreError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let statement = batch.statement();
        let params = batch.rows.iter().flatten().map(as_sql).collect::<Vec<_>>();

        // dropping an uncommitted transaction rolls the whole batch back
        let mut transaction = self.client.transaction().map_err(classify)?;
        let inserted = transaction
            .execute(statement.as_str(), &params)
            .map_err(classify)?;
        transaction.commit().map_err(classify)?;

        debug!(table = batch.table, rows = inserted, "Committed batch");

        Ok(inserted)
    }

    fn close(self) -> Result<(), StoreError> {
        match self.client.close() {
            Ok(()) => {
                info!("Closed PostgreSQL connection");

                Ok(())
            }
            Err(error) => {
                error!(error = ?error, "Failed to close PostgreSQL connection: {error}");

                Err(StoreError::Postgres(error))
            }
        }
    }
}
