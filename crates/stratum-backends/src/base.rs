//! The database backend abstraction.

use stratum_core::error::{StratumError, StratumResult};
use stratum_schema::value::Value;

/// A single result row: column names paired with values.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a row from parallel column/value vectors.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Returns the value for the named column.
    pub fn get(&self, column: &str) -> StratumResult<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
            .ok_or_else(|| StratumError::DatabaseError(format!("Missing column '{column}'")))
    }

    /// Returns the named column as a string slice.
    ///
    /// Fails if the column is missing or not a string.
    pub fn get_str(&self, column: &str) -> StratumResult<&str> {
        match self.get(column)? {
            Value::String(s) => Ok(s),
            other => Err(StratumError::DatabaseError(format!(
                "Column '{column}' is not a string (got {other})"
            ))),
        }
    }

    /// Returns the column names of this row.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// A synchronous database connection capable of executing migration SQL.
///
/// Implementations must be safe to share across threads; the engine itself
/// only ever drives a backend from one thread at a time.
pub trait DatabaseBackend: Send + Sync {
    /// Returns the backend vendor name (e.g. `"sqlite"`).
    fn vendor(&self) -> &'static str;

    /// Executes a single statement, discarding any result rows.
    fn execute(&self, sql: &str) -> StratumResult<()>;

    /// Runs a query and returns all result rows.
    fn query(&self, sql: &str) -> StratumResult<Vec<Row>>;
}
