//! SQLite backend over `rusqlite`.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use stratum_core::error::{StratumError, StratumResult};
use stratum_schema::value::Value;

use crate::base::{DatabaseBackend, Row};

/// A SQLite database connection.
///
/// The connection is mutex-guarded so the backend satisfies `Send + Sync`;
/// migration execution itself is single-threaded.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Opens (creating if necessary) a database file.
    pub fn open(path: impl AsRef<Path>) -> StratumResult<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| StratumError::DatabaseError(format!("Cannot open database: {e}")))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a new in-memory database.
    pub fn memory() -> StratumResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            StratumError::DatabaseError(format!("Cannot open in-memory database: {e}"))
        })?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StratumResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StratumError::DatabaseError("SQLite connection poisoned".into()))
    }
}

impl DatabaseBackend for SqliteBackend {
    fn vendor(&self) -> &'static str {
        "sqlite"
    }

    fn execute(&self, sql: &str) -> StratumResult<()> {
        let conn = self.lock()?;
        tracing::trace!(sql, "executing");
        conn.execute_batch(sql)
            .map_err(|e| StratumError::DatabaseError(format!("{e} (while executing: {sql})")))
    }

    fn query(&self, sql: &str) -> StratumResult<Vec<Row>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| StratumError::DatabaseError(format!("{e} (while preparing: {sql})")))?;
        let columns: Vec<String> = stmt.column_names().iter().map(ToString::to_string).collect();

        let mut rows = Vec::new();
        let mut raw = stmt
            .query([])
            .map_err(|e| StratumError::DatabaseError(e.to_string()))?;
        while let Some(row) = raw
            .next()
            .map_err(|e| StratumError::DatabaseError(e.to_string()))?
        {
            let mut values = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                let value = match row
                    .get_ref(idx)
                    .map_err(|e| StratumError::DatabaseError(e.to_string()))?
                {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(i) => Value::Int(i),
                    ValueRef::Real(f) => Value::Float(f),
                    ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
                    ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
                };
                values.push(value);
            }
            rows.push(Row::new(columns.clone(), values));
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor() {
        let backend = SqliteBackend::memory().unwrap();
        assert_eq!(backend.vendor(), "sqlite");
    }

    #[test]
    fn test_execute_and_query() {
        let backend = SqliteBackend::memory().unwrap();
        backend
            .execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)")
            .unwrap();
        backend
            .execute("INSERT INTO t (name) VALUES ('alpha'), ('beta')")
            .unwrap();

        let rows = backend.query("SELECT id, name FROM t ORDER BY id").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("id").unwrap(), &Value::Int(1));
        assert_eq!(rows[0].get_str("name").unwrap(), "alpha");
        assert_eq!(rows[1].get_str("name").unwrap(), "beta");
    }

    #[test]
    fn test_execute_invalid_sql() {
        let backend = SqliteBackend::memory().unwrap();
        let err = backend.execute("NOT SQL").unwrap_err();
        assert!(err.to_string().contains("NOT SQL"));
    }

    #[test]
    fn test_query_null_and_blob() {
        let backend = SqliteBackend::memory().unwrap();
        backend.execute("CREATE TABLE t (a TEXT, b BLOB)").unwrap();
        backend
            .execute("INSERT INTO t VALUES (NULL, x'0102')")
            .unwrap();
        let rows = backend.query("SELECT a, b FROM t").unwrap();
        assert_eq!(rows[0].get("a").unwrap(), &Value::Null);
        assert_eq!(rows[0].get("b").unwrap(), &Value::Bytes(vec![1, 2]));
    }
}
