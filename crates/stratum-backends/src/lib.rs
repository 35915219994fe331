//! # stratum-backends
//!
//! Database backends for the stratum migration engine.
//!
//! The engine plans and applies migrations on a single thread, so the
//! [`DatabaseBackend`] trait is synchronous: `execute` runs one DDL/DML
//! statement, `query` returns rows as backend-agnostic
//! [`Value`](stratum_schema::value::Value)s.

pub mod base;
pub mod sqlite;

pub use base::{DatabaseBackend, Row};
pub use sqlite::SqliteBackend;
