//! Core error types for the stratum migration engine.
//!
//! This module provides the [`StratumError`] enum covering configuration
//! errors, reference resolution failures, graph errors, state projection
//! errors, serialization errors, and database errors.

use thiserror::Error;

/// The primary error type for the stratum engine.
///
/// Reference resolution failures and dependency cycles are fatal
/// configuration errors: they carry the offending reference or node set so
/// the developer can see exactly what failed at link or planning time.
#[derive(Error, Debug)]
pub enum StratumError {
    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The engine is improperly configured.
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    // ── Reference resolution ─────────────────────────────────────────

    /// A reference string does not match the `"app.Model"`, `"Model"`, or
    /// `"self"` grammar.
    #[error("Invalid model reference '{0}'")]
    InvalidReference(String),

    /// One or more lazy references could not be matched to a registered
    /// model after all apps finished loading.
    #[error("Unresolved model reference(s): {0}")]
    UnresolvedReference(String),

    // ── Migration graph ──────────────────────────────────────────────

    /// The migration dependency graph contains a cycle.
    #[error("Circular dependency in migration graph: {0}")]
    CyclicDependency(String),

    /// A migration key was not found in the graph or on disk.
    #[error("Unknown migration: {0}")]
    UnknownMigration(String),

    // ── State projection ─────────────────────────────────────────────

    /// An operation referenced a model, field, or index that is not part
    /// of the project state it is being applied to.
    #[error("State error: {0}")]
    StateError(String),

    /// A backward step was requested for an operation that cannot be
    /// reversed.
    #[error("Irreversible operation: {0}")]
    IrreversibleOperation(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred while reading or writing migration files.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── Database ─────────────────────────────────────────────────────

    /// An error reported by the database backend.
    #[error("Database error: {0}")]
    DatabaseError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StratumError {
    /// Returns `true` if this error is fatal at startup/link time rather
    /// than recoverable by retrying the operation.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationError(_)
                | Self::ImproperlyConfigured(_)
                | Self::InvalidReference(_)
                | Self::UnresolvedReference(_)
                | Self::CyclicDependency(_)
        )
    }
}

/// A convenience type alias for `Result<T, StratumError>`.
pub type StratumResult<T> = Result<T, StratumError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_unresolved_reference() {
        let err = StratumError::UnresolvedReference("blog.Author (via blog.post.author)".into());
        assert!(err.to_string().contains("blog.Author"));
        assert!(err.to_string().contains("Unresolved"));
    }

    #[test]
    fn test_display_cyclic_dependency() {
        let err = StratumError::CyclicDependency("blog.0002 -> auth.0001 -> blog.0002".into());
        assert!(err.to_string().contains("Circular dependency"));
    }

    #[test]
    fn test_is_fatal() {
        assert!(StratumError::UnresolvedReference("x".into()).is_fatal());
        assert!(StratumError::CyclicDependency("x".into()).is_fatal());
        assert!(StratumError::InvalidReference("a.b.c".into()).is_fatal());
        assert!(!StratumError::DatabaseError("x".into()).is_fatal());
        assert!(!StratumError::StateError("x".into()).is_fatal());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: StratumError = io_err.into();
        assert!(err.to_string().contains("file missing"));
        assert!(!err.is_fatal());
    }
}
