//! # stratum-core
//!
//! Core types, settings, app registry, and error types for the stratum
//! migration engine. This crate has no engine dependencies and provides the
//! foundation for all other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Engine settings and global configuration
//! - [`apps`] - Application registry and lifecycle management
//! - [`logging`] - Tracing-based logging integration

pub mod apps;
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the most commonly used types at the crate root.
pub use error::{StratumError, StratumResult};
pub use settings::{Settings, SETTINGS};
