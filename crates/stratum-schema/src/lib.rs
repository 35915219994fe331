//! # stratum-schema
//!
//! The declarative schema layer for the stratum migration engine.
//!
//! Models are plain data declarations ([`ModelDef`]) built in two phases:
//! first every app declares its models into a [`ModelRegistry`], then an
//! explicit linking pass ([`ModelRegistry::link`]) resolves every lazy
//! cross-model reference, failing loudly on anything left dangling. This
//! replaces runtime class registration with a linker-style symbol
//! resolution step.
//!
//! ## Module Overview
//!
//! - [`value`] - backend-agnostic [`Value`] enum for defaults and data
//! - [`fields`] - [`FieldType`], [`OnDelete`], and the [`FieldDef`] builder
//! - [`reference`] - [`ModelKey`] and lazy [`RelationRef`] resolution
//! - [`model`] - [`ModelDef`], [`ModelOptions`], [`Index`]
//! - [`registry`] - [`ModelRegistry`] and the linking pass

pub mod fields;
pub mod model;
pub mod reference;
pub mod registry;
pub mod value;

// Re-export key types at the crate root.
pub use fields::{FieldDef, FieldType, OnDelete};
pub use model::{Index, ModelDef, ModelOptions};
pub use reference::{ModelKey, RelationRef, RECURSIVE_RELATION};
pub use registry::ModelRegistry;
pub use value::Value;
