//! Model declarations.
//!
//! A [`ModelDef`] is the static declaration of one model: its app, name,
//! fields, and [`ModelOptions`]. The same type doubles as the per-model
//! snapshot inside migration project states, so applying the full operation
//! sequence for an app reproduces these definitions exactly.

use serde::{Deserialize, Serialize};

use crate::fields::FieldDef;
use crate::reference::ModelKey;

/// Options for a model beyond its field list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelOptions {
    /// The explicit database table name, if set.
    #[serde(default)]
    pub db_table: Option<String>,
    /// Sets of fields that must be unique together.
    #[serde(default)]
    pub unique_together: Vec<Vec<String>>,
    /// Database indexes.
    #[serde(default)]
    pub indexes: Vec<Index>,
}

/// A database index definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    /// Optional name for the index.
    pub name: Option<String>,
    /// The columns included in this index.
    pub fields: Vec<String>,
    /// Whether this is a unique index.
    #[serde(default)]
    pub unique: bool,
}

impl Index {
    /// Creates a named, non-unique index over the given fields.
    pub fn new(name: impl Into<String>, fields: Vec<&str>) -> Self {
        Self {
            name: Some(name.into()),
            fields: fields.into_iter().map(String::from).collect(),
            unique: false,
        }
    }

    /// Marks this index as unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// The declaration of a single model.
///
/// The declared `name` keeps its original case for display; lookups always
/// go through [`key`](ModelDef::key), which folds it to lowercase. The app
/// label is case-sensitive and used verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDef {
    /// The application label this model belongs to.
    pub app_label: String,
    /// The model name as declared.
    pub name: String,
    /// The fields of this model, in declaration order.
    pub fields: Vec<FieldDef>,
    /// Model-level options.
    #[serde(default)]
    pub options: ModelOptions,
}

impl ModelDef {
    /// Creates a new model declaration.
    pub fn new(
        app_label: impl Into<String>,
        name: impl Into<String>,
        fields: Vec<FieldDef>,
    ) -> Self {
        Self {
            app_label: app_label.into(),
            name: name.into(),
            fields,
            options: ModelOptions::default(),
        }
    }

    /// Sets model options.
    pub fn with_options(mut self, options: ModelOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the lowercased model name.
    pub fn name_lower(&self) -> String {
        self.name.to_lowercase()
    }

    /// Returns the resolved key identifying this model.
    pub fn key(&self) -> ModelKey {
        ModelKey::new(self.app_label.clone(), self.name.clone())
    }

    /// Returns the database table name for this model.
    ///
    /// Defaults to `<app_label>_<model_name>` unless overridden in options.
    pub fn db_table(&self) -> String {
        self.options
            .db_table
            .clone()
            .unwrap_or_else(|| format!("{}_{}", self.app_label, self.name_lower()))
    }

    /// Returns the field with the given name, if present.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}
