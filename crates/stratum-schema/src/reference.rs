//! Model keys and lazy reference resolution.
//!
//! Relational fields point at their target model with a string reference
//! that may be written before the target is declared. A [`RelationRef`] is
//! resolved against the *scope* (the defining model) into a [`ModelKey`].
//!
//! App labels are case-sensitive tokens and are preserved verbatim; model
//! names are case-insensitive identifiers and are folded to lowercase, so
//! `"auth.User"` and `"auth.user"` name the same model while `"Auth.user"`
//! does not.

use std::fmt;

use serde::{Deserialize, Serialize};
use stratum_core::error::{StratumError, StratumResult};

/// The self-referential relation marker.
///
/// A relational field whose reference equals this constant points at its own
/// defining model (e.g. a tree node's parent).
pub const RECURSIVE_RELATION: &str = "self";

/// The fully-resolved identity of a model: `(app_label, model_name)`.
///
/// The app label keeps its declared case; the model name is always stored
/// lowercase. Construction goes through [`ModelKey::new`], which enforces
/// the folding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModelKey {
    /// The case-sensitive application label.
    pub app_label: String,
    /// The lowercased model name.
    pub model_name: String,
}

impl ModelKey {
    /// Creates a key, folding the model name to lowercase.
    pub fn new(app_label: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            app_label: app_label.into(),
            model_name: model_name.into().to_lowercase(),
        }
    }

    /// Returns the key as the `(app_label, model_name)` tuple used by the
    /// migration state maps.
    pub fn as_tuple(&self) -> (String, String) {
        (self.app_label.clone(), self.model_name.clone())
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.app_label, self.model_name)
    }
}

impl From<(String, String)> for ModelKey {
    fn from((app_label, model_name): (String, String)) -> Self {
        Self::new(app_label, model_name)
    }
}

/// A lazy, string-encoded reference to a model that may not be declared yet.
///
/// Three shapes are accepted:
///
/// - `"self"`: the defining model itself;
/// - `"ModelName"`: a model in the defining app;
/// - `"AppLabel.ModelName"`: fully qualified.
///
/// The raw string is kept verbatim until [`resolve`](RelationRef::resolve)
/// is called with the defining model's key; anything else (two dots, empty
/// segments) is rejected at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationRef(String);

impl RelationRef {
    /// Creates a reference from its raw string form.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw, unresolved reference string.
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this is the self-referential marker.
    pub fn is_recursive(&self) -> bool {
        self.0 == RECURSIVE_RELATION
    }

    /// Resolves this reference against the defining model's key.
    ///
    /// The app-label segment is preserved in its original case; the
    /// model-name segment is lowercased. A reference without a `.` resolves
    /// against the defining app; the `"self"` marker resolves to the
    /// defining model unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StratumError::InvalidReference`] if the reference contains
    /// more than one `.` or an empty segment.
    pub fn resolve(&self, scope: &ModelKey) -> StratumResult<ModelKey> {
        if self.is_recursive() {
            return Ok(scope.clone());
        }

        match self.0.split_once('.') {
            None => {
                if self.0.is_empty() {
                    return Err(StratumError::InvalidReference(self.0.clone()));
                }
                Ok(ModelKey::new(scope.app_label.clone(), self.0.as_str()))
            }
            Some((app_label, model_name)) => {
                if app_label.is_empty() || model_name.is_empty() || model_name.contains('.') {
                    return Err(StratumError::InvalidReference(self.0.clone()));
                }
                Ok(ModelKey::new(app_label, model_name))
            }
        }
    }
}

impl fmt::Display for RelationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RelationRef {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for RelationRef {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}
