//! Project state: the schema snapshot that migrations are applied to.
//!
//! A [`ProjectState`] holds every model across all apps after applying a
//! prefix of the operation sequence. Snapshots are immutable per step:
//! [`ProjectState::apply`] is a pure function returning a new state, and
//! models are stored behind [`Arc`] so snapshots share unchanged models
//! and copy only what an operation actually touches.

use std::collections::BTreeMap;
use std::sync::Arc;

use stratum_core::error::{StratumError, StratumResult};
use stratum_schema::model::ModelDef;
use stratum_schema::reference::{ModelKey, RelationRef};
use stratum_schema::registry::ModelRegistry;

use crate::operations::Operation;

/// A snapshot of the entire project's model state at a point in time.
///
/// Models are keyed by [`ModelKey`] in an ordered map, so iteration order
/// (and therefore everything derived from it: generated operations,
/// migration files, DDL order) is stable across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectState {
    models: BTreeMap<ModelKey, Arc<ModelDef>>,
}

impl ProjectState {
    /// Creates a new empty project state.
    pub fn new() -> Self {
        Self {
            models: BTreeMap::new(),
        }
    }

    /// Builds a state from every model declared in a registry.
    ///
    /// This is the "introspected truth" side of autodetection: the state the
    /// migration history should be brought up to.
    pub fn from_registry(registry: &ModelRegistry) -> Self {
        let mut state = Self::new();
        for model in registry.models() {
            state.add_model(model.clone());
        }
        state
    }

    /// Adds (or replaces) a model in this state.
    pub fn add_model(&mut self, model: ModelDef) {
        self.models.insert(model.key(), Arc::new(model));
    }

    /// Removes a model, failing if it is not part of this state.
    pub fn remove_model(&mut self, key: &ModelKey) -> StratumResult<ModelDef> {
        self.models
            .remove(key)
            .map(|arc| (*arc).clone())
            .ok_or_else(|| StratumError::StateError(format!("Model '{key}' not found in state")))
    }

    /// Renames a model, re-keying it and repointing every reference that
    /// resolved to the old key.
    ///
    /// Self-references (`"self"`) follow the model automatically and are
    /// left untouched; other references are rewritten to the fully-qualified
    /// new name.
    pub fn rename_model(&mut self, old_key: &ModelKey, new_name: &str) -> StratumResult<()> {
        let mut model = self.remove_model(old_key)?;
        model.name = new_name.to_string();
        let new_key = model.key();
        let qualified = RelationRef::new(format!("{}.{}", new_key.app_label, new_key.model_name));

        self.models.insert(new_key, Arc::new(model));

        // Repoint references that resolved to the renamed model.
        let keys: Vec<ModelKey> = self.models.keys().cloned().collect();
        for key in keys {
            let scope = key.clone();
            let needs_rewrite = self.models[&key].fields.iter().any(|f| {
                f.field_type.relation_refs().iter().any(|r| {
                    !r.is_recursive() && r.resolve(&scope).is_ok_and(|t| t == *old_key)
                })
            });
            if !needs_rewrite {
                continue;
            }
            let model = Arc::make_mut(self.models.get_mut(&key).expect("key just listed"));
            for field in &mut model.fields {
                for reference in field.field_type.relation_refs_mut() {
                    if !reference.is_recursive()
                        && reference.resolve(&scope).is_ok_and(|t| t == *old_key)
                    {
                        *reference = qualified.clone();
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns the model with the given key, if present.
    pub fn get_model(&self, key: &ModelKey) -> Option<&ModelDef> {
        self.models.get(key).map(Arc::as_ref)
    }

    /// Returns a mutable reference to a model, copying it out of shared
    /// snapshots first (copy-on-write).
    pub fn get_model_mut(&mut self, key: &ModelKey) -> StratumResult<&mut ModelDef> {
        self.models
            .get_mut(key)
            .map(Arc::make_mut)
            .ok_or_else(|| StratumError::StateError(format!("Model '{key}' not found in state")))
    }

    /// Returns `true` if the state contains the given model.
    pub fn contains(&self, key: &ModelKey) -> bool {
        self.models.contains_key(key)
    }

    /// Returns all models in key order.
    pub fn models(&self) -> impl Iterator<Item = (&ModelKey, &ModelDef)> {
        self.models.iter().map(|(k, v)| (k, v.as_ref()))
    }

    /// Returns the number of models in this state.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns whether this state is empty.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Applies one operation, returning the resulting state.
    ///
    /// This is a pure function: `self` is never modified, and the returned
    /// snapshot shares unchanged models with it.
    pub fn apply(&self, app_label: &str, operation: &dyn Operation) -> StratumResult<Self> {
        let mut next = self.clone();
        operation.state_forwards(app_label, &mut next)?;
        Ok(next)
    }

    /// Applies a sequence of operations in order, returning the final state.
    pub fn apply_all<'a, I>(&self, app_label: &str, operations: I) -> StratumResult<Self>
    where
        I: IntoIterator<Item = &'a Box<dyn Operation>>,
    {
        let mut state = self.clone();
        for op in operations {
            state = state.apply(app_label, op.as_ref())?;
        }
        Ok(state)
    }
}
