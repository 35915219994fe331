//! The linked model registry.
//!
//! Model declarations are collected in two phases: every app registers its
//! [`ModelDef`]s, then [`ModelRegistry::link`] resolves every lazy
//! [`RelationRef`](crate::reference::RelationRef) against the registered
//! set, like a linker resolving a symbol table. A reference that still
//! cannot be matched once linking runs is a fatal configuration error that
//! names the offending reference.

use std::collections::BTreeMap;

use stratum_core::error::{StratumError, StratumResult};

use crate::model::ModelDef;
use crate::reference::ModelKey;

/// Registry of all declared models across apps.
///
/// Models are keyed by [`ModelKey`], so lookups are case-insensitive on the
/// model name and case-sensitive on the app label. The map is ordered, which
/// keeps every iteration over the registry deterministic.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: BTreeMap<ModelKey, ModelDef>,
    /// Resolved relation edges: defining model -> [(field name, target)].
    relations: BTreeMap<ModelKey, Vec<(String, ModelKey)>>,
    linked: bool,
}

impl ModelRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model declaration.
    ///
    /// # Panics
    ///
    /// Panics if a model with the same key is already registered, or if
    /// [`link`](ModelRegistry::link) has already run.
    pub fn register(&mut self, model: ModelDef) {
        assert!(
            !self.linked,
            "Cannot register models after the registry has been linked"
        );
        let key = model.key();
        assert!(
            !self.models.contains_key(&key),
            "Model '{key}' is already registered"
        );
        self.models.insert(key, model);
    }

    /// Returns the model with the given key, if registered.
    pub fn get(&self, key: &ModelKey) -> Option<&ModelDef> {
        self.models.get(key)
    }

    /// Returns all registered models in key order.
    pub fn models(&self) -> impl Iterator<Item = &ModelDef> {
        self.models.values()
    }

    /// Returns the number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Returns `true` once [`link`](ModelRegistry::link) has succeeded.
    pub const fn is_linked(&self) -> bool {
        self.linked
    }

    /// Resolves every relational reference against the registered models.
    ///
    /// Walks each model's relational fields, resolves their references in
    /// the scope of the defining model, and records the resolved edges. All
    /// failures are aggregated: the returned error names every reference
    /// that is invalid or points at a model that is not registered, together
    /// with the field that holds it.
    ///
    /// On success the registry is sealed against further registration.
    pub fn link(&mut self) -> StratumResult<()> {
        let mut unresolved: Vec<String> = Vec::new();
        let mut relations: BTreeMap<ModelKey, Vec<(String, ModelKey)>> = BTreeMap::new();

        for (key, model) in &self.models {
            for field in &model.fields {
                for reference in field.field_type.relation_refs() {
                    match reference.resolve(key) {
                        Ok(target) => {
                            if self.models.contains_key(&target) {
                                relations
                                    .entry(key.clone())
                                    .or_default()
                                    .push((field.name.clone(), target));
                            } else {
                                unresolved.push(format!(
                                    "'{reference}' (via {key}.{})",
                                    field.name
                                ));
                            }
                        }
                        Err(_) => {
                            unresolved.push(format!("'{reference}' (via {key}.{})", field.name));
                        }
                    }
                }
            }
        }

        if !unresolved.is_empty() {
            return Err(StratumError::UnresolvedReference(unresolved.join(", ")));
        }

        tracing::debug!(
            models = self.models.len(),
            edges = relations.values().map(Vec::len).sum::<usize>(),
            "model registry linked"
        );
        self.relations = relations;
        self.linked = true;
        Ok(())
    }

    /// Returns the resolved relation edges for a model.
    ///
    /// Empty until [`link`](ModelRegistry::link) succeeds.
    pub fn relations(&self, key: &ModelKey) -> &[(String, ModelKey)] {
        self.relations.get(key).map_or(&[], Vec::as_slice)
    }
}
