//! Migration structs and the dependency graph.
//!
//! A [`Migration`] is a named unit of schema change containing a sequence of
//! [`Operation`]s. The [`MigrationGraph`] manages the dependency DAG between
//! migrations across all apps. Ordering is fully deterministic: nodes and
//! edges live in ordered collections and topological ties break by
//! `(app_label, migration_name)`, so the same input always yields the same
//! plan. A cycle is fatal and the error names the migrations trapped on it.

use std::collections::{BTreeMap, BTreeSet};

use stratum_core::error::{StratumError, StratumResult};

use crate::operations::Operation;

/// A migration key: `(app_label, migration_name)`.
pub type MigrationKey = (String, String);

/// A single migration containing a sequence of operations.
///
/// Migrations are identified by `(app_label, name)` and may declare
/// dependencies on other migrations. Operations within a migration are
/// applied in order.
pub struct Migration {
    /// The migration name (e.g., "0001_initial").
    pub name: String,
    /// The application label this migration belongs to.
    pub app_label: String,
    /// Dependencies on other migrations: `(app_label, migration_name)`.
    pub dependencies: Vec<MigrationKey>,
    /// The operations to apply, in order.
    pub operations: Vec<Box<dyn Operation>>,
    /// Whether this is the initial migration for the app.
    pub initial: bool,
}

impl Migration {
    /// Creates a new migration.
    pub fn new(app_label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            app_label: app_label.into(),
            dependencies: Vec::new(),
            operations: Vec::new(),
            initial: false,
        }
    }

    /// Marks this migration as the initial migration.
    pub fn initial(mut self) -> Self {
        self.initial = true;
        self
    }

    /// Adds a dependency on another migration.
    pub fn depends_on(mut self, app_label: impl Into<String>, name: impl Into<String>) -> Self {
        self.dependencies.push((app_label.into(), name.into()));
        self
    }

    /// Adds an operation to this migration.
    pub fn add_operation(mut self, op: Box<dyn Operation>) -> Self {
        self.operations.push(op);
        self
    }

    /// Returns the `(app_label, name)` key for this migration.
    pub fn key(&self) -> MigrationKey {
        (self.app_label.clone(), self.name.clone())
    }

    /// Returns `true` if every operation in this migration is reversible.
    pub fn reversible(&self) -> bool {
        self.operations.iter().all(|op| op.reversible())
    }
}

impl std::fmt::Debug for Migration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration")
            .field("app_label", &self.app_label)
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("operations", &self.operations.len())
            .field("initial", &self.initial)
            .finish()
    }
}

/// A directed acyclic graph of migrations.
///
/// The graph tracks which migrations exist and their dependency edges, and
/// provides the deterministic topological ordering migrations are applied
/// in.
#[derive(Debug, Default)]
pub struct MigrationGraph {
    /// All migration nodes with their `initial` flag.
    nodes: BTreeMap<MigrationKey, bool>,
    /// Forward edges: dependency -> dependents.
    forward_edges: BTreeMap<MigrationKey, BTreeSet<MigrationKey>>,
    /// Backward edges: dependent -> dependencies.
    backward_edges: BTreeMap<MigrationKey, BTreeSet<MigrationKey>>,
}

impl MigrationGraph {
    /// Creates a new empty migration graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a migration to the graph.
    pub fn add_node(&mut self, app_label: impl Into<String>, name: impl Into<String>, initial: bool) {
        let key = (app_label.into(), name.into());
        self.forward_edges.entry(key.clone()).or_default();
        self.backward_edges.entry(key.clone()).or_default();
        self.nodes.insert(key, initial);
    }

    /// Adds a dependency edge: `child` depends on `parent`.
    ///
    /// Both nodes must have been added previously.
    pub fn add_dependency(&mut self, child: MigrationKey, parent: MigrationKey) -> StratumResult<()> {
        if !self.nodes.contains_key(&child) {
            return Err(StratumError::UnknownMigration(format!(
                "{}.{} (dependent)",
                child.0, child.1
            )));
        }
        if !self.nodes.contains_key(&parent) {
            return Err(StratumError::UnknownMigration(format!(
                "{}.{} (dependency of {}.{})",
                parent.0, parent.1, child.0, child.1
            )));
        }
        self.forward_edges
            .entry(parent.clone())
            .or_default()
            .insert(child.clone());
        self.backward_edges.entry(child).or_default().insert(parent);
        Ok(())
    }

    /// Returns all migrations in topological order (dependencies first).
    ///
    /// Ties break by `(app_label, name)`: when several migrations are ready
    /// at once, the lexicographically smallest key comes first, so the
    /// output is stable across runs.
    ///
    /// # Errors
    ///
    /// Returns [`StratumError::CyclicDependency`] naming the migrations on
    /// the cycle if the graph is not a DAG.
    pub fn topological_order(&self) -> StratumResult<Vec<MigrationKey>> {
        let mut in_degree: BTreeMap<&MigrationKey, usize> = self
            .nodes
            .keys()
            .map(|key| (key, self.backward_edges.get(key).map_or(0, BTreeSet::len)))
            .collect();

        // Ordered frontier: pop-first gives the deterministic tie-break.
        let mut frontier: BTreeSet<&MigrationKey> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&key, _)| key)
            .collect();

        let mut result = Vec::with_capacity(self.nodes.len());
        while let Some(&node) = frontier.iter().next() {
            frontier.remove(node);
            result.push(node.clone());
            if let Some(children) = self.forward_edges.get(node) {
                for child in children {
                    let degree = in_degree.get_mut(child).expect("edge to unknown node");
                    *degree -= 1;
                    if *degree == 0 {
                        frontier.insert(child);
                    }
                }
            }
        }

        if result.len() != self.nodes.len() {
            let stuck: Vec<String> = in_degree
                .iter()
                .filter(|(_, &degree)| degree > 0)
                .map(|(key, _)| format!("{}.{}", key.0, key.1))
                .collect();
            return Err(StratumError::CyclicDependency(stuck.join(", ")));
        }

        Ok(result)
    }

    /// Returns the leaf nodes (migrations with no dependents) for an app.
    pub fn leaf_nodes(&self, app_label: &str) -> Vec<MigrationKey> {
        self.forward_edges
            .iter()
            .filter(|(key, children)| key.0 == app_label && children.is_empty())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Returns the root nodes (migrations with no dependencies) for an app.
    pub fn root_nodes(&self, app_label: &str) -> Vec<MigrationKey> {
        self.backward_edges
            .iter()
            .filter(|(key, parents)| key.0 == app_label && parents.is_empty())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Returns all node keys in the graph, in key order.
    pub fn node_keys(&self) -> Vec<MigrationKey> {
        self.nodes.keys().cloned().collect()
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns whether the graph contains a given node.
    pub fn contains(&self, key: &MigrationKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Returns the dependencies of a node.
    pub fn dependencies(&self, key: &MigrationKey) -> Vec<MigrationKey> {
        self.backward_edges
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the dependents of a node.
    pub fn dependents(&self, key: &MigrationKey) -> Vec<MigrationKey> {
        self.forward_edges
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Validates that the graph has no cycles.
    pub fn validate(&self) -> StratumResult<()> {
        self.topological_order()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::RunSql;

    fn key(app: &str, name: &str) -> MigrationKey {
        (app.to_string(), name.to_string())
    }

    // ── Migration tests ─────────────────────────────────────────────

    #[test]
    fn test_migration_new() {
        let m = Migration::new("blog", "0001_initial");
        assert_eq!(m.app_label, "blog");
        assert_eq!(m.name, "0001_initial");
        assert!(!m.initial);
        assert!(m.dependencies.is_empty());
        assert!(m.operations.is_empty());
    }

    #[test]
    fn test_migration_builder() {
        let m = Migration::new("blog", "0002_add_author")
            .initial()
            .depends_on("blog", "0001_initial")
            .depends_on("auth", "0001_initial")
            .add_operation(Box::new(RunSql {
                sql_forwards: "SELECT 1".into(),
                sql_backwards: Some("SELECT 2".into()),
            }));
        assert!(m.initial);
        assert_eq!(m.dependencies.len(), 2);
        assert_eq!(m.operations.len(), 1);
        assert_eq!(m.key(), key("blog", "0002_add_author"));
        assert!(m.reversible());
    }

    #[test]
    fn test_migration_reversible_false_with_irreversible_op() {
        let m = Migration::new("blog", "0001").add_operation(Box::new(RunSql {
            sql_forwards: "SELECT 1".into(),
            sql_backwards: None,
        }));
        assert!(!m.reversible());
    }

    // ── MigrationGraph tests ────────────────────────────────────────

    #[test]
    fn test_graph_new() {
        let g = MigrationGraph::new();
        assert!(g.is_empty());
        assert_eq!(g.len(), 0);
        assert!(g.topological_order().unwrap().is_empty());
    }

    #[test]
    fn test_graph_add_node_and_contains() {
        let mut g = MigrationGraph::new();
        g.add_node("blog", "0001_initial", true);
        assert_eq!(g.len(), 1);
        assert!(g.contains(&key("blog", "0001_initial")));
        assert!(!g.contains(&key("blog", "0002_missing")));
    }

    #[test]
    fn test_graph_add_dependency_missing_nodes() {
        let mut g = MigrationGraph::new();
        g.add_node("blog", "0001", true);
        let err = g
            .add_dependency(key("blog", "0002"), key("blog", "0001"))
            .unwrap_err();
        assert!(err.to_string().contains("blog.0002"));

        let err = g
            .add_dependency(key("blog", "0001"), key("auth", "0001"))
            .unwrap_err();
        assert!(err.to_string().contains("auth.0001"));
    }

    #[test]
    fn test_graph_topological_chain() {
        let mut g = MigrationGraph::new();
        g.add_node("blog", "0001", true);
        g.add_node("blog", "0002", false);
        g.add_node("blog", "0003", false);
        g.add_dependency(key("blog", "0002"), key("blog", "0001")).unwrap();
        g.add_dependency(key("blog", "0003"), key("blog", "0002")).unwrap();

        let order = g.topological_order().unwrap();
        assert_eq!(
            order,
            vec![key("blog", "0001"), key("blog", "0002"), key("blog", "0003")]
        );
    }

    #[test]
    fn test_graph_topological_cross_app() {
        let mut g = MigrationGraph::new();
        g.add_node("auth", "0001", true);
        g.add_node("blog", "0001", true);
        g.add_dependency(key("blog", "0001"), key("auth", "0001")).unwrap();

        let order = g.topological_order().unwrap();
        let pos_auth = order.iter().position(|k| k.0 == "auth").unwrap();
        let pos_blog = order.iter().position(|k| k.0 == "blog").unwrap();
        assert!(pos_auth < pos_blog);
    }

    #[test]
    fn test_graph_topological_diamond() {
        // A -> B, A -> C, B -> D, C -> D
        let mut g = MigrationGraph::new();
        g.add_node("app", "A", true);
        g.add_node("app", "B", false);
        g.add_node("app", "C", false);
        g.add_node("app", "D", false);
        g.add_dependency(key("app", "B"), key("app", "A")).unwrap();
        g.add_dependency(key("app", "C"), key("app", "A")).unwrap();
        g.add_dependency(key("app", "D"), key("app", "B")).unwrap();
        g.add_dependency(key("app", "D"), key("app", "C")).unwrap();

        let order = g.topological_order().unwrap();
        assert_eq!(
            order,
            vec![key("app", "A"), key("app", "B"), key("app", "C"), key("app", "D")]
        );
    }

    #[test]
    fn test_graph_deterministic_tie_break() {
        // Independent nodes come out in key order, whatever the insertion
        // order was.
        let mut g = MigrationGraph::new();
        g.add_node("zeta", "0001", true);
        g.add_node("alpha", "0001", true);
        g.add_node("mu", "0001", true);

        let order = g.topological_order().unwrap();
        assert_eq!(
            order,
            vec![key("alpha", "0001"), key("mu", "0001"), key("zeta", "0001")]
        );
    }

    #[test]
    fn test_graph_cycle_detection_names_nodes() {
        let mut g = MigrationGraph::new();
        g.add_node("app", "A", false);
        g.add_node("app", "B", false);
        g.add_dependency(key("app", "B"), key("app", "A")).unwrap();
        g.add_dependency(key("app", "A"), key("app", "B")).unwrap();

        let err = g.topological_order().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Circular dependency"));
        assert!(msg.contains("app.A"));
        assert!(msg.contains("app.B"));
    }

    #[test]
    fn test_graph_cycle_does_not_implicate_acyclic_nodes() {
        let mut g = MigrationGraph::new();
        g.add_node("ok", "0001", true);
        g.add_node("app", "A", false);
        g.add_node("app", "B", false);
        g.add_dependency(key("app", "B"), key("app", "A")).unwrap();
        g.add_dependency(key("app", "A"), key("app", "B")).unwrap();

        let msg = g.topological_order().unwrap_err().to_string();
        assert!(!msg.contains("ok.0001"));
    }

    #[test]
    fn test_graph_leaf_and_root_nodes() {
        let mut g = MigrationGraph::new();
        g.add_node("blog", "0001", true);
        g.add_node("blog", "0002", false);
        g.add_dependency(key("blog", "0002"), key("blog", "0001")).unwrap();

        assert_eq!(g.leaf_nodes("blog"), vec![key("blog", "0002")]);
        assert_eq!(g.root_nodes("blog"), vec![key("blog", "0001")]);
    }

    #[test]
    fn test_graph_dependencies_and_dependents() {
        let mut g = MigrationGraph::new();
        g.add_node("blog", "0001", true);
        g.add_node("blog", "0002", false);
        g.add_dependency(key("blog", "0002"), key("blog", "0001")).unwrap();

        assert_eq!(g.dependencies(&key("blog", "0002")), vec![key("blog", "0001")]);
        assert_eq!(g.dependents(&key("blog", "0001")), vec![key("blog", "0002")]);
    }

    #[test]
    fn test_graph_validate() {
        let mut g = MigrationGraph::new();
        g.add_node("blog", "0001", true);
        assert!(g.validate().is_ok());

        g.add_node("app", "A", false);
        g.add_node("app", "B", false);
        g.add_dependency(key("app", "B"), key("app", "A")).unwrap();
        g.add_dependency(key("app", "A"), key("app", "B")).unwrap();
        assert!(g.validate().is_err());
    }

    #[test]
    fn test_graph_node_keys_sorted() {
        let mut g = MigrationGraph::new();
        g.add_node("blog", "0001", true);
        g.add_node("auth", "0001", true);
        assert_eq!(g.node_keys(), vec![key("auth", "0001"), key("blog", "0001")]);
    }
}
