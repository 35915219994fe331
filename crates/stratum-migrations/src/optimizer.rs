//! Operation optimization for squashing migrations.
//!
//! The [`MigrationOptimizer`] collapses a sequence of operations into a
//! minimal equivalent one, working directly on the serializable form so a
//! squashed migration can be written straight back to disk.
//!
//! Optimizations performed:
//! - `CreateModel` + `DeleteModel` on the same model: both removed, along
//!   with every intermediate operation on that model
//! - `CreateModel` + `AddField` / `AlterField` / `RemoveField` /
//!   `RenameField` / `RenameModel`: folded into the `CreateModel`
//! - `AddField` + `AlterField` / `RenameField` on the same field: merged
//! - `AddField` + `RemoveField` on the same field: both removed
//! - `AddIndex` + `RemoveIndex` on the same index: both removed
//! - consecutive `AlterUniqueTogether` on the same model: last one wins

use crate::serializer::SerializableOperation;

/// Collapses operation sequences to a fixed point.
pub struct MigrationOptimizer;

impl MigrationOptimizer {
    /// Optimizes a sequence of operations into a minimal equivalent list.
    ///
    /// Runs merge passes until the list stops shrinking.
    pub fn optimize(operations: Vec<SerializableOperation>) -> Vec<SerializableOperation> {
        let mut result = operations;
        loop {
            let before = result.len();
            result = Self::optimize_pass(result);
            if result.len() == before {
                break;
            }
        }
        result
    }

    /// Runs a single merge pass.
    fn optimize_pass(operations: Vec<SerializableOperation>) -> Vec<SerializableOperation> {
        let mut result: Vec<SerializableOperation> = Vec::with_capacity(operations.len());
        for op in operations {
            if let Some(op) = Self::try_merge(&mut result, op) {
                result.push(op);
            }
        }
        result
    }

    fn same_model(a: &str, b: &str) -> bool {
        a.eq_ignore_ascii_case(b)
    }

    /// Tries to merge `op` into the already-collected list. Returns `None`
    /// if the operation was absorbed, `Some(op)` if it must be appended.
    fn try_merge(
        existing: &mut Vec<SerializableOperation>,
        op: SerializableOperation,
    ) -> Option<SerializableOperation> {
        use crate::serializer::SerializableOperation as Op;

        match op {
            // DeleteModel cancels a CreateModel and everything in between.
            Op::DeleteModel { ref name } => {
                let create_idx = existing.iter().position(|e| {
                    matches!(e, Op::CreateModel { name: n, .. } if Self::same_model(n, name))
                });
                if let Some(idx) = create_idx {
                    existing.remove(idx);
                    existing.retain(|e| !Self::touches_model(e, name));
                    return None;
                }
                Some(op)
            }

            // RenameModel folds into its CreateModel.
            Op::RenameModel {
                ref old_name,
                ref new_name,
            } => {
                for e in existing.iter_mut() {
                    if let Op::CreateModel { name, .. } = e {
                        if Self::same_model(name, old_name) {
                            *name = new_name.to_lowercase();
                            return None;
                        }
                    }
                }
                Some(op)
            }

            // AddField folds into its CreateModel.
            Op::AddField {
                ref model_name,
                ref field,
            } => {
                for e in existing.iter_mut() {
                    if let Op::CreateModel { name, fields, .. } = e {
                        if Self::same_model(name, model_name) {
                            fields.push(field.clone());
                            return None;
                        }
                    }
                }
                Some(op)
            }

            // RemoveField cancels an AddField, or prunes a CreateModel.
            Op::RemoveField {
                ref model_name,
                ref field_name,
            } => {
                let add_idx = existing.iter().position(|e| {
                    matches!(e, Op::AddField { model_name: m, field }
                        if Self::same_model(m, model_name) && &field.name == field_name)
                });
                if let Some(idx) = add_idx {
                    existing.remove(idx);
                    // Any AlterField the removed field picked up in between
                    // is dead too.
                    existing.retain(|e| {
                        !matches!(e, Op::AlterField { model_name: m, field_name: f, .. }
                            if Self::same_model(m, model_name) && f == field_name)
                    });
                    return None;
                }
                for e in existing.iter_mut() {
                    if let Op::CreateModel { name, fields, .. } = e {
                        if Self::same_model(name, model_name)
                            && fields.iter().any(|f| &f.name == field_name)
                        {
                            fields.retain(|f| &f.name != field_name);
                            return None;
                        }
                    }
                }
                Some(op)
            }

            // AlterField folds into CreateModel or AddField.
            Op::AlterField {
                ref model_name,
                ref field_name,
                ref field,
            } => {
                for e in existing.iter_mut() {
                    match e {
                        Op::CreateModel { name, fields, .. }
                            if Self::same_model(name, model_name) =>
                        {
                            if let Some(f) = fields.iter_mut().find(|f| &f.name == field_name) {
                                *f = field.clone();
                                return None;
                            }
                        }
                        Op::AddField {
                            model_name: m,
                            field: f,
                        } if Self::same_model(m, model_name) && &f.name == field_name => {
                            *f = field.clone();
                            return None;
                        }
                        _ => {}
                    }
                }
                Some(op)
            }

            // RenameField folds into CreateModel or AddField.
            Op::RenameField {
                ref model_name,
                ref old_name,
                ref new_name,
            } => {
                for e in existing.iter_mut() {
                    match e {
                        Op::CreateModel { name, fields, .. }
                            if Self::same_model(name, model_name) =>
                        {
                            if let Some(f) = fields.iter_mut().find(|f| &f.name == old_name) {
                                f.name.clone_from(new_name);
                                f.column.clone_from(new_name);
                                return None;
                            }
                        }
                        Op::AddField {
                            model_name: m,
                            field: f,
                        } if Self::same_model(m, model_name) && &f.name == old_name => {
                            f.name.clone_from(new_name);
                            f.column.clone_from(new_name);
                            return None;
                        }
                        _ => {}
                    }
                }
                Some(op)
            }

            // RemoveIndex cancels an AddIndex.
            Op::RemoveIndex {
                ref model_name,
                ref index_name,
            } => {
                let add_idx = existing.iter().position(|e| {
                    matches!(e, Op::AddIndex { model_name: m, index }
                        if Self::same_model(m, model_name)
                            && index.name.as_deref() == Some(index_name.as_str()))
                });
                if let Some(idx) = add_idx {
                    existing.remove(idx);
                    return None;
                }
                Some(op)
            }

            // Consecutive unique_together changes: last one wins.
            Op::AlterUniqueTogether {
                ref model_name, ..
            } => {
                existing.retain(|e| {
                    !matches!(e, Op::AlterUniqueTogether { model_name: m, .. }
                        if Self::same_model(m, model_name))
                });
                Some(op)
            }

            other => Some(other),
        }
    }

    /// Returns `true` if an operation touches the named model.
    fn touches_model(op: &SerializableOperation, model: &str) -> bool {
        use crate::serializer::SerializableOperation as Op;
        let name = match op {
            Op::CreateModel { name, .. } | Op::DeleteModel { name } => name,
            Op::RenameModel { new_name, .. } => new_name,
            Op::AddField { model_name, .. }
            | Op::RemoveField { model_name, .. }
            | Op::AlterField { model_name, .. }
            | Op::RenameField { model_name, .. }
            | Op::AddIndex { model_name, .. }
            | Op::RemoveIndex { model_name, .. }
            | Op::AlterUniqueTogether { model_name, .. } => model_name,
            Op::RunSql { .. } => return false,
        };
        Self::same_model(name, model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum_schema::fields::{FieldDef, FieldType};
    use stratum_schema::model::{Index, ModelOptions};

    use crate::serializer::SerializableOperation as Op;

    fn create_post() -> Op {
        Op::CreateModel {
            name: "post".into(),
            fields: vec![FieldDef::new("id", FieldType::BigAutoField).primary_key()],
            options: ModelOptions::default(),
        }
    }

    fn add_title() -> Op {
        Op::AddField {
            model_name: "post".into(),
            field: FieldDef::new("title", FieldType::CharField).max_length(200),
        }
    }

    #[test]
    fn test_create_then_delete_cancels() {
        let result = MigrationOptimizer::optimize(vec![
            create_post(),
            add_title(),
            Op::DeleteModel { name: "post".into() },
        ]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_delete_without_create_survives() {
        let result =
            MigrationOptimizer::optimize(vec![Op::DeleteModel { name: "post".into() }]);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_create_plus_add_field_merges() {
        let result = MigrationOptimizer::optimize(vec![create_post(), add_title()]);
        assert_eq!(result.len(), 1);
        let Op::CreateModel { fields, .. } = &result[0] else {
            panic!("expected CreateModel");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].name, "title");
    }

    #[test]
    fn test_create_plus_rename_model_merges() {
        let result = MigrationOptimizer::optimize(vec![
            create_post(),
            Op::RenameModel {
                old_name: "post".into(),
                new_name: "Entry".into(),
            },
        ]);
        assert_eq!(result.len(), 1);
        let Op::CreateModel { name, .. } = &result[0] else {
            panic!("expected CreateModel");
        };
        assert_eq!(name, "entry");
    }

    #[test]
    fn test_add_then_remove_field_cancels() {
        let result = MigrationOptimizer::optimize(vec![
            add_title(),
            Op::RemoveField {
                model_name: "post".into(),
                field_name: "title".into(),
            },
        ]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_add_alter_remove_field_cancels_all() {
        let result = MigrationOptimizer::optimize(vec![
            add_title(),
            Op::AlterField {
                model_name: "post".into(),
                field_name: "title".into(),
                field: FieldDef::new("title", FieldType::CharField).max_length(500),
            },
            Op::RemoveField {
                model_name: "post".into(),
                field_name: "title".into(),
            },
        ]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_remove_field_prunes_create_model() {
        let result = MigrationOptimizer::optimize(vec![
            create_post(),
            add_title(),
            Op::RemoveField {
                model_name: "post".into(),
                field_name: "id".into(),
            },
        ]);
        assert_eq!(result.len(), 1);
        let Op::CreateModel { fields, .. } = &result[0] else {
            panic!("expected CreateModel");
        };
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "title");
    }

    #[test]
    fn test_add_then_alter_field_merges() {
        let result = MigrationOptimizer::optimize(vec![
            add_title(),
            Op::AlterField {
                model_name: "post".into(),
                field_name: "title".into(),
                field: FieldDef::new("title", FieldType::CharField).max_length(500),
            },
        ]);
        assert_eq!(result.len(), 1);
        let Op::AddField { field, .. } = &result[0] else {
            panic!("expected AddField");
        };
        assert_eq!(field.max_length, Some(500));
    }

    #[test]
    fn test_add_then_rename_field_merges() {
        let result = MigrationOptimizer::optimize(vec![
            add_title(),
            Op::RenameField {
                model_name: "post".into(),
                old_name: "title".into(),
                new_name: "headline".into(),
            },
        ]);
        assert_eq!(result.len(), 1);
        let Op::AddField { field, .. } = &result[0] else {
            panic!("expected AddField");
        };
        assert_eq!(field.name, "headline");
        assert_eq!(field.column, "headline");
    }

    #[test]
    fn test_rename_field_inside_create_model() {
        let result = MigrationOptimizer::optimize(vec![
            create_post(),
            add_title(),
            Op::RenameField {
                model_name: "post".into(),
                old_name: "title".into(),
                new_name: "headline".into(),
            },
        ]);
        assert_eq!(result.len(), 1);
        let Op::CreateModel { fields, .. } = &result[0] else {
            panic!("expected CreateModel");
        };
        assert!(fields.iter().any(|f| f.name == "headline"));
    }

    #[test]
    fn test_add_then_remove_index_cancels() {
        let result = MigrationOptimizer::optimize(vec![
            Op::AddIndex {
                model_name: "post".into(),
                index: Index::new("idx_title", vec!["title"]),
            },
            Op::RemoveIndex {
                model_name: "post".into(),
                index_name: "idx_title".into(),
            },
        ]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_last_unique_together_wins() {
        let result = MigrationOptimizer::optimize(vec![
            Op::AlterUniqueTogether {
                model_name: "post".into(),
                unique_together: vec![vec!["a".into()]],
            },
            Op::AlterUniqueTogether {
                model_name: "post".into(),
                unique_together: vec![vec!["b".into()]],
            },
        ]);
        assert_eq!(result.len(), 1);
        let Op::AlterUniqueTogether { unique_together, .. } = &result[0] else {
            panic!("expected AlterUniqueTogether");
        };
        assert_eq!(unique_together[0], vec!["b".to_string()]);
    }

    #[test]
    fn test_unrelated_operations_survive() {
        let ops = vec![
            create_post(),
            Op::RunSql {
                sql_forwards: "SELECT 1".into(),
                sql_backwards: None,
            },
            Op::AddField {
                model_name: "other".into(),
                field: FieldDef::new("x", FieldType::IntegerField),
            },
        ];
        let result = MigrationOptimizer::optimize(ops.clone());
        assert_eq!(result.len(), 3);
        assert_eq!(result, ops);
    }

    #[test]
    fn test_model_name_matching_is_case_insensitive() {
        let result = MigrationOptimizer::optimize(vec![
            Op::CreateModel {
                name: "Post".into(),
                fields: vec![],
                options: ModelOptions::default(),
            },
            Op::DeleteModel { name: "post".into() },
        ]);
        assert!(result.is_empty());
    }
}
