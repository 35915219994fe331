//! Schema editor implementations for DDL generation.
//!
//! The [`SchemaEditor`] trait defines operations for creating, modifying,
//! and dropping database schema objects. Each backend has its own
//! implementation producing the correct SQL dialect. Editors return
//! `Vec<String>` because some operations (especially on SQLite) require
//! multiple statements; lines starting with `--` are informational and are
//! skipped by the executor.

use stratum_schema::fields::{FieldDef, FieldType, OnDelete};
use stratum_schema::model::{Index, ModelDef};

/// Generates DDL SQL for schema operations.
pub trait SchemaEditor: Send + Sync {
    /// Returns the vendor name this editor targets (e.g. `"postgresql"`).
    fn vendor(&self) -> &'static str;

    /// Generates `CREATE TABLE` DDL for a model, including foreign key
    /// constraints, `unique_together` constraints, and declared indexes.
    fn create_table(&self, model: &ModelDef) -> Vec<String>;

    /// Generates `DROP TABLE` DDL.
    fn drop_table(&self, table_name: &str) -> Vec<String>;

    /// Generates `ALTER TABLE ... RENAME TO` DDL.
    fn rename_table(&self, old_name: &str, new_name: &str) -> Vec<String>;

    /// Generates `ALTER TABLE ... ADD COLUMN` DDL.
    ///
    /// Many-to-many fields have no column of their own and yield no DDL.
    fn add_column(&self, table_name: &str, field: &FieldDef) -> Vec<String>;

    /// Generates `ALTER TABLE ... DROP COLUMN` DDL.
    fn drop_column(&self, table_name: &str, column_name: &str) -> Vec<String>;

    /// Generates DDL to alter a column's type, nullability, or default.
    fn alter_column(&self, table_name: &str, old_field: &FieldDef, new_field: &FieldDef)
        -> Vec<String>;

    /// Generates `ALTER TABLE ... RENAME COLUMN` DDL.
    fn rename_column(&self, table_name: &str, old_name: &str, new_name: &str) -> Vec<String>;

    /// Generates `CREATE INDEX` DDL.
    fn create_index(&self, table_name: &str, index: &Index) -> Vec<String>;

    /// Generates `DROP INDEX` DDL.
    fn drop_index(&self, index_name: &str) -> Vec<String>;

    /// Generates a `UNIQUE` constraint (or unique index) over the columns.
    fn add_unique_constraint(&self, table_name: &str, columns: &[&str]) -> Vec<String>;

    /// Generates the SQL fragment for a column definition.
    fn column_sql(&self, field: &FieldDef) -> String;
}

// ── Helpers ──────────────────────────────────────────────────────────────

/// Generates the DEFAULT clause for a field, if it has a default.
fn default_sql(field: &FieldDef) -> String {
    field
        .default
        .as_ref()
        .map(|value| format!(" DEFAULT {}", value.to_sql_literal()))
        .unwrap_or_default()
}

/// Generates the ON DELETE action keyword for a foreign key.
fn on_delete_sql(on_delete: OnDelete) -> &'static str {
    match on_delete {
        OnDelete::Cascade => "CASCADE",
        OnDelete::Protect => "RESTRICT",
        OnDelete::SetNull => "SET NULL",
        OnDelete::SetDefault => "SET DEFAULT",
        OnDelete::DoNothing => "NO ACTION",
    }
}

/// Resolves the table a relational field points at.
///
/// References are resolved in the scope of the defining model; a reference
/// left malformed (linking would have rejected it) falls back to the raw
/// string with `.` replaced by `_`.
fn fk_target_table(model: &ModelDef, field: &FieldDef) -> Option<String> {
    let reference = match &field.field_type {
        FieldType::ForeignKey { to, .. } | FieldType::OneToOneField { to, .. } => to,
        _ => return None,
    };
    let table = reference.resolve(&model.key()).map_or_else(
        |_| reference.raw().replace('.', "_"),
        |key| format!("{}_{}", key.app_label, key.model_name),
    );
    Some(table)
}

fn is_many_to_many(field: &FieldDef) -> bool {
    matches!(field.field_type, FieldType::ManyToManyField { .. })
}

/// Shared `CREATE TABLE` assembly: columns, FK constraints, unique_together,
/// then per-index statements. The dialect differences live in `column_sql`.
fn create_table_sql(editor: &dyn SchemaEditor, model: &ModelDef) -> Vec<String> {
    let table_name = model.db_table();
    let mut parts: Vec<String> = Vec::new();

    for field in &model.fields {
        if is_many_to_many(field) {
            continue;
        }
        parts.push(format!("\"{}\" {}", field.column, editor.column_sql(field)));
    }

    for field in &model.fields {
        if let Some(target) = fk_target_table(model, field) {
            let on_delete = match &field.field_type {
                FieldType::ForeignKey { on_delete, .. }
                | FieldType::OneToOneField { on_delete, .. } => *on_delete,
                _ => continue,
            };
            parts.push(format!(
                "FOREIGN KEY (\"{}\") REFERENCES \"{target}\" (\"id\") ON DELETE {}",
                field.column,
                on_delete_sql(on_delete)
            ));
        }
    }

    for group in &model.options.unique_together {
        let cols: Vec<String> = group.iter().map(|c| format!("\"{c}\"")).collect();
        parts.push(format!("UNIQUE ({})", cols.join(", ")));
    }

    let mut sqls = vec![format!("CREATE TABLE \"{table_name}\" ({})", parts.join(", "))];
    for index in &model.options.indexes {
        sqls.extend(editor.create_index(&table_name, index));
    }
    sqls
}

fn create_index_sql(table_name: &str, index: &Index) -> String {
    let unique = if index.unique { "UNIQUE " } else { "" };
    let idx_name = index.name.as_deref().unwrap_or("unnamed_index");
    let cols: Vec<String> = index.fields.iter().map(|f| format!("\"{f}\"")).collect();
    format!(
        "CREATE {unique}INDEX \"{idx_name}\" ON \"{table_name}\" ({})",
        cols.join(", ")
    )
}

// ── PostgreSQL ───────────────────────────────────────────────────────────

/// Schema editor for PostgreSQL.
///
/// Uses PostgreSQL-specific DDL including `BIGSERIAL`, `JSONB`, native
/// `UUID`, and proper `ALTER COLUMN` support.
pub struct PostgresSchemaEditor;

fn pg_type_sql(field: &FieldDef) -> String {
    match &field.field_type {
        FieldType::AutoField => "SERIAL".to_string(),
        FieldType::BigAutoField => "BIGSERIAL".to_string(),
        FieldType::CharField | FieldType::SlugField => {
            format!("VARCHAR({})", field.max_length.unwrap_or(255))
        }
        FieldType::EmailField => format!("VARCHAR({})", field.max_length.unwrap_or(254)),
        FieldType::TextField => "TEXT".to_string(),
        FieldType::SmallIntegerField => "SMALLINT".to_string(),
        FieldType::IntegerField => "INTEGER".to_string(),
        FieldType::BigIntegerField => "BIGINT".to_string(),
        FieldType::FloatField => "DOUBLE PRECISION".to_string(),
        FieldType::DecimalField {
            max_digits,
            decimal_places,
        } => format!("NUMERIC({max_digits}, {decimal_places})"),
        FieldType::BooleanField => "BOOLEAN".to_string(),
        FieldType::DateField => "DATE".to_string(),
        FieldType::DateTimeField => "TIMESTAMP WITH TIME ZONE".to_string(),
        FieldType::TimeField => "TIME".to_string(),
        FieldType::UuidField => "UUID".to_string(),
        FieldType::BinaryField => "BYTEA".to_string(),
        FieldType::JsonField => "JSONB".to_string(),
        FieldType::ForeignKey { .. } | FieldType::OneToOneField { .. } => "BIGINT".to_string(),
        FieldType::ManyToManyField { .. } => String::new(),
    }
}

impl SchemaEditor for PostgresSchemaEditor {
    fn vendor(&self) -> &'static str {
        "postgresql"
    }

    fn create_table(&self, model: &ModelDef) -> Vec<String> {
        create_table_sql(self, model)
    }

    fn drop_table(&self, table_name: &str) -> Vec<String> {
        vec![format!("DROP TABLE IF EXISTS \"{table_name}\" CASCADE")]
    }

    fn rename_table(&self, old_name: &str, new_name: &str) -> Vec<String> {
        vec![format!(
            "ALTER TABLE \"{old_name}\" RENAME TO \"{new_name}\""
        )]
    }

    fn add_column(&self, table_name: &str, field: &FieldDef) -> Vec<String> {
        if is_many_to_many(field) {
            return Vec::new();
        }
        vec![format!(
            "ALTER TABLE \"{table_name}\" ADD COLUMN \"{}\" {}",
            field.column,
            self.column_sql(field)
        )]
    }

    fn drop_column(&self, table_name: &str, column_name: &str) -> Vec<String> {
        vec![format!(
            "ALTER TABLE \"{table_name}\" DROP COLUMN \"{column_name}\""
        )]
    }

    fn alter_column(
        &self,
        table_name: &str,
        old_field: &FieldDef,
        new_field: &FieldDef,
    ) -> Vec<String> {
        let mut sqls = Vec::new();
        let col = &new_field.column;

        let old_type = pg_type_sql(old_field);
        let new_type = pg_type_sql(new_field);
        if old_type != new_type {
            sqls.push(format!(
                "ALTER TABLE \"{table_name}\" ALTER COLUMN \"{col}\" TYPE {new_type} \
                 USING \"{col}\"::{new_type}"
            ));
        }
        if old_field.null != new_field.null {
            let action = if new_field.null { "DROP" } else { "SET" };
            sqls.push(format!(
                "ALTER TABLE \"{table_name}\" ALTER COLUMN \"{col}\" {action} NOT NULL"
            ));
        }
        if old_field.default != new_field.default {
            match &new_field.default {
                Some(value) => sqls.push(format!(
                    "ALTER TABLE \"{table_name}\" ALTER COLUMN \"{col}\" SET DEFAULT {}",
                    value.to_sql_literal()
                )),
                None => sqls.push(format!(
                    "ALTER TABLE \"{table_name}\" ALTER COLUMN \"{col}\" DROP DEFAULT"
                )),
            }
        }
        if !old_field.unique && new_field.unique {
            sqls.push(format!(
                "ALTER TABLE \"{table_name}\" ADD CONSTRAINT \"{table_name}_{col}_uniq\" \
                 UNIQUE (\"{col}\")"
            ));
        } else if old_field.unique && !new_field.unique {
            sqls.push(format!(
                "ALTER TABLE \"{table_name}\" DROP CONSTRAINT IF EXISTS \"{table_name}_{col}_uniq\""
            ));
        }
        sqls
    }

    fn rename_column(&self, table_name: &str, old_name: &str, new_name: &str) -> Vec<String> {
        vec![format!(
            "ALTER TABLE \"{table_name}\" RENAME COLUMN \"{old_name}\" TO \"{new_name}\""
        )]
    }

    fn create_index(&self, table_name: &str, index: &Index) -> Vec<String> {
        vec![create_index_sql(table_name, index)]
    }

    fn drop_index(&self, index_name: &str) -> Vec<String> {
        vec![format!("DROP INDEX IF EXISTS \"{index_name}\"")]
    }

    fn add_unique_constraint(&self, table_name: &str, columns: &[&str]) -> Vec<String> {
        let cols: Vec<String> = columns.iter().map(|c| format!("\"{c}\"")).collect();
        let constraint = format!("{table_name}_{}_uniq", columns.join("_"));
        vec![format!(
            "ALTER TABLE \"{table_name}\" ADD CONSTRAINT \"{constraint}\" UNIQUE ({})",
            cols.join(", ")
        )]
    }

    fn column_sql(&self, field: &FieldDef) -> String {
        let mut sql = pg_type_sql(field);
        if field.primary_key {
            sql.push_str(" PRIMARY KEY");
        } else if !field.null {
            sql.push_str(" NOT NULL");
        }
        if field.unique && !field.primary_key {
            sql.push_str(" UNIQUE");
        }
        sql.push_str(&default_sql(field));
        sql
    }
}

// ── SQLite ───────────────────────────────────────────────────────────────

/// Schema editor for SQLite.
///
/// SQLite has no `ALTER COLUMN`; altering a column uses the table
/// recreation strategy. Multi-column unique constraints become unique
/// indexes.
pub struct SqliteSchemaEditor;

fn sqlite_type_sql(field: &FieldDef) -> &'static str {
    match &field.field_type {
        FieldType::AutoField | FieldType::BigAutoField => "INTEGER",
        FieldType::CharField
        | FieldType::TextField
        | FieldType::SlugField
        | FieldType::EmailField
        | FieldType::UuidField => "TEXT",
        FieldType::SmallIntegerField
        | FieldType::IntegerField
        | FieldType::BigIntegerField
        | FieldType::BooleanField
        | FieldType::ForeignKey { .. }
        | FieldType::OneToOneField { .. } => "INTEGER",
        FieldType::FloatField => "REAL",
        FieldType::DecimalField { .. } => "NUMERIC",
        FieldType::DateField | FieldType::DateTimeField | FieldType::TimeField => "TEXT",
        FieldType::BinaryField => "BLOB",
        FieldType::JsonField => "TEXT",
        FieldType::ManyToManyField { .. } => "",
    }
}

impl SchemaEditor for SqliteSchemaEditor {
    fn vendor(&self) -> &'static str {
        "sqlite"
    }

    fn create_table(&self, model: &ModelDef) -> Vec<String> {
        create_table_sql(self, model)
    }

    fn drop_table(&self, table_name: &str) -> Vec<String> {
        vec![format!("DROP TABLE IF EXISTS \"{table_name}\"")]
    }

    fn rename_table(&self, old_name: &str, new_name: &str) -> Vec<String> {
        vec![format!(
            "ALTER TABLE \"{old_name}\" RENAME TO \"{new_name}\""
        )]
    }

    fn add_column(&self, table_name: &str, field: &FieldDef) -> Vec<String> {
        if is_many_to_many(field) {
            return Vec::new();
        }
        vec![format!(
            "ALTER TABLE \"{table_name}\" ADD COLUMN \"{}\" {}",
            field.column,
            self.column_sql(field)
        )]
    }

    fn drop_column(&self, table_name: &str, column_name: &str) -> Vec<String> {
        // Supported natively since SQLite 3.35.
        vec![format!(
            "ALTER TABLE \"{table_name}\" DROP COLUMN \"{column_name}\""
        )]
    }

    fn alter_column(
        &self,
        table_name: &str,
        _old_field: &FieldDef,
        new_field: &FieldDef,
    ) -> Vec<String> {
        // No ALTER COLUMN in SQLite: recreate the table around the data.
        let col = &new_field.column;
        let tmp = format!("__{table_name}_new");
        vec![
            format!("-- SQLite: recreate table to alter column \"{col}\""),
            format!(
                "-- New column definition: \"{col}\" {}",
                self.column_sql(new_field)
            ),
            format!("CREATE TABLE \"{tmp}\" AS SELECT * FROM \"{table_name}\""),
            format!("DROP TABLE \"{table_name}\""),
            format!("ALTER TABLE \"{tmp}\" RENAME TO \"{table_name}\""),
        ]
    }

    fn rename_column(&self, table_name: &str, old_name: &str, new_name: &str) -> Vec<String> {
        // Supported natively since SQLite 3.25.
        vec![format!(
            "ALTER TABLE \"{table_name}\" RENAME COLUMN \"{old_name}\" TO \"{new_name}\""
        )]
    }

    fn create_index(&self, table_name: &str, index: &Index) -> Vec<String> {
        vec![create_index_sql(table_name, index)]
    }

    fn drop_index(&self, index_name: &str) -> Vec<String> {
        vec![format!("DROP INDEX IF EXISTS \"{index_name}\"")]
    }

    fn add_unique_constraint(&self, table_name: &str, columns: &[&str]) -> Vec<String> {
        // SQLite: a unique index enforces the constraint.
        let cols: Vec<String> = columns.iter().map(|c| format!("\"{c}\"")).collect();
        let idx_name = format!("{table_name}_{}_uniq", columns.join("_"));
        vec![format!(
            "CREATE UNIQUE INDEX \"{idx_name}\" ON \"{table_name}\" ({})",
            cols.join(", ")
        )]
    }

    fn column_sql(&self, field: &FieldDef) -> String {
        if field.primary_key
            && matches!(
                field.field_type,
                FieldType::AutoField | FieldType::BigAutoField
            )
        {
            return "INTEGER PRIMARY KEY AUTOINCREMENT".to_string();
        }
        let mut sql = sqlite_type_sql(field).to_string();
        if field.primary_key {
            sql.push_str(" PRIMARY KEY");
        } else if !field.null {
            sql.push_str(" NOT NULL");
        }
        if field.unique && !field.primary_key {
            sql.push_str(" UNIQUE");
        }
        sql.push_str(&default_sql(field));
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum_schema::fields::{foreign_key, FieldDef, FieldType, OnDelete};
    use stratum_schema::model::{ModelDef, ModelOptions};
    use stratum_schema::value::Value;

    fn pg() -> PostgresSchemaEditor {
        PostgresSchemaEditor
    }

    fn lite() -> SqliteSchemaEditor {
        SqliteSchemaEditor
    }

    fn post_model() -> ModelDef {
        ModelDef::new(
            "blog",
            "post",
            vec![
                FieldDef::new("id", FieldType::BigAutoField).primary_key(),
                FieldDef::new("title", FieldType::CharField).max_length(200),
                foreign_key("author", "auth.User", OnDelete::Cascade),
            ],
        )
    }

    // ── CREATE TABLE ────────────────────────────────────────────────

    #[test]
    fn test_pg_create_table() {
        let sqls = pg().create_table(&post_model());
        assert_eq!(sqls.len(), 1);
        let sql = &sqls[0];
        assert!(sql.starts_with("CREATE TABLE \"blog_post\""));
        assert!(sql.contains("\"id\" BIGSERIAL PRIMARY KEY"));
        assert!(sql.contains("\"title\" VARCHAR(200) NOT NULL"));
        assert!(sql.contains("FOREIGN KEY (\"author\") REFERENCES \"auth_user\" (\"id\") ON DELETE CASCADE"));
    }

    #[test]
    fn test_sqlite_create_table() {
        let sqls = lite().create_table(&post_model());
        let sql = &sqls[0];
        assert!(sql.contains("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(sql.contains("\"title\" TEXT NOT NULL"));
        assert!(sql.contains("REFERENCES \"auth_user\""));
    }

    #[test]
    fn test_create_table_resolves_bare_reference() {
        let model = ModelDef::new(
            "blog",
            "comment",
            vec![
                FieldDef::new("id", FieldType::BigAutoField).primary_key(),
                foreign_key("post", "Post", OnDelete::Cascade),
            ],
        );
        let sql = &pg().create_table(&model)[0];
        assert!(sql.contains("REFERENCES \"blog_post\""));
    }

    #[test]
    fn test_create_table_skips_m2m_columns() {
        let model = ModelDef::new(
            "blog",
            "post",
            vec![
                FieldDef::new("id", FieldType::BigAutoField).primary_key(),
                FieldDef::new(
                    "tags",
                    FieldType::ManyToManyField {
                        to: "Tag".into(),
                        through: None,
                        related_name: None,
                    },
                ),
            ],
        );
        let sql = &pg().create_table(&model)[0];
        assert!(!sql.contains("tags"));
    }

    #[test]
    fn test_create_table_with_unique_together_and_indexes() {
        let model = ModelDef::new(
            "blog",
            "post",
            vec![FieldDef::new("id", FieldType::BigAutoField).primary_key()],
        )
        .with_options(ModelOptions {
            unique_together: vec![vec!["author".into(), "slug".into()]],
            indexes: vec![Index::new("idx_slug", vec!["slug"])],
            ..ModelOptions::default()
        });
        let sqls = pg().create_table(&model);
        assert_eq!(sqls.len(), 2);
        assert!(sqls[0].contains("UNIQUE (\"author\", \"slug\")"));
        assert!(sqls[1].contains("CREATE INDEX \"idx_slug\""));
    }

    // ── Column DDL ──────────────────────────────────────────────────

    #[test]
    fn test_pg_add_column_with_default() {
        let field = FieldDef::new("views", FieldType::IntegerField).default(Value::Int(0));
        let sqls = pg().add_column("blog_post", &field);
        assert_eq!(
            sqls[0],
            "ALTER TABLE \"blog_post\" ADD COLUMN \"views\" INTEGER NOT NULL DEFAULT 0"
        );
    }

    #[test]
    fn test_add_column_m2m_is_empty() {
        let field = FieldDef::new(
            "tags",
            FieldType::ManyToManyField {
                to: "Tag".into(),
                through: None,
                related_name: None,
            },
        );
        assert!(pg().add_column("blog_post", &field).is_empty());
        assert!(lite().add_column("blog_post", &field).is_empty());
    }

    #[test]
    fn test_pg_alter_column_type_and_null() {
        let old = FieldDef::new("count", FieldType::IntegerField);
        let new = FieldDef::new("count", FieldType::BigIntegerField).nullable();
        let sqls = pg().alter_column("t", &old, &new);
        assert_eq!(sqls.len(), 2);
        assert!(sqls[0].contains("TYPE BIGINT"));
        assert!(sqls[1].contains("DROP NOT NULL"));
    }

    #[test]
    fn test_pg_alter_column_default_and_unique() {
        let old = FieldDef::new("slug", FieldType::SlugField);
        let new = FieldDef::new("slug", FieldType::SlugField).unique().default("x");
        let sqls = pg().alter_column("t", &old, &new);
        assert!(sqls.iter().any(|s| s.contains("SET DEFAULT 'x'")));
        assert!(sqls.iter().any(|s| s.contains("UNIQUE (\"slug\")")));
    }

    #[test]
    fn test_pg_alter_column_no_change_is_empty() {
        let f = FieldDef::new("title", FieldType::CharField).max_length(100);
        assert!(pg().alter_column("t", &f, &f.clone()).is_empty());
    }

    #[test]
    fn test_sqlite_alter_column_recreates() {
        let old = FieldDef::new("title", FieldType::CharField).max_length(100);
        let new = FieldDef::new("title", FieldType::CharField).max_length(200);
        let sqls = lite().alter_column("blog_post", &old, &new);
        assert!(sqls[0].starts_with("--"));
        assert!(sqls.iter().any(|s| s.contains("CREATE TABLE \"__blog_post_new\"")));
        assert!(sqls.iter().any(|s| s.contains("RENAME TO \"blog_post\"")));
    }

    // ── Table / index DDL ───────────────────────────────────────────

    #[test]
    fn test_rename_table() {
        assert_eq!(
            pg().rename_table("blog_post", "blog_entry")[0],
            "ALTER TABLE \"blog_post\" RENAME TO \"blog_entry\""
        );
    }

    #[test]
    fn test_drop_table() {
        assert!(pg().drop_table("blog_post")[0].contains("DROP TABLE IF EXISTS"));
        assert_eq!(
            lite().drop_table("blog_post")[0],
            "DROP TABLE IF EXISTS \"blog_post\""
        );
    }

    #[test]
    fn test_unique_index() {
        let idx = Index::new("idx_email", vec!["email"]).unique();
        let sql = &pg().create_index("users", &idx)[0];
        assert!(sql.starts_with("CREATE UNIQUE INDEX"));
    }

    #[test]
    fn test_add_unique_constraint_dialects() {
        let pg_sql = &pg().add_unique_constraint("t", &["a", "b"])[0];
        assert!(pg_sql.contains("ADD CONSTRAINT"));
        let lite_sql = &lite().add_unique_constraint("t", &["a", "b"])[0];
        assert!(lite_sql.contains("CREATE UNIQUE INDEX"));
        assert!(lite_sql.contains("t_a_b_uniq"));
    }

    #[test]
    fn test_drop_index() {
        assert_eq!(
            lite().drop_index("idx_title")[0],
            "DROP INDEX IF EXISTS \"idx_title\""
        );
    }

    // ── Type mapping ────────────────────────────────────────────────

    #[test]
    fn test_pg_type_mapping() {
        let cases = [
            (FieldType::TextField, "TEXT"),
            (FieldType::BooleanField, "BOOLEAN"),
            (FieldType::UuidField, "UUID"),
            (FieldType::JsonField, "JSONB"),
            (FieldType::DateTimeField, "TIMESTAMP WITH TIME ZONE"),
            (
                FieldType::DecimalField {
                    max_digits: 10,
                    decimal_places: 2,
                },
                "NUMERIC(10, 2)",
            ),
        ];
        for (ft, expected) in cases {
            assert_eq!(pg_type_sql(&FieldDef::new("f", ft)), expected);
        }
    }

    #[test]
    fn test_sqlite_type_mapping() {
        assert_eq!(
            sqlite_type_sql(&FieldDef::new("f", FieldType::BooleanField)),
            "INTEGER"
        );
        assert_eq!(
            sqlite_type_sql(&FieldDef::new("f", FieldType::FloatField)),
            "REAL"
        );
        assert_eq!(
            sqlite_type_sql(&FieldDef::new("f", FieldType::BinaryField)),
            "BLOB"
        );
    }

    #[test]
    fn test_vendors() {
        assert_eq!(pg().vendor(), "postgresql");
        assert_eq!(lite().vendor(), "sqlite");
    }
}
