//! Field type definitions for the schema layer.
//!
//! [`FieldType`] enumerates the column types the engine understands and
//! [`FieldDef`] captures everything schema-relevant about a single field.
//! One clonable, serializable definition serves both live declarations and
//! migration state snapshots.

use serde::{Deserialize, Serialize};

use crate::reference::RelationRef;
use crate::value::Value;

/// The type of a model field, determining its SQL column type and behavior.
///
/// Relational fields (`ForeignKey`, `OneToOneField`, `ManyToManyField`)
/// carry a lazy [`RelationRef`] to their target model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FieldType {
    /// Auto-incrementing 32-bit integer primary key.
    AutoField,
    /// Auto-incrementing 64-bit integer primary key.
    BigAutoField,
    /// Variable-length string with a max length.
    CharField,
    /// Unlimited-length text.
    TextField,
    /// URL-friendly string.
    SlugField,
    /// Email address (CharField with email semantics).
    EmailField,
    /// 16-bit signed integer.
    SmallIntegerField,
    /// 32-bit signed integer.
    IntegerField,
    /// 64-bit signed integer.
    BigIntegerField,
    /// 64-bit floating-point number.
    FloatField,
    /// Fixed-precision decimal number.
    DecimalField {
        /// Maximum total digits.
        max_digits: u32,
        /// Digits after the decimal point.
        decimal_places: u32,
    },
    /// Boolean (true/false).
    BooleanField,
    /// Date without time.
    DateField,
    /// Date and time.
    DateTimeField,
    /// Time without date.
    TimeField,
    /// UUID field.
    UuidField,
    /// Raw binary data.
    BinaryField,
    /// JSON data.
    JsonField,
    /// Many-to-one relationship.
    ForeignKey {
        /// The target model reference (e.g. `"auth.User"`, `"self"`).
        to: RelationRef,
        /// Behavior when the referenced row is deleted.
        on_delete: OnDelete,
        /// The name used for the reverse relation.
        related_name: Option<String>,
    },
    /// One-to-one relationship (unique foreign key).
    OneToOneField {
        /// The target model reference.
        to: RelationRef,
        /// Behavior when the referenced row is deleted.
        on_delete: OnDelete,
        /// The name used for the reverse relation.
        related_name: Option<String>,
    },
    /// Many-to-many relationship (via intermediate table).
    ManyToManyField {
        /// The target model reference.
        to: RelationRef,
        /// Optional explicit intermediate ("through") model reference.
        through: Option<RelationRef>,
        /// The name used for the reverse relation.
        related_name: Option<String>,
    },
}

impl FieldType {
    /// Returns the lazy references this field type carries, if any.
    ///
    /// `ForeignKey` and `OneToOneField` yield one reference;
    /// `ManyToManyField` yields the target and, when present, the through
    /// model.
    pub fn relation_refs(&self) -> Vec<&RelationRef> {
        match self {
            Self::ForeignKey { to, .. } | Self::OneToOneField { to, .. } => vec![to],
            Self::ManyToManyField { to, through, .. } => {
                let mut refs = vec![to];
                if let Some(through) = through {
                    refs.push(through);
                }
                refs
            }
            _ => Vec::new(),
        }
    }

    /// Returns mutable access to the lazy references this field type
    /// carries, if any. Used by state projection to repoint references when
    /// a model is renamed.
    pub fn relation_refs_mut(&mut self) -> Vec<&mut RelationRef> {
        match self {
            Self::ForeignKey { to, .. } | Self::OneToOneField { to, .. } => vec![to],
            Self::ManyToManyField { to, through, .. } => {
                let mut refs = vec![to];
                if let Some(through) = through {
                    refs.push(through);
                }
                refs
            }
            _ => Vec::new(),
        }
    }

    /// Returns `true` if this is a relational field type.
    pub fn is_relation(&self) -> bool {
        !self.relation_refs().is_empty()
    }
}

/// Behavior when a referenced row is deleted (ON DELETE action).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnDelete {
    /// Delete all related rows (CASCADE).
    Cascade,
    /// Prevent deletion if related rows exist (RESTRICT).
    Protect,
    /// Set the foreign key to NULL.
    SetNull,
    /// Set the foreign key to its default value.
    SetDefault,
    /// Take no action (may cause integrity errors).
    DoNothing,
}

/// Complete definition of a model field.
///
/// Built with a fluent builder; covers everything the schema editors and the
/// migration state tracker need to know about a column.
///
/// # Examples
///
/// ```
/// use stratum_schema::fields::{FieldDef, FieldType};
///
/// let title = FieldDef::new("title", FieldType::CharField)
///     .max_length(200)
///     .db_index();
/// assert_eq!(title.column, "title");
/// assert_eq!(title.max_length, Some(200));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// The field name.
    pub name: String,
    /// The database column name (defaults to the field name).
    pub column: String,
    /// The field type.
    pub field_type: FieldType,
    /// Whether this field is the primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Whether NULL is allowed.
    #[serde(default)]
    pub null: bool,
    /// Whether a UNIQUE constraint is applied.
    #[serde(default)]
    pub unique: bool,
    /// Whether a database index should be created.
    #[serde(default)]
    pub db_index: bool,
    /// Maximum character length.
    #[serde(default)]
    pub max_length: Option<usize>,
    /// Default value.
    #[serde(default)]
    pub default: Option<Value>,
}

impl FieldDef {
    /// Creates a new field definition with sensible defaults.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        let column = name.clone();
        Self {
            name,
            column,
            field_type,
            primary_key: false,
            null: false,
            unique: false,
            db_index: false,
            max_length: None,
            default: None,
        }
    }

    /// Sets the database column name.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Marks this field as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Allows NULL values.
    pub fn nullable(mut self) -> Self {
        self.null = true;
        self
    }

    /// Marks this field as having a UNIQUE constraint.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Marks this field as having a database index.
    pub fn db_index(mut self) -> Self {
        self.db_index = true;
        self
    }

    /// Sets the maximum character length.
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Sets the default value.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Returns `true` if this is a relational field (FK, O2O, M2M).
    pub fn is_relation(&self) -> bool {
        self.field_type.is_relation()
    }
}

/// Shorthand for a foreign key field.
pub fn foreign_key(
    name: impl Into<String>,
    to: impl Into<RelationRef>,
    on_delete: OnDelete,
) -> FieldDef {
    FieldDef::new(
        name,
        FieldType::ForeignKey {
            to: to.into(),
            on_delete,
            related_name: None,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let f = FieldDef::new("title", FieldType::CharField);
        assert_eq!(f.name, "title");
        assert_eq!(f.column, "title");
        assert!(!f.primary_key);
        assert!(!f.null);
        assert!(!f.unique);
        assert!(!f.db_index);
        assert!(f.max_length.is_none());
        assert!(f.default.is_none());
    }

    #[test]
    fn test_builder() {
        let f = FieldDef::new("email", FieldType::EmailField)
            .column("email_addr")
            .unique()
            .db_index()
            .max_length(254)
            .nullable()
            .default("");
        assert_eq!(f.column, "email_addr");
        assert!(f.unique && f.db_index && f.null);
        assert_eq!(f.max_length, Some(254));
        assert_eq!(f.default, Some(Value::String(String::new())));
    }

    #[test]
    fn test_relation_refs_foreign_key() {
        let f = foreign_key("author", "auth.User", OnDelete::Cascade);
        assert!(f.is_relation());
        let refs = f.field_type.relation_refs();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw(), "auth.User");
    }

    #[test]
    fn test_relation_refs_m2m_with_through() {
        let f = FieldDef::new(
            "tags",
            FieldType::ManyToManyField {
                to: "Tag".into(),
                through: Some("PostTag".into()),
                related_name: None,
            },
        );
        let refs = f.field_type.relation_refs();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].raw(), "PostTag");
    }

    #[test]
    fn test_scalar_has_no_refs() {
        let f = FieldDef::new("count", FieldType::IntegerField);
        assert!(!f.is_relation());
        assert!(f.field_type.relation_refs().is_empty());
    }

    #[test]
    fn test_serde_round_trip() {
        let f = foreign_key("author", "auth.User", OnDelete::SetNull).nullable();
        let json = serde_json::to_string(&f).unwrap();
        let back: FieldDef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, f);
    }
}
