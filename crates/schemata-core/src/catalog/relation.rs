//! Relationship definitions between schemas.

use super::types::Tristate;
use serde::Serialize;

/// A relationship as declared.
///
/// Targets are schema keys; when omitted the resolver infers them from the
/// relationship name.
#[derive(Debug, Clone, PartialEq)]
pub enum PartialRelationship {
    /// This schema holds a foreign key to the target.
    BelongsTo {
        /// Target schema key.
        target: Option<String>,
        /// Whether the foreign key must be set.
        required: Tristate,
    },
    /// The target holds a foreign key to this schema, at most one row.
    HasOne {
        /// Target schema key.
        target: Option<String>,
        /// Name of the `belongsTo` on the target this relationship mirrors.
        inverse: Option<String>,
    },
    /// The target holds a foreign key to this schema, any number of rows.
    HasMany {
        /// Target schema key.
        target: Option<String>,
        /// Name of the `belongsTo` on the target this relationship mirrors.
        inverse: Option<String>,
        /// Mediate through a synthesized junction schema.
        through: bool,
    },
}

impl PartialRelationship {
    /// The explicitly declared target, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            PartialRelationship::BelongsTo { target, .. }
            | PartialRelationship::HasOne { target, .. }
            | PartialRelationship::HasMany { target, .. } => target.as_deref(),
        }
    }

    /// Check if this is a many-to-many declaration.
    pub fn is_through(&self) -> bool {
        matches!(self, PartialRelationship::HasMany { through: true, .. })
    }
}

/// Builder for a `belongsTo` declaration.
#[derive(Debug, Clone, Default)]
pub struct BelongsTo {
    target: Option<String>,
    required: Tristate,
}

/// Builder for a `hasOne` declaration.
#[derive(Debug, Clone, Default)]
pub struct HasOne {
    target: Option<String>,
    inverse: Option<String>,
}

/// Builder for a `hasMany` declaration.
#[derive(Debug, Clone, Default)]
pub struct HasMany {
    target: Option<String>,
    inverse: Option<String>,
    through: bool,
}

/// Start a `belongsTo` declaration.
pub fn belongs_to() -> BelongsTo {
    BelongsTo::default()
}

/// Start a `hasOne` declaration.
pub fn has_one() -> HasOne {
    HasOne::default()
}

/// Start a `hasMany` declaration.
pub fn has_many() -> HasMany {
    HasMany::default()
}

impl BelongsTo {
    /// Set the target schema key.
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Make the foreign key non-nullable.
    pub fn required(mut self) -> Self {
        self.required = Tristate::True;
        self
    }
}

impl HasOne {
    /// Set the target schema key.
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Name the `belongsTo` on the target this relationship mirrors.
    pub fn inverse(mut self, name: impl Into<String>) -> Self {
        self.inverse = Some(name.into());
        self
    }
}

impl HasMany {
    /// Set the target schema key.
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Name the `belongsTo` on the target this relationship mirrors.
    pub fn inverse(mut self, name: impl Into<String>) -> Self {
        self.inverse = Some(name.into());
        self
    }

    /// Mediate through a synthesized junction schema.
    pub fn through(mut self) -> Self {
        self.through = true;
        self
    }
}

impl From<BelongsTo> for PartialRelationship {
    fn from(builder: BelongsTo) -> Self {
        PartialRelationship::BelongsTo {
            target: builder.target,
            required: builder.required,
        }
    }
}

impl From<HasOne> for PartialRelationship {
    fn from(builder: HasOne) -> Self {
        PartialRelationship::HasOne {
            target: builder.target,
            inverse: builder.inverse,
        }
    }
}

impl From<HasMany> for PartialRelationship {
    fn from(builder: HasMany) -> Self {
        PartialRelationship::HasMany {
            target: builder.target,
            inverse: builder.inverse,
            through: builder.through,
        }
    }
}

/// A resolved relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Relationship {
    /// `source_attribute` on this schema references `target_attribute` on the target.
    BelongsTo {
        /// Target schema key.
        target_schema: String,
        /// Foreign key on this schema.
        source_attribute: String,
        /// Referenced attribute on the target (its id).
        target_attribute: String,
        /// Whether the foreign key is non-nullable.
        required: bool,
    },
    /// Inverse of a `belongsTo` on the target, at most one row.
    HasOne {
        /// Target schema key.
        target_schema: String,
        /// Referenced attribute on this schema (its id).
        source_attribute: String,
        /// Foreign key on the target.
        target_attribute: String,
    },
    /// Inverse of a `belongsTo` on the target, any number of rows.
    HasMany {
        /// Target schema key.
        target_schema: String,
        /// Referenced attribute on this schema (its id).
        source_attribute: String,
        /// Foreign key on the target.
        target_attribute: String,
    },
    /// Many-to-many through a junction schema.
    HasManyThrough {
        /// Target schema key.
        target_schema: String,
        /// Junction schema key.
        through: String,
        /// Junction foreign key referencing this schema.
        through_source_attribute: String,
        /// Junction foreign key referencing the target.
        through_target_attribute: String,
        /// This schema's id.
        source_key: String,
        /// The target's id.
        target_key: String,
    },
}

impl Relationship {
    /// Target schema key.
    pub fn target_schema(&self) -> &str {
        match self {
            Relationship::BelongsTo { target_schema, .. }
            | Relationship::HasOne { target_schema, .. }
            | Relationship::HasMany { target_schema, .. }
            | Relationship::HasManyThrough { target_schema, .. } => target_schema,
        }
    }

    /// Declaration name of the variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Relationship::BelongsTo { .. } => "belongsTo",
            Relationship::HasOne { .. } => "hasOne",
            Relationship::HasMany { .. } => "hasMany",
            Relationship::HasManyThrough { .. } => "hasManyThrough",
        }
    }

    /// If this is a `belongsTo` into `target`, the foreign key it owns.
    pub fn foreign_key_into(&self, target: &str) -> Option<&str> {
        match self {
            Relationship::BelongsTo {
                target_schema,
                source_attribute,
                ..
            } if target_schema == target => Some(source_attribute),
            _ => None,
        }
    }
}
