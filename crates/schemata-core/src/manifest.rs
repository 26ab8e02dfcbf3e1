//! JSON declaration manifests.
//!
//! A manifest lists schemas with their attributes and relationships as
//! arrays, so declaration order survives parsing.
//!
//! ```json
//! {
//!   "schemas": [
//!     {
//!       "name": "Todo",
//!       "attributes": [{ "name": "title", "type": "string", "required": true, "max": 120 }],
//!       "relationships": [{ "name": "user", "type": "belongsTo" }]
//!     },
//!     { "name": "User" }
//!   ]
//! }
//! ```

use crate::catalog::{
    AttributeKind, DateStep, DefaultValue, Generator, PartialAttribute, PartialConstraints,
    PartialRelationship, PartialSchema, SchemaMap, Tristate,
};
use crate::datatype::{CommonOptions, PartialRange, PartialTextBounds};
use crate::error::ManifestError;
use crate::resolve::naming::schema_key;
use crate::value::Value;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Top-level manifest document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Manifest {
    /// Schemas in declaration order.
    pub schemas: Vec<SchemaDecl>,
}

/// One schema declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SchemaDecl {
    /// Entity name.
    pub name: String,
    /// Optional namespace.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Key to register under; defaults to the naming rule.
    #[serde(default)]
    pub key: Option<String>,
    /// Plural name override.
    #[serde(default)]
    pub plural_name: Option<String>,
    /// Table name override.
    #[serde(default)]
    pub table_name: Option<String>,
    /// Display attribute.
    #[serde(default)]
    pub display_attribute: Option<String>,
    /// Schema-wide read-only flag.
    #[serde(default)]
    pub read_only: Option<bool>,
    /// Explicit id attribute.
    #[serde(default)]
    pub id: Option<AttributeDecl>,
    /// Attributes in order.
    #[serde(default)]
    pub attributes: Vec<AttributeDecl>,
    /// Relationships in order.
    #[serde(default)]
    pub relationships: Vec<RelationshipDecl>,
}

/// Numeric step or calendar granularity.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StepDecl {
    /// Multiple-of constraint for numbers.
    Number(f64),
    /// Granularity for dates.
    Granularity(DateStep),
}

/// One attribute declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AttributeDecl {
    /// Attribute name.
    pub name: String,
    /// Data type.
    #[serde(rename = "type")]
    pub kind: AttributeKind,
    /// Reject null values.
    #[serde(default)]
    pub required: Option<bool>,
    /// Use as the schema id.
    #[serde(default)]
    pub primary: Option<bool>,
    /// Unique column.
    #[serde(default)]
    pub unique: Option<bool>,
    /// Reject storage writes.
    #[serde(default)]
    pub read_only: Option<bool>,
    /// Indexed column.
    #[serde(default)]
    pub index: Option<bool>,
    /// Hide in generated UIs.
    #[serde(default)]
    pub hidden: Option<bool>,
    /// Human-readable label.
    #[serde(default)]
    pub display_name: Option<String>,
    /// A JSON scalar, or `{"generated": "uuidV4"}`.
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    /// Minimum value, or minimum length for strings.
    #[serde(default)]
    pub min: Option<f64>,
    /// Maximum value, or maximum length for strings.
    #[serde(default)]
    pub max: Option<f64>,
    /// Numeric step or date granularity.
    #[serde(default)]
    pub step: Option<StepDecl>,
    /// Regex for string and text values.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Allowed enum values.
    #[serde(default)]
    pub values: Option<Vec<String>>,
}

/// Relationship kinds a manifest can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipKind {
    /// Foreign key on this schema.
    BelongsTo,
    /// Single row on the target holding the key.
    HasOne,
    /// Rows on the target, or a junction when `through`.
    HasMany,
}

/// One relationship declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RelationshipDecl {
    /// Relationship name.
    pub name: String,
    /// Relationship kind.
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    /// Target schema key.
    #[serde(default)]
    pub target: Option<String>,
    /// Non-nullable foreign key (belongsTo only).
    #[serde(default)]
    pub required: Option<bool>,
    /// Many-to-many through a junction (hasMany only).
    #[serde(default)]
    pub through: Option<bool>,
    /// Mirrored belongsTo on the target (hasOne and hasMany only).
    #[serde(default)]
    pub inverse: Option<String>,
}

impl Manifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a manifest file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading manifest");
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Convert into declarations keyed in manifest order.
    pub fn into_schema_map(self) -> Result<SchemaMap<PartialSchema>, ManifestError> {
        let mut map = SchemaMap::new();
        for decl in self.schemas {
            let key = decl
                .key
                .clone()
                .unwrap_or_else(|| schema_key(decl.namespace.as_deref(), &decl.name));
            if map.contains_key(&key) {
                return Err(ManifestError::DuplicateKey(key));
            }
            let schema = decl.into_partial()?;
            map.insert(key, schema);
        }
        Ok(map)
    }
}

impl SchemaDecl {
    fn into_partial(self) -> Result<PartialSchema, ManifestError> {
        let mut schema = PartialSchema::new(self.name);
        schema.namespace = self.namespace;
        schema.plural_name = self.plural_name;
        schema.table_name = self.table_name;
        schema.display_attribute = self.display_attribute;
        schema.read_only = self.read_only.into();

        if let Some(id) = self.id {
            let name = id.name.clone();
            schema = schema.with_id(name, id.into_partial()?);
        }
        for attribute in self.attributes {
            let name = attribute.name.clone();
            schema = schema.with_attribute(name, attribute.into_partial()?);
        }
        for relationship in self.relationships {
            let name = relationship.name.clone();
            schema = schema.with_relationship(name, relationship.into_partial()?);
        }
        Ok(schema)
    }
}

impl AttributeDecl {
    fn unsupported(&self, option: &'static str) -> ManifestError {
        ManifestError::UnsupportedOption {
            attribute: self.name.clone(),
            option,
            kind: self.kind,
        }
    }

    fn invalid(&self, option: &'static str, reason: impl Into<String>) -> ManifestError {
        ManifestError::InvalidOption {
            context: format!("attribute '{}'", self.name),
            option,
            reason: reason.into(),
        }
    }

    fn length(&self, option: &'static str, n: Option<f64>) -> Result<Option<usize>, ManifestError> {
        match n {
            None => Ok(None),
            Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= usize::MAX as f64 => {
                Ok(Some(n as usize))
            }
            Some(n) => Err(self.invalid(option, format!("{} is not a valid length", n))),
        }
    }

    fn default_value(&self) -> Result<Option<DefaultValue>, ManifestError> {
        let Some(json) = &self.default else {
            return Ok(None);
        };
        if let Some(generated) = json.get("generated") {
            return match generated.as_str() {
                Some("uuidV4") => Ok(Some(DefaultValue::Generated(Generator::UuidV4))),
                _ => Err(self.invalid("default", format!("unknown generator {}", generated))),
            };
        }
        Value::from_json(json)
            .map(|value| Some(DefaultValue::Static(value)))
            .ok_or_else(|| self.invalid("default", "expected a scalar or a generator"))
    }

    fn constraints(&self) -> Result<PartialConstraints, ManifestError> {
        use AttributeKind as K;

        let numeric = self.kind.is_numeric();
        let textual = matches!(self.kind, K::String | K::Text);

        if (self.min.is_some() || self.max.is_some()) && !(numeric || textual) {
            return Err(self.unsupported(if self.min.is_some() { "min" } else { "max" }));
        }
        if self.pattern.is_some() && !textual {
            return Err(self.unsupported("pattern"));
        }
        if self.values.is_some() && self.kind != K::Enum {
            return Err(self.unsupported("values"));
        }

        let number_step = match self.step {
            None => None,
            Some(StepDecl::Number(step)) if numeric => Some(step),
            Some(StepDecl::Granularity(step)) if self.kind.is_temporal() => {
                return Ok(match self.kind {
                    K::DateOnly => PartialConstraints::DateOnly(Some(step)),
                    _ => PartialConstraints::DateTime(Some(step)),
                });
            }
            Some(_) if numeric || self.kind.is_temporal() => {
                return Err(self.invalid("step", format!("wrong step type for {} attributes", self.kind)));
            }
            Some(_) => return Err(self.unsupported("step")),
        };

        let bounds = || -> Result<PartialTextBounds, ManifestError> {
            Ok(PartialTextBounds {
                min: self.length("min", self.min)?,
                max: self.length("max", self.max)?,
                pattern: self.pattern.clone(),
            })
        };
        let range = PartialRange {
            min: self.min,
            max: self.max,
            step: number_step,
        };

        Ok(match self.kind {
            K::Boolean => PartialConstraints::Boolean,
            K::String => PartialConstraints::String(bounds()?),
            K::Text => PartialConstraints::Text(bounds()?),
            K::Number => PartialConstraints::Number(range),
            K::Integer => PartialConstraints::Integer(range),
            K::Uuid => PartialConstraints::Uuid,
            K::Enum => PartialConstraints::Enum(self.values.clone().unwrap_or_default()),
            K::DateOnly => PartialConstraints::DateOnly(None),
            K::DateTime => PartialConstraints::DateTime(None),
        })
    }

    fn into_partial(self) -> Result<PartialAttribute, ManifestError> {
        let constraints = self.constraints()?;
        let common = CommonOptions {
            required: self.required.into(),
            primary: self.primary.into(),
            unique: self.unique.into(),
            read_only: self.read_only.into(),
            index: self.index.into(),
            hidden: self.hidden.into(),
            default: self.default_value()?,
            display_name: self.display_name,
        };
        Ok(common.into_partial(constraints))
    }
}

impl RelationshipDecl {
    fn reject(&self, option: &'static str) -> ManifestError {
        ManifestError::InvalidOption {
            context: format!("relationship '{}'", self.name),
            option,
            reason: format!("not supported by {:?} relationships", self.kind),
        }
    }

    fn into_partial(self) -> Result<PartialRelationship, ManifestError> {
        match self.kind {
            RelationshipKind::BelongsTo => {
                if self.through.is_some() {
                    return Err(self.reject("through"));
                }
                if self.inverse.is_some() {
                    return Err(self.reject("inverse"));
                }
                Ok(PartialRelationship::BelongsTo {
                    target: self.target,
                    required: Tristate::from(self.required),
                })
            }
            RelationshipKind::HasOne => {
                if self.required.is_some() {
                    return Err(self.reject("required"));
                }
                if self.through.is_some() {
                    return Err(self.reject("through"));
                }
                Ok(PartialRelationship::HasOne {
                    target: self.target,
                    inverse: self.inverse,
                })
            }
            RelationshipKind::HasMany => {
                if self.required.is_some() {
                    return Err(self.reject("required"));
                }
                let through = self.through.unwrap_or(false);
                if through && self.inverse.is_some() {
                    return Err(self.reject("inverse"));
                }
                Ok(PartialRelationship::HasMany {
                    target: self.target,
                    inverse: self.inverse,
                    through,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TODOS: &str = r#"{
        "schemas": [
            {
                "name": "Todo",
                "attributes": [
                    { "name": "title", "type": "string", "required": true, "max": 120 },
                    { "name": "status", "type": "enum", "values": ["open", "done"], "default": "open" },
                    { "name": "due", "type": "dateonly", "step": "day" },
                    { "name": "estimate", "type": "number", "min": 0, "step": 0.5 }
                ],
                "relationships": [
                    { "name": "user", "type": "belongsTo", "required": true },
                    { "name": "tags", "type": "hasMany", "through": true }
                ]
            },
            { "name": "User", "relationships": [{ "name": "todos", "type": "hasMany" }] },
            { "name": "Tag", "namespace": null }
        ]
    }"#;

    #[test]
    fn test_preserves_declaration_order() {
        let map = Manifest::from_json(TODOS).unwrap().into_schema_map().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["Todo", "User", "Tag"]);

        let todo = map.get("Todo").unwrap();
        let names: Vec<_> = todo.attributes.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["title", "status", "due", "estimate"]);
        assert_eq!(todo.relationships[1].0, "tags");
        assert!(todo.relationships[1].1.is_through());
    }

    #[test]
    fn test_attribute_options() {
        let map = Manifest::from_json(TODOS).unwrap().into_schema_map().unwrap();
        let todo = map.get("Todo").unwrap();

        let (_, title) = &todo.attributes[0];
        assert_eq!(title.control.allow_null, Tristate::False);
        assert_eq!(
            title.control.constraints,
            PartialConstraints::String(PartialTextBounds {
                max: Some(120),
                ..Default::default()
            })
        );

        let (_, due) = &todo.attributes[2];
        assert_eq!(
            due.control.constraints,
            PartialConstraints::DateOnly(Some(DateStep::Day))
        );

        let (_, estimate) = &todo.attributes[3];
        assert_eq!(
            estimate.control.constraints,
            PartialConstraints::Number(PartialRange {
                min: Some(0.0),
                max: None,
                step: Some(0.5),
            })
        );
    }

    #[test]
    fn test_generated_default() {
        let json = r#"{"schemas": [{"name": "Todo", "attributes": [
            {"name": "ref", "type": "uuid", "default": {"generated": "uuidV4"}}
        ]}]}"#;
        let map = Manifest::from_json(json).unwrap().into_schema_map().unwrap();
        let (_, reference) = &map.get("Todo").unwrap().attributes[0];
        assert_eq!(
            reference.control.default,
            Some(DefaultValue::Generated(Generator::UuidV4))
        );
    }

    #[test]
    fn test_unsupported_option() {
        let json = r#"{"schemas": [{"name": "Todo", "attributes": [
            {"name": "done", "type": "boolean", "pattern": "x"}
        ]}]}"#;
        let err = Manifest::from_json(json).unwrap().into_schema_map().unwrap_err();
        assert!(matches!(
            err,
            ManifestError::UnsupportedOption {
                option: "pattern",
                kind: AttributeKind::Boolean,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_options() {
        let json = r#"{"schemas": [{"name": "Todo", "attributes": [
            {"name": "title", "type": "string", "min": 1.5}
        ]}]}"#;
        let err = Manifest::from_json(json).unwrap().into_schema_map().unwrap_err();
        assert!(matches!(err, ManifestError::InvalidOption { option: "min", .. }));

        let json = r#"{"schemas": [{"name": "Todo", "relationships": [
            {"name": "user", "type": "hasOne", "through": true}
        ]}]}"#;
        let err = Manifest::from_json(json).unwrap().into_schema_map().unwrap_err();
        assert!(matches!(err, ManifestError::InvalidOption { option: "through", .. }));
    }

    #[test]
    fn test_duplicate_key() {
        let json = r#"{"schemas": [{"name": "Todo"}, {"name": "Todo"}]}"#;
        let err = Manifest::from_json(json).unwrap().into_schema_map().unwrap_err();
        assert!(matches!(err, ManifestError::DuplicateKey(key) if key == "Todo"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = r#"{"schemas": [{"name": "Todo", "colour": "red"}]}"#;
        assert!(matches!(
            Manifest::from_json(json),
            Err(ManifestError::Parse(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TODOS.as_bytes()).unwrap();

        let manifest = Manifest::from_path(file.path()).unwrap();
        assert_eq!(manifest.schemas.len(), 3);

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            Manifest::from_path(missing),
            Err(ManifestError::Io(_))
        ));
    }
}
