//! Relationship resolution: the global second pass.
//!
//! Runs once every schema is assembled. Phases run in a fixed order and each
//! walks schemas and relationships in declaration order:
//!
//! 1. resolve relationship targets
//! 2. `belongsTo`: add foreign keys to the owner
//! 3. `hasOne` / `hasMany`: find or synthesize the inverse `belongsTo`
//! 4. `hasMany` through: synthesize junction schemas
//!
//! Output keeps declared schemas in input order followed by junctions in
//! creation order. Within a schema, declared relationships come first in
//! declaration order, then synthesized ones.

mod junction;
pub mod naming;

use crate::catalog::{
    AssembledSchema, FinalAttribute, FinalSchema, Id, PartialRelationship, Relationship, SchemaMap,
};
use crate::error::InvalidSchemaError;
use naming::{capitalize, lower_first, schema_key, singularize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A schema while its relationships are being resolved.
#[derive(Debug, Clone)]
struct Draft {
    key: String,
    name: String,
    namespace: Option<String>,
    plural_name: String,
    table_name: String,
    display_attribute: String,
    read_only: bool,
    junction: bool,
    id: Id<FinalAttribute>,
    attributes: Vec<(String, FinalAttribute)>,
    declared: Vec<Declared>,
    /// Declared slots first, filled in by the phases; synthesized ones appended.
    relationships: Vec<(String, Option<Relationship>)>,
}

/// A declared relationship with its resolved target.
#[derive(Debug, Clone)]
struct Declared {
    name: String,
    relationship: PartialRelationship,
    target: String,
}

impl Draft {
    fn has_attribute(&self, name: &str) -> bool {
        self.id.name == name || self.attributes.iter().any(|(n, _)| n == name)
    }

    fn has_relationship(&self, name: &str) -> bool {
        self.relationships.iter().any(|(n, _)| n == name)
    }

    /// Add a foreign key attribute, refusing to shadow an existing attribute
    /// or relationship.
    fn add_foreign_key(&mut self, name: String, fk: FinalAttribute) -> Result<(), InvalidSchemaError> {
        if self.has_attribute(&name) {
            return Err(InvalidSchemaError::ForeignKeyCollision {
                schema: self.key.clone(),
                attribute: name,
            });
        }
        if self.has_relationship(&name) {
            return Err(InvalidSchemaError::NameCollision {
                schema: self.key.clone(),
                name,
            });
        }
        self.attributes.push((name, fk));
        Ok(())
    }

    /// Append a synthesized relationship, refusing to shadow any existing name.
    fn add_relationship(
        &mut self,
        name: String,
        relationship: Relationship,
    ) -> Result<(), InvalidSchemaError> {
        if self.has_relationship(&name) || self.has_attribute(&name) {
            return Err(InvalidSchemaError::NameCollision {
                schema: self.key.clone(),
                name,
            });
        }
        self.relationships.push((name, Some(relationship)));
        Ok(())
    }

    /// `(name, foreign key)` of every `belongsTo` on this schema pointing at
    /// `owner`, restricted to the relationship named `inverse` when given.
    fn inverse_candidates(&self, owner: &str, inverse: Option<&str>) -> Vec<(String, String)> {
        self.relationships
            .iter()
            .filter_map(|(name, rel)| {
                let fk = rel.as_ref()?.foreign_key_into(owner)?;
                match inverse {
                    Some(inverse) if inverse != name.as_str() => None,
                    _ => Some((name.clone(), fk.to_string())),
                }
            })
            .collect()
    }

    fn into_final(self) -> FinalSchema {
        FinalSchema {
            name: self.name,
            namespace: self.namespace,
            plural_name: self.plural_name,
            table_name: self.table_name,
            display_attribute: self.display_attribute,
            read_only: self.read_only,
            junction: self.junction,
            id: self.id,
            attributes: self.attributes,
            relationships: self
                .relationships
                .into_iter()
                .filter_map(|(name, rel)| rel.map(|rel| (name, rel)))
                .collect(),
        }
    }
}

/// Schema drafts addressable by key, in output order.
#[derive(Debug, Default)]
struct Drafts {
    drafts: Vec<Draft>,
    index: HashMap<String, usize>,
}

impl Drafts {
    fn push(&mut self, draft: Draft) {
        self.index.insert(draft.key.clone(), self.drafts.len());
        self.drafts.push(draft);
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }
}

/// Resolve every relationship in the map.
pub fn resolve(
    schemas: SchemaMap<AssembledSchema>,
) -> Result<SchemaMap<FinalSchema>, InvalidSchemaError> {
    let mut pending = Vec::with_capacity(schemas.len());
    let mut drafts = Drafts::default();

    for (key, schema) in schemas {
        let mut seen = HashSet::new();
        for (name, _) in &schema.relationships {
            if !seen.insert(name.clone()) {
                return Err(InvalidSchemaError::DuplicateRelationship {
                    schema: key.clone(),
                    relationship: name.clone(),
                });
            }
            if schema.id.name == *name || schema.attributes.iter().any(|(n, _)| n == name) {
                return Err(InvalidSchemaError::NameCollision {
                    schema: key.clone(),
                    name: name.clone(),
                });
            }
        }
        let relationships = schema
            .relationships
            .iter()
            .map(|(name, _)| (name.clone(), None))
            .collect();
        pending.push(schema.relationships);
        drafts.push(Draft {
            key,
            name: schema.name,
            namespace: schema.namespace,
            plural_name: schema.plural_name,
            table_name: schema.table_name,
            display_attribute: schema.display_attribute,
            read_only: schema.read_only,
            junction: false,
            id: schema.id,
            attributes: schema.attributes,
            declared: Vec::new(),
            relationships,
        });
    }

    resolve_targets(&mut drafts, pending)?;
    resolve_belongs_to(&mut drafts)?;
    resolve_inverses(&mut drafts)?;
    junction::resolve_through(&mut drafts)?;

    let mut resolved = SchemaMap::new();
    for draft in drafts.drafts {
        resolved.insert(draft.key.clone(), draft.into_final());
    }
    Ok(resolved)
}

/// Target key for a relationship declared on `owner`.
fn target_key(
    drafts: &Drafts,
    owner: &Draft,
    name: &str,
    relationship: &PartialRelationship,
) -> Result<String, InvalidSchemaError> {
    let unknown = |target: String| InvalidSchemaError::UnknownTarget {
        schema: owner.key.clone(),
        relationship: name.to_string(),
        target,
    };

    if let Some(target) = relationship.target() {
        return if drafts.contains(target) {
            Ok(target.to_string())
        } else {
            Err(unknown(target.to_string()))
        };
    }

    let inferred = match relationship {
        PartialRelationship::BelongsTo { .. } | PartialRelationship::HasOne { .. } => {
            capitalize(name)
        }
        PartialRelationship::HasMany { .. } => capitalize(&singularize(name)),
    };
    if let Some(ns) = owner.namespace.as_deref() {
        let namespaced = schema_key(Some(ns), &inferred);
        if drafts.contains(&namespaced) {
            return Ok(namespaced);
        }
    }
    if drafts.contains(&inferred) {
        Ok(inferred)
    } else {
        Err(unknown(inferred))
    }
}

fn resolve_targets(
    drafts: &mut Drafts,
    pending: Vec<Vec<(String, PartialRelationship)>>,
) -> Result<(), InvalidSchemaError> {
    for (i, relationships) in pending.into_iter().enumerate() {
        let mut declared = Vec::with_capacity(relationships.len());
        for (name, relationship) in relationships {
            let target = target_key(&*drafts, &drafts.drafts[i], &name, &relationship)?;
            declared.push(Declared {
                name,
                relationship,
                target,
            });
        }
        drafts.drafts[i].declared = declared;
    }
    Ok(())
}

fn resolve_belongs_to(drafts: &mut Drafts) -> Result<(), InvalidSchemaError> {
    for i in 0..drafts.drafts.len() {
        for slot in 0..drafts.drafts[i].declared.len() {
            let declared = drafts.drafts[i].declared[slot].clone();
            let PartialRelationship::BelongsTo { required, .. } = declared.relationship else {
                continue;
            };
            let required = required.is_true();

            let target = &drafts.drafts[drafts.position(&declared.target).unwrap_or(i)];
            let target_id = target.id.clone();

            let owner = &mut drafts.drafts[i];
            let fk = format!("{}Id", declared.name);
            owner.add_foreign_key(fk.clone(), target_id.attribute.as_foreign_key(required))?;
            debug!(schema = %owner.key, attribute = %fk, target = %declared.target, "added foreign key");

            owner.relationships[slot].1 = Some(Relationship::BelongsTo {
                target_schema: declared.target,
                source_attribute: fk,
                target_attribute: target_id.name,
                required,
            });
        }
    }
    Ok(())
}

fn resolve_inverses(drafts: &mut Drafts) -> Result<(), InvalidSchemaError> {
    for i in 0..drafts.drafts.len() {
        for slot in 0..drafts.drafts[i].declared.len() {
            let declared = drafts.drafts[i].declared[slot].clone();
            let (inverse, many) = match &declared.relationship {
                PartialRelationship::HasOne { inverse, .. } => (inverse.clone(), false),
                PartialRelationship::HasMany {
                    inverse,
                    through: false,
                    ..
                } => (inverse.clone(), true),
                _ => continue,
            };

            let owner_key = drafts.drafts[i].key.clone();
            let owner_name = drafts.drafts[i].name.clone();
            let owner_id = drafts.drafts[i].id.clone();
            let t = drafts.position(&declared.target).unwrap_or(i);

            let candidates = drafts.drafts[t].inverse_candidates(&owner_key, inverse.as_deref());
            let fk = match candidates.as_slice() {
                [(_, fk)] => fk.clone(),
                [(first, _), (second, _), ..] => {
                    return Err(InvalidSchemaError::AmbiguousInverse {
                        schema: owner_key,
                        relationship: declared.name,
                        target: declared.target,
                        first: first.clone(),
                        second: second.clone(),
                    });
                }
                [] => {
                    if let Some(inverse) = inverse {
                        return Err(InvalidSchemaError::InvalidInverse {
                            schema: owner_key,
                            relationship: declared.name,
                            target: declared.target,
                            inverse,
                        });
                    }
                    let target = &mut drafts.drafts[t];
                    let name = lower_first(&owner_name);
                    let fk = format!("{}Id", name);
                    target.add_foreign_key(fk.clone(), owner_id.attribute.as_foreign_key(false))?;
                    target.add_relationship(
                        name.clone(),
                        Relationship::BelongsTo {
                            target_schema: owner_key.clone(),
                            source_attribute: fk.clone(),
                            target_attribute: owner_id.name.clone(),
                            required: false,
                        },
                    )?;
                    debug!(schema = %target.key, relationship = %name, target = %owner_key, "synthesized inverse");
                    fk
                }
            };

            let resolved = if many {
                Relationship::HasMany {
                    target_schema: declared.target,
                    source_attribute: owner_id.name,
                    target_attribute: fk,
                }
            } else {
                Relationship::HasOne {
                    target_schema: declared.target,
                    source_attribute: owner_id.name,
                    target_attribute: fk,
                }
            };
            drafts.drafts[i].relationships[slot].1 = Some(resolved);
        }
    }
    Ok(())
}
