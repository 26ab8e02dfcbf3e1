//! Schema assembly: the per-schema first pass.
//!
//! Validates naming, injects the default id, applies schema-level defaults
//! and finalizes every attribute. Relationships are left for the resolver.

use crate::catalog::{AssembledSchema, Id, PartialAttribute, PartialSchema, SchemaMap};
use crate::datatype::{uuid, AttributeBuilder};
use crate::error::InvalidSchemaError;
use crate::resolve::naming::{pluralize, schema_key};
use std::collections::HashSet;
use tracing::debug;

/// Name of the injected id attribute.
pub const DEFAULT_ID: &str = "id";

/// The id injected when a schema declares none: a required primary UUID
/// with a generated default.
pub fn default_id() -> PartialAttribute {
    uuid().primary().required().generated_uuid().build()
}

/// Assemble every schema independently.
pub fn assemble(
    schemas: SchemaMap<PartialSchema>,
) -> Result<SchemaMap<AssembledSchema>, InvalidSchemaError> {
    let mut assembled = SchemaMap::new();
    for (key, schema) in schemas {
        let schema = assemble_schema(&key, schema)?;
        assembled.insert(key, schema);
    }
    Ok(assembled)
}

fn validate_name(key: &str, schema: &PartialSchema) -> Result<(), InvalidSchemaError> {
    if schema.name.is_empty() || schema.name.chars().any(|c| c.is_whitespace()) {
        return Err(InvalidSchemaError::InvalidName(schema.name.clone()));
    }
    let expected = schema.key();
    if key != expected {
        return Err(InvalidSchemaError::KeyMismatch {
            key: key.to_string(),
            expected,
        });
    }
    Ok(())
}

/// Assemble a single schema registered under `key`.
pub fn assemble_schema(key: &str, schema: PartialSchema) -> Result<AssembledSchema, InvalidSchemaError> {
    validate_name(key, &schema)?;

    let (id_name, id) = match schema.id {
        Some(Id { name, attribute }) => (name, attribute.into_primary_key()),
        None => {
            debug!(schema = key, "injecting default id");
            (DEFAULT_ID.to_string(), default_id())
        }
    };
    let id = Id {
        attribute: id
            .finalize()
            .map_err(|e| e.in_attribute(key, id_name.as_str()))?,
        name: id_name,
    };

    let mut seen = HashSet::from([id.name.clone()]);
    let mut attributes = Vec::with_capacity(schema.attributes.len());
    for (name, attribute) in schema.attributes {
        if !seen.insert(name.clone()) {
            return Err(InvalidSchemaError::DuplicateAttribute {
                schema: key.to_string(),
                attribute: name,
            });
        }
        let attribute = attribute
            .finalize()
            .map_err(|e| e.in_attribute(key, name.as_str()))?;
        attributes.push((name, attribute));
    }

    let plural_name = schema
        .plural_name
        .unwrap_or_else(|| pluralize(&schema.name));
    let table_name = schema
        .table_name
        .unwrap_or_else(|| schema_key(schema.namespace.as_deref(), &plural_name));
    let display_attribute = schema
        .display_attribute
        .unwrap_or_else(|| id.name.clone());
    if !seen.contains(&display_attribute) {
        return Err(InvalidSchemaError::UnknownDisplayAttribute {
            schema: key.to_string(),
            attribute: display_attribute,
        });
    }

    Ok(AssembledSchema {
        name: schema.name,
        namespace: schema.namespace,
        plural_name,
        table_name,
        display_attribute,
        read_only: schema.read_only.is_true(),
        id,
        attributes,
        relationships: schema.relationships,
    })
}
