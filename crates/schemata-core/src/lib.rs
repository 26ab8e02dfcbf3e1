//! Schemata Core - schema expansion engine.
//!
//! Turns lightly specified schema declarations into fully resolved schema
//! definitions in two passes:
//!
//! - [`assemble`] works on each schema alone: naming, default id and
//!   attribute finalization.
//! - [`resolve`] works across schemas: relationship targets, foreign keys,
//!   inverse relationships and junction schemas.
//!
//! Every resolved attribute carries the coercion pipelines converting values
//! between client, wire and storage form.
//!
//! ```
//! use schemata_core::catalog::{belongs_to, has_many, PartialSchema, SchemaMap};
//! use schemata_core::datatype::{string, AttributeBuilder};
//!
//! let mut schemas = SchemaMap::new();
//! schemas.declare(
//!     PartialSchema::new("Todo")
//!         .with_attribute("title", string().required())
//!         .with_relationship("user", belongs_to()),
//! );
//! schemas.declare(PartialSchema::new("User").with_relationship("todos", has_many()));
//!
//! let resolved = schemata_core::build(schemas).unwrap();
//! assert!(resolved.get("Todo").unwrap().attribute("userId").is_some());
//! ```

pub mod assemble;
pub mod catalog;
pub mod coerce;
pub mod datatype;
pub mod error;
pub mod manifest;
pub mod resolve;
pub mod value;

pub use assemble::assemble;
pub use catalog::{
    AssembledSchema, AttributeKind, FinalAttribute, FinalSchema, PartialAttribute, PartialSchema,
    Relationship, SchemaMap,
};
pub use error::{CoerceError, Error, InvalidSchemaError, ManifestError, Result};
pub use manifest::Manifest;
pub use resolve::resolve;
pub use value::Value;

use std::path::Path;
use tracing::info;

/// Assemble and resolve a declared schema map.
pub fn build(schemas: SchemaMap<PartialSchema>) -> Result<SchemaMap<FinalSchema>> {
    let declared = schemas.len();
    let resolved = resolve(assemble(schemas)?)?;

    let junctions = resolved.iter().filter(|(_, s)| s.junction).count();
    let relationships: usize = resolved.iter().map(|(_, s)| s.relationships.len()).sum();
    info!(
        schemas = declared,
        junctions,
        relationships,
        "schema map resolved"
    );

    Ok(resolved)
}

/// Load a manifest file and build it.
pub fn build_manifest(path: impl AsRef<Path>) -> Result<SchemaMap<FinalSchema>> {
    let schemas = Manifest::from_path(path)?.into_schema_map()?;
    build(schemas)
}
