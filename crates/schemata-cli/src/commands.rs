//! Subcommand implementations.

use crate::formatter::Formatter;
use clap::ValueEnum;
use schemata_core::{CoerceError, FinalSchema, SchemaMap, Value};
use thiserror::Error;

/// Command errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Manifest loading or schema resolution failed.
    #[error(transparent)]
    Schema(#[from] schemata_core::Error),

    /// The `--value` argument is not a JSON scalar.
    #[error("invalid value '{0}': expected a JSON scalar")]
    InvalidValue(String),

    /// No schema under this key.
    #[error("unknown schema '{0}'")]
    UnknownSchema(String),

    /// No attribute with this name on the schema.
    #[error("schema '{schema}' has no attribute '{attribute}'")]
    UnknownAttribute { schema: String, attribute: String },

    /// The pipeline rejected the value.
    #[error("{0}")]
    Coerce(#[from] CoerceError),
}

/// Pipeline to run for `coerce`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Stage {
    /// Client input, then its wire form.
    Client,
    /// Storage write.
    Orm,
    /// Client filter value, then its query-string form.
    ClientFilter,
    /// Raw query-string parameter.
    OrmFilter,
}

/// One-line summary of a resolved map.
pub fn check(map: &SchemaMap<FinalSchema>) -> String {
    let junctions = map.iter().filter(|(_, s)| s.junction).count();
    let attributes: usize = map.iter().map(|(_, s)| s.attribute_names().count()).sum();
    let relationships: usize = map.iter().map(|(_, s)| s.relationships.len()).sum();

    format!(
        "ok: {} schema(s) ({} junction), {} attribute(s), {} relationship(s)",
        map.len(),
        junctions,
        attributes,
        relationships
    )
}

/// Print the resolved map.
pub fn resolve(map: &SchemaMap<FinalSchema>, formatter: &dyn Formatter) -> String {
    formatter.format_schema_map(map)
}

/// Run one value through a pipeline of `schema.attribute`.
///
/// `value` is JSON for every stage except `orm-filter`, which takes the raw
/// query-string text. A missing value is passed on as undefined.
pub fn coerce(
    map: &SchemaMap<FinalSchema>,
    schema: &str,
    attribute: &str,
    value: Option<&str>,
    stage: Stage,
    formatter: &dyn Formatter,
) -> Result<String, CliError> {
    let final_schema = map
        .get(schema)
        .ok_or_else(|| CliError::UnknownSchema(schema.to_string()))?;
    let attribute = final_schema
        .attribute(attribute)
        .ok_or_else(|| CliError::UnknownAttribute {
            schema: schema.to_string(),
            attribute: attribute.to_string(),
        })?;

    match stage {
        Stage::Client => {
            let input = parse_value(value)?;
            let client = attribute.set_client_property_value(input.as_ref())?;
            let wire = attribute.serialize_client_property_value(&client);
            Ok(format!(
                "client: {}\nwire: {}",
                formatter.format_value(&client),
                formatter.format_value(&wire)
            ))
        }
        Stage::Orm => {
            let input = parse_value(value)?;
            let stored = attribute.set_orm_property_value(input.as_ref())?;
            Ok(formatter.format_value(&stored))
        }
        Stage::ClientFilter => {
            let input = parse_value(value)?;
            let client = attribute.set_client_query_filter_value(input.as_ref())?;
            Ok(attribute.serialize_client_query_filter_value(&client))
        }
        Stage::OrmFilter => {
            let raw = value.unwrap_or("undefined");
            let parsed = attribute.set_orm_query_filter_value(raw)?;
            Ok(formatter.format_value(&parsed))
        }
    }
}

fn parse_value(raw: Option<&str>) -> Result<Option<Value>, CliError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let json: serde_json::Value =
        serde_json::from_str(raw).map_err(|_| CliError::InvalidValue(raw.to_string()))?;
    Value::from_json(&json)
        .map(Some)
        .ok_or_else(|| CliError::InvalidValue(raw.to_string()))
}
