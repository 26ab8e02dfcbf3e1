//! Output formatters for resolved schema maps.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use schemata_core::catalog::{ColumnType, DefaultValue, Generator};
use schemata_core::{FinalAttribute, FinalSchema, Relationship, SchemaMap, Value};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format a whole resolved schema map.
    fn format_schema_map(&self, map: &SchemaMap<FinalSchema>) -> String;

    /// Format a coerced value.
    fn format_value(&self, value: &Value) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_schema_map(&self, map: &SchemaMap<FinalSchema>) -> String {
        let mut sections = Vec::with_capacity(map.len());
        for (key, schema) in map.iter() {
            sections.push(format_schema_as_table(key, schema));
        }

        if sections.is_empty() {
            "No schemas".to_string()
        } else {
            sections.join("\n\n")
        }
    }

    fn format_value(&self, value: &Value) -> String {
        value.to_string()
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_schema_map(&self, map: &SchemaMap<FinalSchema>) -> String {
        // Serialize the map directly to keep declaration order.
        serde_json::to_string_pretty(map).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_value(&self, value: &Value) -> String {
        value.to_json().to_string()
    }
}

/// Format one schema as a heading plus attribute and relationship tables.
fn format_schema_as_table(key: &str, schema: &FinalSchema) -> String {
    let mut heading = format!("{} (table: {})", key, schema.table_name);
    if schema.junction {
        heading.push_str(" [junction]");
    }
    if schema.read_only {
        heading.push_str(" [read-only]");
    }

    let mut attributes = Table::new();
    attributes.set_header(vec![
        "Attribute", "Type", "Column", "Null", "Primary", "Unique", "Default",
    ]);
    attributes.add_row(attribute_row(&schema.id.name, &schema.id.attribute));
    for (name, attribute) in &schema.attributes {
        attributes.add_row(attribute_row(name, attribute));
    }

    let mut output = format!("{}\n{}", heading, attributes);

    if !schema.relationships.is_empty() {
        let mut relationships = Table::new();
        relationships.set_header(vec!["Relationship", "Type", "Target", "Keys"]);
        for (name, relationship) in &schema.relationships {
            relationships.add_row(vec![
                Cell::new(name),
                Cell::new(relationship.type_name()),
                Cell::new(relationship.target_schema()),
                Cell::new(format_keys(relationship)),
            ]);
        }
        output.push('\n');
        output.push_str(&relationships.to_string());
    }

    output
}

fn attribute_row(name: &str, attribute: &FinalAttribute) -> Vec<Cell> {
    vec![
        Cell::new(name),
        Cell::new(attribute.kind()),
        Cell::new(format_column(&attribute.orm.column)),
        Cell::new(yes_no(attribute.control.allow_null)),
        Cell::new(yes_no(attribute.control.primary)),
        Cell::new(yes_no(attribute.control.unique)),
        Cell::new(format_default(&attribute.control.default)),
    ]
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        ""
    }
}

/// Format a column type as a display string.
fn format_column(column: &ColumnType) -> String {
    match column {
        ColumnType::Boolean => "boolean".to_string(),
        ColumnType::String { length } => match length.value() {
            Some(max) => format!("string({})", max),
            None => "string".to_string(),
        },
        ColumnType::Text => "text".to_string(),
        ColumnType::Double => "double".to_string(),
        ColumnType::Integer => "integer".to_string(),
        ColumnType::Uuid => "uuid".to_string(),
        ColumnType::Enum { values } => format!("enum({})", values.join(", ")),
        ColumnType::Date => "date".to_string(),
        ColumnType::DateTime => "datetime".to_string(),
    }
}

fn format_default(default: &DefaultValue) -> String {
    match default {
        DefaultValue::Null => String::new(),
        DefaultValue::Static(value) => value.to_string(),
        DefaultValue::Generated(Generator::UuidV4) => "uuid v4".to_string(),
    }
}

/// Describe the keys joining a relationship.
fn format_keys(relationship: &Relationship) -> String {
    match relationship {
        Relationship::BelongsTo {
            source_attribute,
            target_attribute,
            required,
            ..
        } => {
            let mut keys = format!("{} -> {}", source_attribute, target_attribute);
            if *required {
                keys.push_str(" (required)");
            }
            keys
        }
        Relationship::HasOne {
            source_attribute,
            target_attribute,
            ..
        }
        | Relationship::HasMany {
            source_attribute,
            target_attribute,
            ..
        } => format!("{} <- {}", source_attribute, target_attribute),
        Relationship::HasManyThrough {
            through,
            through_source_attribute,
            through_target_attribute,
            ..
        } => format!(
            "via {} ({}, {})",
            through, through_source_attribute, through_target_attribute
        ),
    }
}
