//! Schema definitions at each compilation stage.

use super::attribute::{FinalAttribute, PartialAttribute};
use super::map::serialize_entries;
use super::relation::{PartialRelationship, Relationship};
use super::types::Tristate;
use crate::resolve::naming::schema_key;
use serde::Serialize;

/// The id attribute of a schema together with its name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Id<A> {
    /// Attribute name.
    pub name: String,
    /// The attribute itself.
    #[serde(flatten)]
    pub attribute: A,
}

/// A schema as declared.
///
/// ```
/// use schemata_core::catalog::{belongs_to, PartialSchema};
/// use schemata_core::datatype::{string, AttributeBuilder};
///
/// let todo = PartialSchema::new("Todo")
///     .with_attribute("title", string().required())
///     .with_relationship("user", belongs_to());
/// assert_eq!(todo.key(), "Todo");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PartialSchema {
    /// Entity name, e.g. `Todo`.
    pub name: String,
    /// Optional namespace prefixed to the key and table name.
    pub namespace: Option<String>,
    /// Plural form; derived from the name when unset.
    pub plural_name: Option<String>,
    /// Storage table; derived from namespace and plural name when unset.
    pub table_name: Option<String>,
    /// Attribute used to label records; the id when unset.
    pub display_attribute: Option<String>,
    /// Schema-wide read-only flag.
    pub read_only: Tristate,
    /// Explicit id attribute; a generated UUID id is injected when unset.
    pub id: Option<Id<PartialAttribute>>,
    /// Attributes in declaration order.
    pub attributes: Vec<(String, PartialAttribute)>,
    /// Relationships in declaration order.
    pub relationships: Vec<(String, PartialRelationship)>,
}

impl PartialSchema {
    /// Start a schema declaration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            plural_name: None,
            table_name: None,
            display_attribute: None,
            read_only: Tristate::Unset,
            id: None,
            attributes: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// Place the schema in a namespace.
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Override the plural name.
    pub fn with_plural_name(mut self, plural: impl Into<String>) -> Self {
        self.plural_name = Some(plural.into());
        self
    }

    /// Override the table name.
    pub fn with_table_name(mut self, table: impl Into<String>) -> Self {
        self.table_name = Some(table.into());
        self
    }

    /// Set the display attribute.
    pub fn with_display_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.display_attribute = Some(attribute.into());
        self
    }

    /// Mark the whole schema read-only.
    pub fn read_only(mut self) -> Self {
        self.read_only = Tristate::True;
        self
    }

    /// Declare an explicit id attribute. It is always made the primary key.
    pub fn with_id(mut self, name: impl Into<String>, attribute: impl Into<PartialAttribute>) -> Self {
        self.id = Some(Id {
            name: name.into(),
            attribute: attribute.into(),
        });
        self
    }

    /// Add an attribute.
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        attribute: impl Into<PartialAttribute>,
    ) -> Self {
        self.attributes.push((name.into(), attribute.into()));
        self
    }

    /// Add a relationship.
    pub fn with_relationship(
        mut self,
        name: impl Into<String>,
        relationship: impl Into<PartialRelationship>,
    ) -> Self {
        self.relationships.push((name.into(), relationship.into()));
        self
    }

    /// The key this schema must be registered under.
    pub fn key(&self) -> String {
        schema_key(self.namespace.as_deref(), &self.name)
    }
}

/// A schema after assembly: attributes final, relationships still declared.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledSchema {
    /// Entity name.
    pub name: String,
    /// Namespace, if any.
    pub namespace: Option<String>,
    /// Plural form of the name.
    pub plural_name: String,
    /// Storage table.
    pub table_name: String,
    /// Attribute used to label records.
    pub display_attribute: String,
    /// Schema-wide read-only flag.
    pub read_only: bool,
    /// Primary key attribute.
    pub id: Id<FinalAttribute>,
    /// Attributes in declaration order.
    #[serde(serialize_with = "serialize_entries")]
    pub attributes: Vec<(String, FinalAttribute)>,
    /// Relationships in declaration order, unresolved.
    #[serde(skip)]
    pub relationships: Vec<(String, PartialRelationship)>,
}

/// A fully resolved schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalSchema {
    /// Entity name.
    pub name: String,
    /// Namespace, if any.
    pub namespace: Option<String>,
    /// Plural form of the name.
    pub plural_name: String,
    /// Storage table.
    pub table_name: String,
    /// Attribute used to label records.
    pub display_attribute: String,
    /// Schema-wide read-only flag.
    pub read_only: bool,
    /// Synthesized to back a many-to-many relationship.
    pub junction: bool,
    /// Primary key attribute.
    pub id: Id<FinalAttribute>,
    /// Declared attributes, then synthesized foreign keys.
    #[serde(serialize_with = "serialize_entries")]
    pub attributes: Vec<(String, FinalAttribute)>,
    /// Declared relationships, then synthesized ones.
    #[serde(serialize_with = "serialize_entries")]
    pub relationships: Vec<(String, Relationship)>,
}

impl FinalSchema {
    /// Look up an attribute by name, the id included.
    pub fn attribute(&self, name: &str) -> Option<&FinalAttribute> {
        if self.id.name == name {
            return Some(&self.id.attribute);
        }
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, a)| a)
    }

    /// Look up a relationship by name.
    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r)
    }

    /// Attribute names, the id first.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id.name.as_str()).chain(self.attributes.iter().map(|(n, _)| n.as_str()))
    }
}
