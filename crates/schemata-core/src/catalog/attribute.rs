//! Attribute definitions.

use super::control::{Control, DefaultValue, PartialControl};
use super::orm::{Orm, PartialOrm};
use super::types::{AttributeKind, Tristate};
use crate::coerce;
use crate::datatype::UuidSource;
use crate::error::{CoerceError, InvalidSchemaError};
use crate::value::Value;
use serde::Serialize;

/// An attribute as declared: both descriptors may leave fields unset.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialAttribute {
    /// Semantic descriptor.
    pub control: PartialControl,
    /// Storage descriptor.
    pub orm: PartialOrm,
}

impl PartialAttribute {
    /// The attribute kind.
    pub fn kind(&self) -> AttributeKind {
        self.control.constraints.kind()
    }

    /// Mark as the schema's primary key.
    pub fn into_primary_key(mut self) -> Self {
        self.control.primary = Tristate::True;
        self.control.allow_null = Tristate::False;
        self.orm.primary = Tristate::True;
        self.orm.allow_null = Tristate::False;
        self
    }

    /// Resolve every optional field. Pure and idempotent.
    pub fn finalize(&self) -> Result<FinalAttribute, InvalidSchemaError> {
        let control = self.control.finalize()?;
        let orm = self.orm.finalize(&control);
        Ok(FinalAttribute { control, orm })
    }
}

/// A fully resolved attribute.
///
/// Coercion is plain data plus free functions: every pipeline method below
/// only reads the finalized control descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalAttribute {
    /// Semantic descriptor.
    pub control: Control,
    /// Storage descriptor.
    pub orm: Orm,
}

impl FinalAttribute {
    /// The attribute kind.
    pub fn kind(&self) -> AttributeKind {
        self.control.constraints.kind()
    }

    /// Turn back into a declaration that finalizes to `self`.
    pub fn to_partial(&self) -> PartialAttribute {
        PartialAttribute {
            control: self.control.to_partial(),
            orm: self.orm.to_partial(),
        }
    }

    /// Clone as a foreign key referencing this attribute.
    ///
    /// The copy is hidden, not a key in its own right and has no default.
    /// It is nullable unless `required`.
    pub fn as_foreign_key(&self, required: bool) -> FinalAttribute {
        let mut fk = self.clone();

        fk.control.primary = false;
        fk.control.unique = false;
        fk.control.read_only = false;
        fk.control.allow_null = !required;
        fk.control.default = DefaultValue::Null;
        fk.control.ui.hidden = true;

        fk.orm.primary = false;
        fk.orm.unique = false;
        fk.orm.allow_null = !required;
        fk.orm.default = DefaultValue::Null;

        fk
    }

    /// Concrete default for a new record.
    pub fn default_value(&self, source: &dyn UuidSource) -> Value {
        self.control.default.materialize(source)
    }

    /// Raw external input to a validated client value.
    pub fn set_client_property_value(&self, value: Option<&Value>) -> Result<Value, CoerceError> {
        coerce::set_client_property_value(&self.control, value)
    }

    /// Validated client value to its wire form.
    pub fn serialize_client_property_value(&self, value: &Value) -> Value {
        coerce::serialize_client_property_value(&self.control, value)
    }

    /// Raw query-filter input to a validated client value.
    pub fn set_client_query_filter_value(
        &self,
        value: Option<&Value>,
    ) -> Result<Value, CoerceError> {
        coerce::set_client_query_filter_value(&self.control, value)
    }

    /// Validated client filter value to its query-string form.
    pub fn serialize_client_query_filter_value(&self, value: &Value) -> String {
        coerce::serialize_client_query_filter_value(&self.control, value)
    }

    /// Server response value to a client value.
    pub fn set_client_property_value_from_response(
        &self,
        value: Option<&Value>,
    ) -> Result<Value, CoerceError> {
        coerce::set_client_property_value_from_response(&self.control, value)
    }

    /// API payload value to a storage value.
    pub fn set_orm_property_value(&self, value: Option<&Value>) -> Result<Value, CoerceError> {
        coerce::set_orm_property_value(&self.control, value)
    }

    /// Query-string parameter to a storage-typed filter value.
    pub fn set_orm_query_filter_value(&self, raw: &str) -> Result<Value, CoerceError> {
        coerce::set_orm_query_filter_value(&self.control, raw)
    }

    /// Storage value to the value returned to the caller.
    pub fn serialize_orm_property_value(&self, value: &Value) -> Value {
        coerce::serialize_orm_property_value(&self.control, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::{integer, string, uuid, AttributeBuilder, FixedUuid};

    #[test]
    fn test_finalize_is_idempotent() {
        let attribute = string().required().min(2).max(10).build();
        let first = attribute.finalize().unwrap();
        let second = first.to_partial().finalize().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_into_primary_key() {
        let id = integer().build().into_primary_key().finalize().unwrap();
        assert!(id.control.primary);
        assert!(!id.control.allow_null);
        assert!(id.control.unique);
        assert!(id.orm.primary);
    }

    #[test]
    fn test_as_foreign_key() {
        let id = uuid()
            .primary()
            .generated_uuid()
            .build()
            .finalize()
            .unwrap();

        let optional = id.as_foreign_key(false);
        assert!(!optional.control.primary);
        assert!(!optional.control.unique);
        assert!(optional.control.allow_null);
        assert!(optional.control.ui.hidden);
        assert_eq!(optional.control.default, DefaultValue::Null);
        assert_eq!(optional.kind(), AttributeKind::Uuid);

        let required = id.as_foreign_key(true);
        assert!(!required.control.allow_null);
        assert!(!required.orm.allow_null);
    }

    #[test]
    fn test_default_value() {
        let id = uuid().primary().generated_uuid().build().finalize().unwrap();
        let source = FixedUuid("6f9619ff-8b86-4011-b42d-00c04fc964ff".into());
        assert_eq!(
            id.default_value(&source),
            Value::from("6f9619ff-8b86-4011-b42d-00c04fc964ff")
        );
    }
}
