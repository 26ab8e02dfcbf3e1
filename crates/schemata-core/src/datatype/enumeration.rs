//! Enum attributes: one string out of a fixed list.

use super::{AttributeBuilder, CommonOptions};
use crate::catalog::{PartialAttribute, PartialConstraints};
use crate::coerce::ValueRules;
use crate::error::{CoerceError, InvalidSchemaError};
use crate::value::Value;
use serde::Serialize;

/// Coercion rules for enums.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumRules {
    /// Allowed values in declaration order.
    pub values: Vec<String>,
}

impl EnumRules {
    /// Allow-list as shown in error clauses: `'a', 'b'`.
    pub fn allowed(&self) -> String {
        self.values
            .iter()
            .map(|v| format!("'{}'", v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Resolve enum constraints. The value list must not be empty.
pub fn finalize(values: &[String]) -> Result<EnumRules, InvalidSchemaError> {
    if values.is_empty() {
        return Err(InvalidSchemaError::EmptyEnum);
    }
    Ok(EnumRules {
        values: values.to_vec(),
    })
}

impl ValueRules for EnumRules {
    fn client_value(&self, value: &Value) -> Result<Value, CoerceError> {
        let s = value.as_str().ok_or(CoerceError::Type { expected: "string" })?;
        if !self.values.iter().any(|v| v == s) {
            return Err(CoerceError::NotAllowed {
                allowed: self.allowed(),
            });
        }
        Ok(Value::String(s.to_string()))
    }

    fn filter_string(&self, value: &Value) -> String {
        value.as_str().unwrap_or_default().to_string()
    }
}

/// Builder for enum attributes.
#[derive(Debug, Clone, Default)]
pub struct EnumBuilder {
    common: CommonOptions,
    values: Vec<String>,
}

/// Declare an enum attribute with its allowed values.
pub fn enumeration<I, S>(values: I) -> EnumBuilder
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    EnumBuilder {
        common: CommonOptions::default(),
        values: values.into_iter().map(Into::into).collect(),
    }
}

impl AttributeBuilder for EnumBuilder {
    fn common_mut(&mut self) -> &mut CommonOptions {
        &mut self.common
    }

    fn build(self) -> PartialAttribute {
        self.common.into_partial(PartialConstraints::Enum(self.values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership() {
        let attribute = enumeration(["a", "b"]).finalize().unwrap();

        assert_eq!(
            attribute.set_orm_property_value(Some(&Value::from("a"))),
            Ok(Value::from("a"))
        );

        let err = attribute
            .set_orm_property_value(Some(&Value::from("c")))
            .unwrap_err();
        assert_eq!(err.to_string(), "value must be one of 'a', 'b'");
    }

    #[test]
    fn test_empty_values_rejected() {
        assert_eq!(
            enumeration(Vec::<String>::new()).finalize(),
            Err(InvalidSchemaError::EmptyEnum)
        );
    }

    #[test]
    fn test_type_before_membership() {
        let attribute = enumeration(["1"]).finalize().unwrap();
        assert_eq!(
            attribute.set_client_property_value(Some(&Value::from(1))),
            Err(CoerceError::Type { expected: "string" })
        );
    }
}
