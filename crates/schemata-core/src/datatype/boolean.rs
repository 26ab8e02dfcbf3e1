//! Boolean attributes.

use super::{AttributeBuilder, CommonOptions};
use crate::catalog::{PartialAttribute, PartialConstraints};
use crate::coerce::ValueRules;
use crate::error::CoerceError;
use crate::value::Value;
use serde::Serialize;

/// Coercion rules for booleans. There are no domain constraints.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BooleanRules {}

/// Resolve boolean constraints.
pub fn finalize() -> BooleanRules {
    BooleanRules {}
}

impl ValueRules for BooleanRules {
    fn client_value(&self, value: &Value) -> Result<Value, CoerceError> {
        match value {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            _ => Err(CoerceError::Type {
                expected: "boolean",
            }),
        }
    }

    fn filter_string(&self, value: &Value) -> String {
        value.to_string()
    }

    fn parse_filter(&self, raw: &str) -> Result<Value, CoerceError> {
        match raw {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(CoerceError::Type {
                expected: "boolean",
            }),
        }
    }
}

/// Builder for boolean attributes.
#[derive(Debug, Clone, Default)]
pub struct BooleanBuilder {
    common: CommonOptions,
}

/// Declare a boolean attribute.
pub fn boolean() -> BooleanBuilder {
    BooleanBuilder {
        common: CommonOptions::default(),
    }
}

impl AttributeBuilder for BooleanBuilder {
    fn common_mut(&mut self) -> &mut CommonOptions {
        &mut self.common
    }

    fn build(self) -> PartialAttribute {
        self.common.into_partial(PartialConstraints::Boolean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_pipeline() {
        let attribute = boolean().finalize().unwrap();

        assert_eq!(
            attribute.set_orm_property_value(Some(&Value::from(true))),
            Ok(Value::from(true))
        );
        assert_eq!(
            attribute.set_client_property_value(Some(&Value::from("true"))),
            Err(CoerceError::Type {
                expected: "boolean"
            })
        );
        assert_eq!(
            attribute.serialize_client_query_filter_value(&Value::from(false)),
            "false"
        );
    }

    #[test]
    fn test_boolean_filter_parsing() {
        let attribute = boolean().finalize().unwrap();
        assert_eq!(
            attribute.set_orm_query_filter_value("true"),
            Ok(Value::from(true))
        );
        assert_eq!(
            attribute.set_orm_query_filter_value("yes"),
            Err(CoerceError::Type {
                expected: "boolean"
            })
        );
    }
}
