//! UUID attributes and the UUID supplier used for generated defaults.

use super::string::{Pattern, TextBounds};
use super::{AttributeBuilder, CommonOptions};
use crate::catalog::{Limit, PartialAttribute, PartialConstraints};
use crate::coerce::ValueRules;
use crate::error::CoerceError;
use crate::value::Value;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Length of a canonical hyphenated UUID.
pub const UUID_LENGTH: usize = 36;

/// Canonical hyphenated UUID, any case.
pub const UUID_PATTERN: &str =
    r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$";

static UUID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(UUID_PATTERN).expect("uuid pattern compiles"));

/// Produces UUID-v4 strings for generated defaults.
pub trait UuidSource: Send + Sync {
    /// A fresh version 4 UUID in canonical form.
    fn uuid_v4(&self) -> String;
}

/// Random UUIDs from the operating system's generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUuid;

impl UuidSource for RandomUuid {
    fn uuid_v4(&self) -> String {
        ::uuid::Uuid::new_v4().to_string()
    }
}

/// Always the same UUID. Useful for reproducible output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedUuid(pub String);

impl UuidSource for FixedUuid {
    fn uuid_v4(&self) -> String {
        self.0.clone()
    }
}

/// Coercion rules for UUIDs. Bounds are fixed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UuidRules {
    /// Fixed length and canonical pattern.
    #[serde(flatten)]
    pub bounds: TextBounds,
}

/// Resolve UUID constraints.
pub fn finalize() -> UuidRules {
    UuidRules {
        bounds: TextBounds {
            min: UUID_LENGTH,
            max: Limit::At(UUID_LENGTH),
            pattern: Pattern::compiled(UUID_PATTERN, UUID_REGEX.clone()),
        },
    }
}

impl ValueRules for UuidRules {
    fn client_value(&self, value: &Value) -> Result<Value, CoerceError> {
        let s = value.as_str().ok_or(CoerceError::Type { expected: "string" })?;
        self.bounds.check_length(s)?;
        if !self.bounds.pattern.is_match(s) {
            return Err(CoerceError::Format { format: "uuid" });
        }
        Ok(Value::String(s.to_string()))
    }

    fn filter_string(&self, value: &Value) -> String {
        value.as_str().unwrap_or_default().to_string()
    }
}

/// Builder for UUID attributes.
#[derive(Debug, Clone, Default)]
pub struct UuidBuilder {
    common: CommonOptions,
}

/// Declare a UUID attribute.
pub fn uuid() -> UuidBuilder {
    UuidBuilder {
        common: CommonOptions::default(),
    }
}

impl AttributeBuilder for UuidBuilder {
    fn common_mut(&mut self) -> &mut CommonOptions {
        &mut self.common
    }

    fn build(self) -> PartialAttribute {
        self.common.into_partial(PartialConstraints::Uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "6f9619ff-8b86-4011-b42d-00c04fc964ff";

    #[test]
    fn test_length_and_format_are_distinct() {
        let attribute = uuid().finalize().unwrap();

        assert_eq!(
            attribute.set_orm_property_value(Some(&Value::from(ID))),
            Ok(Value::from(ID))
        );
        assert_eq!(
            attribute.set_orm_property_value(Some(&Value::from("6f9619ff"))),
            Err(CoerceError::TooShort { min: 36 })
        );
        assert_eq!(
            attribute.set_orm_property_value(Some(&Value::from(
                "6f9619ff-8b86-4011-b42d-00c04fc964ffff"
            ))),
            Err(CoerceError::TooLong { max: 36 })
        );
        assert_eq!(
            attribute.set_orm_property_value(Some(&Value::from(
                "zf9619ff-8b86-4011-b42d-00c04fc964ff"
            ))),
            Err(CoerceError::Format { format: "uuid" })
        );
    }

    #[test]
    fn test_random_uuid_is_canonical() {
        let rules = finalize();
        let generated = RandomUuid.uuid_v4();
        assert!(rules.client_value(&Value::String(generated)).is_ok());
    }

    #[test]
    fn test_fixed_uuid() {
        let source = FixedUuid(ID.into());
        assert_eq!(source.uuid_v4(), ID);
        assert_eq!(source.uuid_v4(), source.uuid_v4());
    }
}
