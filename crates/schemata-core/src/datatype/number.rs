//! Number and integer attributes.

use super::{AttributeBuilder, CommonOptions};
use crate::catalog::{PartialAttribute, PartialConstraints};
use crate::coerce::ValueRules;
use crate::error::{CoerceError, InvalidSchemaError};
use crate::value::{Numeric, Value};
use serde::Serialize;

/// Largest integer a double represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Range constraints as declared.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PartialRange {
    /// Inclusive minimum.
    pub min: Option<f64>,
    /// Inclusive maximum.
    pub max: Option<f64>,
    /// Values must be exact multiples of this; zero disables the check.
    pub step: Option<f64>,
}

/// Resolved range constraints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range {
    /// Inclusive minimum.
    pub min: Numeric,
    /// Inclusive maximum.
    pub max: Numeric,
    /// Multiple-of constraint; zero means none.
    pub step: Numeric,
}

impl Range {
    fn resolve(partial: &PartialRange, default_step: f64) -> Result<Self, InvalidSchemaError> {
        let min = partial.min.unwrap_or(f64::NEG_INFINITY);
        let max = partial.max.unwrap_or(f64::INFINITY);
        let step = partial.step.unwrap_or(default_step);

        if min.is_nan() || max.is_nan() || min > max {
            return Err(InvalidSchemaError::InvalidBounds {
                min: Numeric(min),
                max: Numeric(max),
            });
        }
        if !step.is_finite() || step < 0.0 {
            return Err(InvalidSchemaError::InvalidStep(Numeric(step)));
        }

        Ok(Range {
            min: Numeric(min),
            max: Numeric(max),
            step: Numeric(step),
        })
    }

    /// Turn back into a declaration.
    pub fn to_partial(&self) -> PartialRange {
        PartialRange {
            min: Some(self.min.0),
            max: Some(self.max.0),
            step: Some(self.step.0),
        }
    }

    /// Range, then step.
    pub fn check(&self, n: f64) -> Result<(), CoerceError> {
        if n < self.min.0 {
            return Err(CoerceError::BelowMinimum { min: self.min });
        }
        if n > self.max.0 {
            return Err(CoerceError::AboveMaximum { max: self.max });
        }
        let step = self.step.0;
        if step > 0.0 && n % step != 0.0 {
            return Err(CoerceError::Step { step: self.step });
        }
        Ok(())
    }
}

fn check_number(range: &Range, value: &Value, integer: bool) -> Result<Value, CoerceError> {
    let n = value
        .as_f64()
        .filter(|n| !n.is_nan())
        .ok_or(CoerceError::Type { expected: "number" })?;

    if !n.is_finite() {
        return Err(CoerceError::NotFinite);
    }
    if integer && n.abs() > MAX_SAFE_INTEGER {
        return Err(CoerceError::UnsafeInteger);
    }
    range.check(n)?;
    if integer && n.fract() != 0.0 {
        return Err(CoerceError::Step {
            step: Numeric(1.0),
        });
    }

    Ok(Value::Number(n))
}

fn parse_number(raw: &str) -> Result<Value, CoerceError> {
    raw.trim()
        .parse::<f64>()
        .map(Value::Number)
        .map_err(|_| CoerceError::Type { expected: "number" })
}

fn number_filter_string(value: &Value) -> String {
    value.as_f64().map(|n| Numeric(n).to_string()).unwrap_or_default()
}

/// Coercion rules for floating-point numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberRules {
    /// Range constraints.
    #[serde(flatten)]
    pub range: Range,
}

/// Coercion rules for integers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegerRules {
    /// Range constraints. Step defaults to 1; fractional values are rejected under any step.
    #[serde(flatten)]
    pub range: Range,
}

/// Resolve number constraints. No step by default.
pub fn finalize_number(partial: &PartialRange) -> Result<NumberRules, InvalidSchemaError> {
    Ok(NumberRules {
        range: Range::resolve(partial, 0.0)?,
    })
}

/// Resolve integer constraints. Step defaults to 1, which enforces integrality.
pub fn finalize_integer(partial: &PartialRange) -> Result<IntegerRules, InvalidSchemaError> {
    Ok(IntegerRules {
        range: Range::resolve(partial, 1.0)?,
    })
}

impl ValueRules for NumberRules {
    fn client_value(&self, value: &Value) -> Result<Value, CoerceError> {
        check_number(&self.range, value, false)
    }

    fn filter_string(&self, value: &Value) -> String {
        number_filter_string(value)
    }

    fn parse_filter(&self, raw: &str) -> Result<Value, CoerceError> {
        self.storage_value(&parse_number(raw)?)
    }
}

impl ValueRules for IntegerRules {
    fn client_value(&self, value: &Value) -> Result<Value, CoerceError> {
        check_number(&self.range, value, true)
    }

    fn filter_string(&self, value: &Value) -> String {
        number_filter_string(value)
    }

    fn parse_filter(&self, raw: &str) -> Result<Value, CoerceError> {
        self.storage_value(&parse_number(raw)?)
    }
}

/// Builder for number attributes.
#[derive(Debug, Clone, Default)]
pub struct NumberBuilder {
    common: CommonOptions,
    range: PartialRange,
}

/// Builder for integer attributes.
#[derive(Debug, Clone, Default)]
pub struct IntegerBuilder {
    common: CommonOptions,
    range: PartialRange,
}

/// Declare a floating-point attribute.
pub fn number() -> NumberBuilder {
    NumberBuilder {
        common: CommonOptions::default(),
        range: PartialRange::default(),
    }
}

/// Declare an integer attribute.
pub fn integer() -> IntegerBuilder {
    IntegerBuilder {
        common: CommonOptions::default(),
        range: PartialRange::default(),
    }
}

macro_rules! range_setters {
    ($builder:ty) => {
        impl $builder {
            /// Inclusive minimum.
            pub fn min(mut self, min: f64) -> Self {
                self.range.min = Some(min);
                self
            }

            /// Inclusive maximum.
            pub fn max(mut self, max: f64) -> Self {
                self.range.max = Some(max);
                self
            }

            /// Values must be exact multiples of `step`.
            pub fn step(mut self, step: f64) -> Self {
                self.range.step = Some(step);
                self
            }
        }
    };
}

range_setters!(NumberBuilder);
range_setters!(IntegerBuilder);

impl AttributeBuilder for NumberBuilder {
    fn common_mut(&mut self) -> &mut CommonOptions {
        &mut self.common
    }

    fn build(self) -> PartialAttribute {
        self.common.into_partial(PartialConstraints::Number(self.range))
    }
}

impl AttributeBuilder for IntegerBuilder {
    fn common_mut(&mut self) -> &mut CommonOptions {
        &mut self.common
    }

    fn build(self) -> PartialAttribute {
        self.common.into_partial(PartialConstraints::Integer(self.range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(attribute: &crate::catalog::FinalAttribute, n: f64) -> Result<Value, CoerceError> {
        attribute.set_orm_property_value(Some(&Value::Number(n)))
    }

    #[test]
    fn test_range_clauses() {
        let attribute = number().min(1.0).max(10.0).finalize().unwrap();

        let err = set(&attribute, 0.0).unwrap_err();
        assert_eq!(err.to_string(), "value must be greater than or equal to 1");
        let err = set(&attribute, 10.1).unwrap_err();
        assert_eq!(err.to_string(), "value must be less than or equal to 10");

        for ok in [1.0, 10.0, 5.5] {
            assert_eq!(set(&attribute, ok), Ok(Value::Number(ok)));
        }
    }

    #[test]
    fn test_non_finite_and_nan() {
        let attribute = number().finalize().unwrap();
        assert_eq!(set(&attribute, f64::INFINITY), Err(CoerceError::NotFinite));
        assert_eq!(
            set(&attribute, f64::NAN),
            Err(CoerceError::Type { expected: "number" })
        );
    }

    #[test]
    fn test_integer_step_and_safety() {
        let attribute = integer().finalize().unwrap();
        assert_eq!(
            set(&attribute, 1.5),
            Err(CoerceError::Step {
                step: Numeric(1.0)
            })
        );
        assert_eq!(set(&attribute, 1e16), Err(CoerceError::UnsafeInteger));
        assert_eq!(set(&attribute, -42.0), Ok(Value::Number(-42.0)));
    }

    #[test]
    fn test_integer_rejects_fractions_under_any_step() {
        for step in [0.5, 0.0] {
            let attribute = integer().step(step).finalize().unwrap();
            assert_eq!(
                set(&attribute, 1.5),
                Err(CoerceError::Step {
                    step: Numeric(1.0)
                })
            );
            assert_eq!(
                attribute.set_orm_query_filter_value("2.25"),
                Err(CoerceError::Step {
                    step: Numeric(1.0)
                })
            );
            assert_eq!(set(&attribute, 3.0), Ok(Value::Number(3.0)));
        }
    }

    #[test]
    fn test_declared_step() {
        let attribute = number().step(0.25).finalize().unwrap();
        assert!(set(&attribute, 1.75).is_ok());
        assert_eq!(
            set(&attribute, 1.3).unwrap_err().to_string(),
            "value must be a multiple of 0.25"
        );
    }

    #[test]
    fn test_invalid_declarations() {
        assert!(matches!(
            number().min(5.0).max(1.0).finalize(),
            Err(InvalidSchemaError::InvalidBounds { .. })
        ));
        assert!(matches!(
            integer().step(-1.0).finalize(),
            Err(InvalidSchemaError::InvalidStep(_))
        ));
    }

    #[test]
    fn test_filter_parsing() {
        let attribute = integer().min(0.0).finalize().unwrap();
        assert_eq!(
            attribute.set_orm_query_filter_value(" 12 "),
            Ok(Value::Number(12.0))
        );
        assert_eq!(
            attribute.set_orm_query_filter_value("twelve"),
            Err(CoerceError::Type { expected: "number" })
        );
        assert_eq!(
            attribute.set_orm_query_filter_value("-1"),
            Err(CoerceError::BelowMinimum {
                min: Numeric(0.0)
            })
        );
        assert_eq!(
            attribute.serialize_client_query_filter_value(&Value::Number(12.0)),
            "12"
        );
    }
}
