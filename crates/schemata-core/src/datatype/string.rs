//! String and text attributes.

use super::{AttributeBuilder, CommonOptions};
use crate::catalog::{Limit, PartialAttribute, PartialConstraints};
use crate::coerce::ValueRules;
use crate::error::{CoerceError, InvalidSchemaError};
use crate::value::{Numeric, Value};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;

/// Pattern used when none is declared; accepts everything.
pub const ANY_PATTERN: &str = r"^[\s\S]*$";

/// A compiled regular expression that compares by its source.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source`.
    pub fn new(source: &str) -> Result<Self, InvalidSchemaError> {
        let regex = Regex::new(source).map_err(|e| InvalidSchemaError::InvalidPattern {
            pattern: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Pattern {
            source: source.to_string(),
            regex,
        })
    }

    pub(crate) fn compiled(source: &str, regex: Regex) -> Self {
        Pattern {
            source: source.to_string(),
            regex,
        }
    }

    /// Pattern source.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check if `value` matches.
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

/// Length and pattern constraints as declared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialTextBounds {
    /// Minimum length in characters.
    pub min: Option<usize>,
    /// Maximum length in characters.
    pub max: Option<usize>,
    /// Regular expression the value must match.
    pub pattern: Option<String>,
}

/// Resolved length and pattern constraints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBounds {
    /// Minimum length in characters.
    pub min: usize,
    /// Maximum length in characters.
    pub max: Limit,
    /// Regular expression the value must match.
    pub pattern: Pattern,
}

impl TextBounds {
    /// Apply defaults: no minimum, no maximum, any content.
    pub fn resolve(partial: &PartialTextBounds) -> Result<Self, InvalidSchemaError> {
        let min = partial.min.unwrap_or(0);
        let max = Limit::from(partial.max);
        if max.is_exceeded_by(min) {
            return Err(InvalidSchemaError::InvalidBounds {
                min: Numeric(min as f64),
                max: Numeric(max.value().unwrap_or_default() as f64),
            });
        }
        let pattern = Pattern::new(partial.pattern.as_deref().unwrap_or(ANY_PATTERN))?;
        Ok(TextBounds { min, max, pattern })
    }

    /// Turn back into a declaration.
    pub fn to_partial(&self) -> PartialTextBounds {
        PartialTextBounds {
            min: Some(self.min),
            max: self.max.value(),
            pattern: Some(self.pattern.as_str().to_string()),
        }
    }

    /// Check length bounds only.
    pub fn check_length(&self, value: &str) -> Result<(), CoerceError> {
        let len = value.chars().count();
        if len < self.min {
            return Err(CoerceError::TooShort { min: self.min });
        }
        if let Limit::At(max) = self.max {
            if len > max {
                return Err(CoerceError::TooLong { max });
            }
        }
        Ok(())
    }

    /// Check length, then pattern.
    pub fn check(&self, value: &str) -> Result<(), CoerceError> {
        self.check_length(value)?;
        if !self.pattern.is_match(value) {
            return Err(CoerceError::Pattern {
                pattern: self.pattern.to_string(),
            });
        }
        Ok(())
    }
}

fn check_string(bounds: &TextBounds, value: &Value) -> Result<Value, CoerceError> {
    let s = value.as_str().ok_or(CoerceError::Type { expected: "string" })?;
    bounds.check(s)?;
    Ok(Value::String(s.to_string()))
}

/// Coercion rules for short strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringRules {
    /// Length and pattern constraints.
    #[serde(flatten)]
    pub bounds: TextBounds,
}

/// Coercion rules for long text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRules {
    /// Length and pattern constraints.
    #[serde(flatten)]
    pub bounds: TextBounds,
}

/// Resolve string constraints.
pub fn finalize_string(partial: &PartialTextBounds) -> Result<StringRules, InvalidSchemaError> {
    Ok(StringRules {
        bounds: TextBounds::resolve(partial)?,
    })
}

/// Resolve text constraints.
pub fn finalize_text(partial: &PartialTextBounds) -> Result<TextRules, InvalidSchemaError> {
    Ok(TextRules {
        bounds: TextBounds::resolve(partial)?,
    })
}

impl ValueRules for StringRules {
    fn client_value(&self, value: &Value) -> Result<Value, CoerceError> {
        check_string(&self.bounds, value)
    }

    fn filter_string(&self, value: &Value) -> String {
        value.as_str().unwrap_or_default().to_string()
    }
}

impl ValueRules for TextRules {
    fn client_value(&self, value: &Value) -> Result<Value, CoerceError> {
        check_string(&self.bounds, value)
    }

    fn filter_string(&self, value: &Value) -> String {
        value.as_str().unwrap_or_default().to_string()
    }
}

/// Builder for string attributes.
#[derive(Debug, Clone, Default)]
pub struct StringBuilder {
    common: CommonOptions,
    bounds: PartialTextBounds,
}

/// Builder for text attributes.
#[derive(Debug, Clone, Default)]
pub struct TextBuilder {
    common: CommonOptions,
    bounds: PartialTextBounds,
}

/// Declare a short string attribute.
pub fn string() -> StringBuilder {
    StringBuilder {
        common: CommonOptions::default(),
        bounds: PartialTextBounds::default(),
    }
}

/// Declare a long text attribute.
pub fn text() -> TextBuilder {
    TextBuilder {
        common: CommonOptions::default(),
        bounds: PartialTextBounds::default(),
    }
}

macro_rules! text_bound_setters {
    ($builder:ty) => {
        impl $builder {
            /// Minimum length in characters.
            pub fn min(mut self, min: usize) -> Self {
                self.bounds.min = Some(min);
                self
            }

            /// Maximum length in characters.
            pub fn max(mut self, max: usize) -> Self {
                self.bounds.max = Some(max);
                self
            }

            /// Regular expression the value must match.
            pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
                self.bounds.pattern = Some(pattern.into());
                self
            }
        }
    };
}

text_bound_setters!(StringBuilder);
text_bound_setters!(TextBuilder);

impl AttributeBuilder for StringBuilder {
    fn common_mut(&mut self) -> &mut CommonOptions {
        &mut self.common
    }

    fn build(self) -> PartialAttribute {
        self.common.into_partial(PartialConstraints::String(self.bounds))
    }
}

impl AttributeBuilder for TextBuilder {
    fn common_mut(&mut self) -> &mut CommonOptions {
        &mut self.common
    }

    fn build(self) -> PartialAttribute {
        self.common.into_partial(PartialConstraints::Text(self.bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let bounds = TextBounds::resolve(&PartialTextBounds::default()).unwrap();
        assert_eq!(bounds.min, 0);
        assert_eq!(bounds.max, Limit::Unbounded);
        assert!(bounds.check("").is_ok());
        assert!(bounds.check("multi\nline").is_ok());
    }

    #[test]
    fn test_length_counts_characters() {
        let attribute = string().min(2).max(3).finalize().unwrap();
        assert_eq!(
            attribute.set_client_property_value(Some(&Value::from("é"))),
            Err(CoerceError::TooShort { min: 2 })
        );
        assert_eq!(
            attribute.set_client_property_value(Some(&Value::from("ééé"))),
            Ok(Value::from("ééé"))
        );
        assert_eq!(
            attribute.set_client_property_value(Some(&Value::from("abcd"))),
            Err(CoerceError::TooLong { max: 3 })
        );
    }

    #[test]
    fn test_pattern_after_length() {
        let attribute = text().max(4).pattern("^[a-z]+$").finalize().unwrap();
        assert_eq!(
            attribute.set_orm_property_value(Some(&Value::from("ABCDE"))),
            Err(CoerceError::TooLong { max: 4 })
        );
        assert_eq!(
            attribute.set_orm_property_value(Some(&Value::from("AB"))),
            Err(CoerceError::Pattern {
                pattern: "^[a-z]+$".into()
            })
        );
    }

    #[test]
    fn test_invalid_declarations() {
        assert!(matches!(
            string().pattern("(").finalize(),
            Err(InvalidSchemaError::InvalidPattern { .. })
        ));
        assert!(matches!(
            string().min(5).max(2).finalize(),
            Err(InvalidSchemaError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_filter_round_trip() {
        let attribute = string().finalize().unwrap();
        let value = attribute
            .set_orm_query_filter_value("hello world")
            .unwrap();
        assert_eq!(value, Value::from("hello world"));
        assert_eq!(
            attribute.serialize_client_query_filter_value(&value),
            "hello world"
        );
    }
}
