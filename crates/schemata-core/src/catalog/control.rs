//! Control descriptors: the semantic, validation-facing side of an attribute.

use super::types::{AttributeKind, Tristate};
use crate::coerce::ValueRules;
use crate::datatype::{
    boolean, date, enumeration, number, string, uuid, BooleanRules, DateOnlyRules, DateTimeRules,
    EnumRules, IntegerRules, NumberRules, PartialRange, PartialTextBounds, StringRules, TextRules,
    UuidRules, UuidSource,
};
use crate::error::InvalidSchemaError;
use crate::value::Value;
use serde::Serialize;

/// Default value of an attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DefaultValue {
    /// No default; the attribute starts out null.
    Null,
    /// A fixed value.
    Static(Value),
    /// A value produced when a record is created.
    Generated(Generator),
}

/// Supplier of generated default values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Generator {
    /// Random (version 4) UUID.
    UuidV4,
}

impl DefaultValue {
    /// Produce the concrete default, drawing from `source` for generated values.
    pub fn materialize(&self, source: &dyn UuidSource) -> Value {
        match self {
            DefaultValue::Null => Value::Null,
            DefaultValue::Static(value) => value.clone(),
            DefaultValue::Generated(Generator::UuidV4) => Value::String(source.uuid_v4()),
        }
    }
}

/// UI hints as declared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialUi {
    /// Hide the attribute in generated UIs.
    pub hidden: Tristate,
    /// Human-readable label.
    pub display_name: Option<String>,
}

/// Resolved UI hints.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiHints {
    /// Hide the attribute in generated UIs.
    pub hidden: bool,
    /// Human-readable label; consumers fall back to the attribute name.
    pub display_name: Option<String>,
}

/// Type-specific constraints as declared.
#[derive(Debug, Clone, PartialEq)]
pub enum PartialConstraints {
    /// Boolean attribute.
    Boolean,
    /// Short string attribute.
    String(PartialTextBounds),
    /// Long text attribute.
    Text(PartialTextBounds),
    /// Floating-point attribute.
    Number(PartialRange),
    /// Integer attribute.
    Integer(PartialRange),
    /// UUID attribute; its bounds are fixed.
    Uuid,
    /// Enum attribute with its allow-list.
    Enum(Vec<String>),
    /// Date attribute with an optional granularity.
    DateOnly(Option<super::DateStep>),
    /// Date-time attribute with an optional granularity.
    DateTime(Option<super::DateStep>),
}

impl PartialConstraints {
    /// The attribute kind these constraints describe.
    pub fn kind(&self) -> AttributeKind {
        match self {
            PartialConstraints::Boolean => AttributeKind::Boolean,
            PartialConstraints::String(_) => AttributeKind::String,
            PartialConstraints::Text(_) => AttributeKind::Text,
            PartialConstraints::Number(_) => AttributeKind::Number,
            PartialConstraints::Integer(_) => AttributeKind::Integer,
            PartialConstraints::Uuid => AttributeKind::Uuid,
            PartialConstraints::Enum(_) => AttributeKind::Enum,
            PartialConstraints::DateOnly(_) => AttributeKind::DateOnly,
            PartialConstraints::DateTime(_) => AttributeKind::DateTime,
        }
    }

    /// Apply the per-type default-inference rules.
    pub fn finalize(&self) -> Result<Constraints, InvalidSchemaError> {
        Ok(match self {
            PartialConstraints::Boolean => Constraints::Boolean(boolean::finalize()),
            PartialConstraints::String(bounds) => Constraints::String(string::finalize_string(bounds)?),
            PartialConstraints::Text(bounds) => Constraints::Text(string::finalize_text(bounds)?),
            PartialConstraints::Number(range) => Constraints::Number(number::finalize_number(range)?),
            PartialConstraints::Integer(range) => {
                Constraints::Integer(number::finalize_integer(range)?)
            }
            PartialConstraints::Uuid => Constraints::Uuid(uuid::finalize()),
            PartialConstraints::Enum(values) => Constraints::Enum(enumeration::finalize(values)?),
            PartialConstraints::DateOnly(step) => Constraints::DateOnly(date::finalize_dateonly(*step)?),
            PartialConstraints::DateTime(step) => Constraints::DateTime(date::finalize_datetime(*step)),
        })
    }
}

/// Resolved type-specific constraints. The variant is the attribute kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Constraints {
    /// Boolean attribute.
    Boolean(BooleanRules),
    /// Short string attribute.
    String(StringRules),
    /// Long text attribute.
    Text(TextRules),
    /// Floating-point attribute.
    Number(NumberRules),
    /// Integer attribute.
    Integer(IntegerRules),
    /// UUID attribute.
    Uuid(UuidRules),
    /// Enum attribute.
    Enum(EnumRules),
    /// Date attribute.
    DateOnly(DateOnlyRules),
    /// Date-time attribute.
    DateTime(DateTimeRules),
}

impl Constraints {
    /// The attribute kind.
    pub fn kind(&self) -> AttributeKind {
        match self {
            Constraints::Boolean(_) => AttributeKind::Boolean,
            Constraints::String(_) => AttributeKind::String,
            Constraints::Text(_) => AttributeKind::Text,
            Constraints::Number(_) => AttributeKind::Number,
            Constraints::Integer(_) => AttributeKind::Integer,
            Constraints::Uuid(_) => AttributeKind::Uuid,
            Constraints::Enum(_) => AttributeKind::Enum,
            Constraints::DateOnly(_) => AttributeKind::DateOnly,
            Constraints::DateTime(_) => AttributeKind::DateTime,
        }
    }

    /// The coercion rules for this kind.
    pub fn rules(&self) -> &dyn ValueRules {
        match self {
            Constraints::Boolean(rules) => rules,
            Constraints::String(rules) => rules,
            Constraints::Text(rules) => rules,
            Constraints::Number(rules) => rules,
            Constraints::Integer(rules) => rules,
            Constraints::Uuid(rules) => rules,
            Constraints::Enum(rules) => rules,
            Constraints::DateOnly(rules) => rules,
            Constraints::DateTime(rules) => rules,
        }
    }

    /// Turn the resolved constraints back into a declaration.
    pub fn to_partial(&self) -> PartialConstraints {
        match self {
            Constraints::Boolean(_) => PartialConstraints::Boolean,
            Constraints::String(rules) => PartialConstraints::String(rules.bounds.to_partial()),
            Constraints::Text(rules) => PartialConstraints::Text(rules.bounds.to_partial()),
            Constraints::Number(rules) => PartialConstraints::Number(rules.range.to_partial()),
            Constraints::Integer(rules) => PartialConstraints::Integer(rules.range.to_partial()),
            Constraints::Uuid(_) => PartialConstraints::Uuid,
            Constraints::Enum(rules) => PartialConstraints::Enum(rules.values.clone()),
            Constraints::DateOnly(rules) => PartialConstraints::DateOnly(Some(rules.step)),
            Constraints::DateTime(rules) => PartialConstraints::DateTime(Some(rules.step)),
        }
    }
}

/// Control descriptor as declared.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialControl {
    /// Whether null is accepted; unset means "not specified".
    pub allow_null: Tristate,
    /// Primary key flag.
    pub primary: Tristate,
    /// Uniqueness flag.
    pub unique: Tristate,
    /// Rejects writes through the storage pipeline.
    pub read_only: Tristate,
    /// Declared default.
    pub default: Option<DefaultValue>,
    /// Type-specific constraints.
    pub constraints: PartialConstraints,
    /// UI hints.
    pub ui: PartialUi,
}

/// Resolved control descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Control {
    /// Whether null is accepted.
    pub allow_null: bool,
    /// Primary key flag.
    pub primary: bool,
    /// Uniqueness flag; always set for primary keys.
    pub unique: bool,
    /// Rejects writes through the storage pipeline.
    pub read_only: bool,
    /// Default value.
    pub default: DefaultValue,
    /// Type-specific constraints.
    pub constraints: Constraints,
    /// UI hints.
    pub ui: UiHints,
}

impl PartialControl {
    /// Resolve every optional field.
    ///
    /// Primary keys are never nullable and always unique; an explicit
    /// `allow_null = false` always wins.
    pub fn finalize(&self) -> Result<Control, InvalidSchemaError> {
        let constraints = self.constraints.finalize()?;
        let primary = self.primary.is_true();

        let default = match &self.default {
            None | Some(DefaultValue::Static(Value::Null)) => DefaultValue::Null,
            Some(default) => default.clone(),
        };
        if let DefaultValue::Static(value) = &default {
            constraints
                .rules()
                .storage_value(value)
                .map_err(InvalidSchemaError::InvalidDefault)?;
        }

        Ok(Control {
            allow_null: !self.allow_null.is_false() && !primary,
            primary,
            unique: self.unique.is_true() || primary,
            read_only: self.read_only.is_true(),
            default,
            constraints,
            ui: UiHints {
                hidden: self.ui.hidden.is_true(),
                display_name: self.ui.display_name.clone(),
            },
        })
    }
}

impl Control {
    /// Turn the resolved descriptor back into a declaration.
    pub fn to_partial(&self) -> PartialControl {
        PartialControl {
            allow_null: self.allow_null.into(),
            primary: self.primary.into(),
            unique: self.unique.into(),
            read_only: self.read_only.into(),
            default: Some(self.default.clone()),
            constraints: self.constraints.to_partial(),
            ui: PartialUi {
                hidden: self.ui.hidden.into(),
                display_name: self.ui.display_name.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DateStep;
    use crate::datatype::FixedUuid;

    fn partial(constraints: PartialConstraints) -> PartialControl {
        PartialControl {
            allow_null: Tristate::Unset,
            primary: Tristate::Unset,
            unique: Tristate::Unset,
            read_only: Tristate::Unset,
            default: None,
            constraints,
            ui: PartialUi::default(),
        }
    }

    #[test]
    fn test_unset_allow_null_resolves_to_nullable() {
        let control = partial(PartialConstraints::Boolean).finalize().unwrap();
        assert!(control.allow_null);
        assert!(!control.primary);
        assert!(!control.unique);
        assert_eq!(control.default, DefaultValue::Null);
    }

    #[test]
    fn test_primary_overrides_nullability_and_uniqueness() {
        let mut declared = partial(PartialConstraints::Uuid);
        declared.primary = Tristate::True;
        declared.allow_null = Tristate::True;
        declared.unique = Tristate::False;

        let control = declared.finalize().unwrap();
        assert!(control.primary);
        assert!(!control.allow_null);
        assert!(control.unique);
    }

    #[test]
    fn test_explicit_false_wins() {
        let mut declared = partial(PartialConstraints::Boolean);
        declared.allow_null = Tristate::False;
        assert!(!declared.finalize().unwrap().allow_null);
    }

    #[test]
    fn test_invalid_static_default_rejected() {
        let mut declared = partial(PartialConstraints::Enum(vec!["a".into()]));
        declared.default = Some(DefaultValue::Static(Value::from("b")));

        assert!(matches!(
            declared.finalize(),
            Err(InvalidSchemaError::InvalidDefault(_))
        ));
    }

    #[test]
    fn test_materialize_default() {
        let source = FixedUuid("00000000-0000-4000-8000-000000000000".into());
        assert_eq!(DefaultValue::Null.materialize(&source), Value::Null);
        assert_eq!(
            DefaultValue::Generated(Generator::UuidV4).materialize(&source),
            Value::from("00000000-0000-4000-8000-000000000000")
        );
    }

    #[test]
    fn test_round_trip_through_partial() {
        let mut declared = partial(PartialConstraints::DateOnly(None));
        declared.ui.hidden = Tristate::True;
        let control = declared.finalize().unwrap();

        assert_eq!(
            control.to_partial().constraints,
            PartialConstraints::DateOnly(Some(DateStep::Day))
        );
        assert_eq!(control.to_partial().finalize().unwrap(), control);
    }
}
