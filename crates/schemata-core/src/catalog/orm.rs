//! Storage descriptors: the persistence-facing side of an attribute.

use super::control::{Constraints, Control, DefaultValue};
use super::types::{Limit, Tristate};
use serde::Serialize;

/// Physical column type an attribute maps to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ColumnType {
    /// Boolean column.
    Boolean,
    /// Variable-length string with an optional maximum length.
    String {
        /// Maximum length in characters.
        length: Limit,
    },
    /// Unbounded text.
    Text,
    /// Double precision float.
    Double,
    /// Integer.
    Integer,
    /// UUID.
    Uuid,
    /// Enumerated string.
    Enum {
        /// Allowed values.
        values: Vec<String>,
    },
    /// Calendar date.
    Date,
    /// Timestamp.
    DateTime,
}

impl ColumnType {
    /// Derive the column type from resolved constraints.
    pub fn for_constraints(constraints: &Constraints) -> Self {
        match constraints {
            Constraints::Boolean(_) => ColumnType::Boolean,
            Constraints::String(rules) => ColumnType::String {
                length: rules.bounds.max,
            },
            Constraints::Text(_) => ColumnType::Text,
            Constraints::Number(_) => ColumnType::Double,
            Constraints::Integer(_) => ColumnType::Integer,
            Constraints::Uuid(_) => ColumnType::Uuid,
            Constraints::Enum(rules) => ColumnType::Enum {
                values: rules.values.clone(),
            },
            Constraints::DateOnly(_) => ColumnType::Date,
            Constraints::DateTime(_) => ColumnType::DateTime,
        }
    }
}

/// Storage descriptor as declared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialOrm {
    /// Column nullability.
    pub allow_null: Tristate,
    /// Primary key column.
    pub primary: Tristate,
    /// Unique constraint.
    pub unique: Tristate,
    /// Secondary index.
    pub index: Tristate,
    /// Column default; falls back to the control default.
    pub default: Option<DefaultValue>,
}

/// Resolved storage descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Orm {
    /// Physical column type.
    pub column: ColumnType,
    /// Column nullability.
    pub allow_null: bool,
    /// Primary key column.
    pub primary: bool,
    /// Unique constraint.
    pub unique: bool,
    /// Secondary index.
    pub index: bool,
    /// Column default.
    pub default: DefaultValue,
}

impl PartialOrm {
    /// Resolve every optional field against the finalized control descriptor.
    pub fn finalize(&self, control: &Control) -> Orm {
        let primary = self.primary.is_true() || control.primary;
        Orm {
            column: ColumnType::for_constraints(&control.constraints),
            allow_null: !self.allow_null.is_false() && !primary,
            primary,
            unique: self.unique.is_true() || primary,
            index: self.index.is_true(),
            default: self
                .default
                .clone()
                .unwrap_or_else(|| control.default.clone()),
        }
    }
}

impl Orm {
    /// Turn the resolved descriptor back into a declaration.
    pub fn to_partial(&self) -> PartialOrm {
        PartialOrm {
            allow_null: self.allow_null.into(),
            primary: self.primary.into(),
            unique: self.unique.into(),
            index: self.index.into(),
            default: Some(self.default.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PartialConstraints, PartialControl, PartialUi};
    use crate::datatype::PartialTextBounds;

    fn control(constraints: PartialConstraints, primary: bool) -> Control {
        PartialControl {
            allow_null: Tristate::Unset,
            primary: primary.into(),
            unique: Tristate::Unset,
            read_only: Tristate::Unset,
            default: None,
            constraints,
            ui: PartialUi::default(),
        }
        .finalize()
        .unwrap()
    }

    #[test]
    fn test_column_type_follows_constraints() {
        let bounds = PartialTextBounds {
            max: Some(80),
            ..Default::default()
        };
        let orm = PartialOrm::default().finalize(&control(PartialConstraints::String(bounds), false));

        assert_eq!(
            orm.column,
            ColumnType::String {
                length: Limit::At(80)
            }
        );
        assert!(orm.allow_null);
        assert!(!orm.unique);
    }

    #[test]
    fn test_primary_column() {
        let orm = PartialOrm {
            allow_null: Tristate::True,
            ..Default::default()
        }
        .finalize(&control(PartialConstraints::Uuid, true));

        assert!(orm.primary);
        assert!(!orm.allow_null);
        assert!(orm.unique);
        assert_eq!(orm.column, ColumnType::Uuid);
    }

    #[test]
    fn test_default_falls_back_to_control() {
        let control = control(PartialConstraints::Boolean, false);
        let orm = PartialOrm::default().finalize(&control);
        assert_eq!(orm.default, control.default);
        assert_eq!(orm.to_partial().finalize(&control), orm);
    }
}
