//! Core type definitions for the catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An optional boolean that keeps "not specified" apart from an explicit value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tristate {
    /// Not specified.
    #[default]
    Unset,
    /// Explicitly true.
    True,
    /// Explicitly false.
    False,
}

impl Tristate {
    /// Check if a value was specified.
    pub fn is_set(self) -> bool {
        self != Tristate::Unset
    }

    /// Check if explicitly true.
    pub fn is_true(self) -> bool {
        self == Tristate::True
    }

    /// Check if explicitly false.
    pub fn is_false(self) -> bool {
        self == Tristate::False
    }

    /// Flip an explicit value; unset stays unset.
    pub fn negate(self) -> Self {
        match self {
            Tristate::Unset => Tristate::Unset,
            Tristate::True => Tristate::False,
            Tristate::False => Tristate::True,
        }
    }

    /// Resolve to a boolean, using `default` when unset.
    pub fn unwrap_or(self, default: bool) -> bool {
        match self {
            Tristate::Unset => default,
            Tristate::True => true,
            Tristate::False => false,
        }
    }
}

impl From<bool> for Tristate {
    fn from(value: bool) -> Self {
        if value {
            Tristate::True
        } else {
            Tristate::False
        }
    }
}

impl From<Option<bool>> for Tristate {
    fn from(value: Option<bool>) -> Self {
        value.map(Tristate::from).unwrap_or_default()
    }
}

/// The primitive data types an attribute can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    /// True or false.
    Boolean,
    /// Short string.
    String,
    /// Long-form text.
    Text,
    /// Double precision number.
    Number,
    /// Integral number within the safe integer range.
    Integer,
    /// Canonical 36-character UUID string.
    Uuid,
    /// One of a fixed list of strings.
    Enum,
    /// Calendar date.
    DateOnly,
    /// Instant with millisecond precision.
    DateTime,
}

impl AttributeKind {
    /// Lower-case name as used in declarations.
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeKind::Boolean => "boolean",
            AttributeKind::String => "string",
            AttributeKind::Text => "text",
            AttributeKind::Number => "number",
            AttributeKind::Integer => "integer",
            AttributeKind::Uuid => "uuid",
            AttributeKind::Enum => "enum",
            AttributeKind::DateOnly => "dateonly",
            AttributeKind::DateTime => "datetime",
        }
    }

    /// Check if this kind is numeric.
    pub fn is_numeric(self) -> bool {
        matches!(self, AttributeKind::Number | AttributeKind::Integer)
    }

    /// Check if this kind is string-like.
    pub fn is_string_like(self) -> bool {
        matches!(
            self,
            AttributeKind::String | AttributeKind::Text | AttributeKind::Uuid
        )
    }

    /// Check if this kind holds dates.
    pub fn is_temporal(self) -> bool {
        matches!(self, AttributeKind::DateOnly | AttributeKind::DateTime)
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar granularity a date value must align to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStep {
    /// No alignment required.
    Any,
    /// Whole seconds.
    Second,
    /// Whole minutes.
    Minute,
    /// Whole hours.
    Hour,
    /// Midnight UTC.
    Day,
}

impl DateStep {
    fn seconds(self) -> Option<i64> {
        match self {
            DateStep::Any => None,
            DateStep::Second => Some(1),
            DateStep::Minute => Some(60),
            DateStep::Hour => Some(3_600),
            DateStep::Day => Some(86_400),
        }
    }

    /// Check that truncating `instant` to this granularity leaves it unchanged.
    pub fn is_aligned(self, instant: &DateTime<Utc>) -> bool {
        match self.seconds() {
            None => true,
            Some(unit) => {
                instant.timestamp_subsec_nanos() == 0 && instant.timestamp().rem_euclid(unit) == 0
            }
        }
    }
}

impl fmt::Display for DateStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DateStep::Any => "any",
            DateStep::Second => "second",
            DateStep::Minute => "minute",
            DateStep::Hour => "hour",
            DateStep::Day => "day",
        };
        f.write_str(name)
    }
}

/// Upper bound on a length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Limit {
    /// No upper bound.
    Unbounded,
    /// At most this many.
    At(usize),
}

impl Limit {
    /// Check if `len` goes past this limit.
    pub fn is_exceeded_by(self, len: usize) -> bool {
        match self {
            Limit::Unbounded => false,
            Limit::At(max) => len > max,
        }
    }

    /// The bound, if any.
    pub fn value(self) -> Option<usize> {
        match self {
            Limit::Unbounded => None,
            Limit::At(max) => Some(max),
        }
    }
}

impl From<Option<usize>> for Limit {
    fn from(value: Option<usize>) -> Self {
        value.map_or(Limit::Unbounded, Limit::At)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Unbounded => f.write_str("Infinity"),
            Limit::At(max) => write!(f, "{}", max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_tristate_negate_keeps_unset() {
        assert_eq!(Tristate::Unset.negate(), Tristate::Unset);
        assert_eq!(Tristate::True.negate(), Tristate::False);
        assert_eq!(Tristate::False.negate(), Tristate::True);
    }

    #[test]
    fn test_tristate_conversions() {
        assert_eq!(Tristate::from(true), Tristate::True);
        assert_eq!(Tristate::from(None), Tristate::Unset);
        assert!(Tristate::Unset.unwrap_or(true));
        assert!(!Tristate::False.unwrap_or(true));
        assert!(!Tristate::Unset.is_set());
    }

    #[test]
    fn test_kind_checks() {
        assert!(AttributeKind::Integer.is_numeric());
        assert!(AttributeKind::Uuid.is_string_like());
        assert!(AttributeKind::DateOnly.is_temporal());
        assert!(!AttributeKind::Enum.is_string_like());
        assert_eq!(AttributeKind::DateTime.to_string(), "datetime");
    }

    #[test]
    fn test_date_step_alignment() {
        let midnight = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let morning = Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap();

        assert!(DateStep::Day.is_aligned(&midnight));
        assert!(!DateStep::Day.is_aligned(&morning));
        assert!(DateStep::Hour.is_aligned(&morning));
        assert!(DateStep::Any.is_aligned(&morning));

        let before_epoch = Utc.with_ymd_and_hms(1969, 12, 31, 0, 0, 0).unwrap();
        assert!(DateStep::Day.is_aligned(&before_epoch));
    }

    #[test]
    fn test_limit() {
        assert!(!Limit::Unbounded.is_exceeded_by(usize::MAX));
        assert!(Limit::At(3).is_exceeded_by(4));
        assert!(!Limit::At(3).is_exceeded_by(3));
        assert_eq!(Limit::Unbounded.to_string(), "Infinity");
    }
}
