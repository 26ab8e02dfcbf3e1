//! Date-only and date-time attributes.
//!
//! Client values are native [`NaiveDate`] / [`DateTime<Utc>`]; wire and
//! storage values are canonical ISO-8601 strings. Only complete ISO strings
//! are accepted: `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS[.fraction]` followed by
//! `Z` or an explicit offset.

use super::{AttributeBuilder, CommonOptions};
use crate::catalog::{AttributeKind, DateStep, PartialAttribute, PartialConstraints};
use crate::coerce::ValueRules;
use crate::error::{CoerceError, InvalidSchemaError};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

const DATE_FORMAT: &str = "ISO-8601 date";
const DATETIME_FORMAT: &str = "ISO-8601 date-time";

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern compiles"));

static DATETIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d{1,9})?(Z|[+-]\d{2}:\d{2})$")
        .expect("date-time pattern compiles")
});

/// Parse a complete ISO-8601 date or date-time. Dates are read as midnight UTC.
fn parse_instant(s: &str, format: &'static str) -> Result<DateTime<Utc>, CoerceError> {
    if DATE_RE.is_match(s) {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .ok_or(CoerceError::Format { format });
    }
    if DATETIME_RE.is_match(s) {
        return DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| CoerceError::Format { format });
    }
    Err(CoerceError::Format { format })
}

/// Type check, parse and align to `step`.
fn instant(value: &Value, step: DateStep, format: &'static str) -> Result<DateTime<Utc>, CoerceError> {
    let instant = match value {
        Value::Date(d) => d
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .ok_or(CoerceError::Format { format })?,
        Value::DateTime(dt) => *dt,
        Value::String(s) => parse_instant(s, format)?,
        _ => return Err(CoerceError::Type { expected: "date" }),
    };
    if !step.is_aligned(&instant) {
        return Err(CoerceError::Granularity { step });
    }
    Ok(instant)
}

fn date_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn datetime_string(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Coercion rules for calendar dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateOnlyRules {
    /// Granularity; always a whole day.
    pub step: DateStep,
}

/// Coercion rules for instants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateTimeRules {
    /// Granularity values must align to.
    pub step: DateStep,
}

/// Resolve date-only constraints. The step is always a day: `Any` resolves
/// to it, and finer granularities are rejected.
pub fn finalize_dateonly(step: Option<DateStep>) -> Result<DateOnlyRules, InvalidSchemaError> {
    match step.unwrap_or(DateStep::Day) {
        DateStep::Day | DateStep::Any => Ok(DateOnlyRules { step: DateStep::Day }),
        step => Err(InvalidSchemaError::UnsupportedStep {
            step,
            kind: AttributeKind::DateOnly,
        }),
    }
}

/// Resolve date-time constraints. No alignment by default.
pub fn finalize_datetime(step: Option<DateStep>) -> DateTimeRules {
    DateTimeRules {
        step: step.unwrap_or(DateStep::Any),
    }
}

impl ValueRules for DateOnlyRules {
    fn client_value(&self, value: &Value) -> Result<Value, CoerceError> {
        let instant = instant(value, self.step, DATE_FORMAT)?;
        Ok(Value::Date(instant.date_naive()))
    }

    fn wire_value(&self, value: &Value) -> Value {
        match value {
            Value::Date(d) => Value::String(date_string(*d)),
            other => other.clone(),
        }
    }

    fn filter_string(&self, value: &Value) -> String {
        match value {
            Value::Date(d) => date_string(*d),
            other => other.as_str().unwrap_or_default().to_string(),
        }
    }

    fn storage_value(&self, value: &Value) -> Result<Value, CoerceError> {
        let instant = instant(value, self.step, DATE_FORMAT)?;
        Ok(Value::String(date_string(instant.date_naive())))
    }
}

impl ValueRules for DateTimeRules {
    fn client_value(&self, value: &Value) -> Result<Value, CoerceError> {
        instant(value, self.step, DATETIME_FORMAT).map(Value::DateTime)
    }

    fn wire_value(&self, value: &Value) -> Value {
        match value {
            Value::DateTime(dt) => Value::String(datetime_string(dt)),
            other => other.clone(),
        }
    }

    fn filter_string(&self, value: &Value) -> String {
        match value {
            Value::DateTime(dt) => datetime_string(dt),
            other => other.as_str().unwrap_or_default().to_string(),
        }
    }

    fn storage_value(&self, value: &Value) -> Result<Value, CoerceError> {
        let instant = instant(value, self.step, DATETIME_FORMAT)?;
        Ok(Value::String(datetime_string(&instant)))
    }
}

/// Builder for date-only attributes.
#[derive(Debug, Clone, Default)]
pub struct DateOnlyBuilder {
    common: CommonOptions,
    step: Option<DateStep>,
}

/// Builder for date-time attributes.
#[derive(Debug, Clone, Default)]
pub struct DateTimeBuilder {
    common: CommonOptions,
    step: Option<DateStep>,
}

/// Declare a calendar date attribute.
pub fn dateonly() -> DateOnlyBuilder {
    DateOnlyBuilder {
        common: CommonOptions::default(),
        step: None,
    }
}

/// Declare an instant attribute.
pub fn datetime() -> DateTimeBuilder {
    DateTimeBuilder {
        common: CommonOptions::default(),
        step: None,
    }
}

impl DateOnlyBuilder {
    /// Granularity values must align to.
    pub fn step(mut self, step: DateStep) -> Self {
        self.step = Some(step);
        self
    }
}

impl DateTimeBuilder {
    /// Granularity values must align to.
    pub fn step(mut self, step: DateStep) -> Self {
        self.step = Some(step);
        self
    }
}

impl AttributeBuilder for DateOnlyBuilder {
    fn common_mut(&mut self) -> &mut CommonOptions {
        &mut self.common
    }

    fn build(self) -> PartialAttribute {
        self.common.into_partial(PartialConstraints::DateOnly(self.step))
    }
}

impl AttributeBuilder for DateTimeBuilder {
    fn common_mut(&mut self) -> &mut CommonOptions {
        &mut self.common
    }

    fn build(self) -> PartialAttribute {
        self.common.into_partial(PartialConstraints::DateTime(self.step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_dateonly_step() {
        let attribute = dateonly().step(DateStep::Day).finalize().unwrap();

        assert_eq!(
            attribute.set_orm_property_value(Some(&Value::from("2023-01-01"))),
            Ok(Value::from("2023-01-01"))
        );

        let err = attribute
            .set_orm_property_value(Some(&Value::from("2023-01-01T10:00:00Z")))
            .unwrap_err();
        assert_eq!(err, CoerceError::Granularity { step: DateStep::Day });
        assert_eq!(err.to_string(), "value must align to a whole day");
    }

    #[test]
    fn test_dateonly_any_step_means_day() {
        let attribute = dateonly().step(DateStep::Any).finalize().unwrap();
        assert_eq!(attribute, dateonly().finalize().unwrap());
        assert_eq!(
            attribute.set_orm_property_value(Some(&Value::from("2023-01-01T10:00:00Z"))),
            Err(CoerceError::Granularity { step: DateStep::Day })
        );
    }

    #[test]
    fn test_dateonly_rejects_finer_step() {
        assert_eq!(
            dateonly().step(DateStep::Hour).finalize(),
            Err(InvalidSchemaError::UnsupportedStep {
                step: DateStep::Hour,
                kind: AttributeKind::DateOnly,
            })
        );
    }

    #[test]
    fn test_partial_strings_rejected() {
        let attribute = datetime().finalize().unwrap();
        for raw in ["2023-01", "2023-01-01T10:00", "2023-01-01T10:00:00", "yesterday"] {
            assert_eq!(
                attribute.set_orm_property_value(Some(&Value::from(raw))),
                Err(CoerceError::Format {
                    format: DATETIME_FORMAT
                }),
                "{raw}"
            );
        }
        assert_eq!(
            attribute.set_orm_property_value(Some(&Value::from("2023-02-30"))),
            Err(CoerceError::Format {
                format: DATETIME_FORMAT
            })
        );
    }

    #[test]
    fn test_datetime_representations() {
        let attribute = datetime().step(DateStep::Minute).finalize().unwrap();
        let instant = Utc.with_ymd_and_hms(2023, 1, 1, 10, 30, 0).unwrap();

        let client = attribute
            .set_client_property_value(Some(&Value::from("2023-01-01T12:30:00+02:00")))
            .unwrap();
        assert_eq!(client, Value::DateTime(instant));
        assert_eq!(
            attribute.serialize_client_property_value(&client),
            Value::from("2023-01-01T10:30:00.000Z")
        );

        let stored = attribute
            .set_orm_property_value(Some(&Value::DateTime(instant)))
            .unwrap();
        assert_eq!(stored, Value::from("2023-01-01T10:30:00.000Z"));
        assert_eq!(attribute.serialize_orm_property_value(&stored), stored);

        assert_eq!(
            attribute.set_orm_property_value(Some(&Value::from("2023-01-01T10:30:15Z"))),
            Err(CoerceError::Granularity {
                step: DateStep::Minute
            })
        );
    }

    #[test]
    fn test_dateonly_client_values_are_native() {
        let attribute = dateonly().finalize().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();

        let client = attribute
            .set_client_property_value_from_response(Some(&Value::from("2024-02-29")))
            .unwrap();
        assert_eq!(client, Value::Date(date));
        assert_eq!(
            attribute.serialize_client_query_filter_value(&client),
            "2024-02-29"
        );
        assert_eq!(
            attribute.set_client_property_value(Some(&Value::from(true))),
            Err(CoerceError::Type { expected: "date" })
        );
    }
}
